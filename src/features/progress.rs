//! Fixed reading-progress bar at the top of the page.

use std::cell::Cell;

use stylist::Style;
use web_sys::{Event, HtmlElement};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::dom::{set_style, Page};
use crate::error::FxResult;
use crate::style::viewport::scroll_fraction;
use crate::style::Rgb;

pub const BAR_ID: &str = "scroll-progress";

const HOST_CSS: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("left", "0"),
    ("top", "0"),
    ("width", "100%"),
    ("height", "3px"),
    ("z-index", "9999"),
    ("pointer-events", "none"),
];

const FILL_CSS: &str = r#"
    position: absolute;
    inset: 0;
    transform-origin: left center;
    box-shadow: 0 0 6px rgba(0,0,0,.25);
"#;

pub fn gradient(from: Rgb, to: Rgb) -> String {
    format!("linear-gradient(90deg, {}, {})", from.rgba(0.95), to.rgba(0.95))
}

pub fn scale_transform(fraction: f64) -> String {
    format!("scaleX({})", fraction.clamp(0.0, 1.0))
}

fn current_fraction() -> f64 {
    let Some(window) = web_sys::window() else {
        return 0.0;
    };
    let Some(document) = window.document() else {
        return 0.0;
    };
    let root = document.document_element();
    let body = document.body();
    let scroll_top = window
        .scroll_y()
        .ok()
        .filter(|y| *y > 0.0)
        .or_else(|| root.as_ref().map(|r| r.scroll_top() as f64))
        .unwrap_or(0.0);
    let doc_height = [
        body.as_ref().map(|b| b.scroll_height()),
        root.as_ref().map(|r| r.scroll_height()),
        body.as_ref().map(|b| b.offset_height()),
        root.as_ref()
            .and_then(|r| wasm_bindgen::JsCast::dyn_ref::<HtmlElement>(r))
            .map(|r| r.offset_height()),
        root.as_ref().map(|r| r.client_height()),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0) as f64;
    let viewport = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|h| *h > 0.0)
        .or_else(|| root.as_ref().map(|r| r.client_height() as f64))
        .unwrap_or(1.0);
    scroll_fraction(scroll_top, doc_height, viewport)
}

#[derive(Properties, PartialEq)]
pub struct ProgressBarProps {
    pub background: String,
}

#[function_component(ProgressBar)]
pub fn progress_bar(props: &ProgressBarProps) -> Html {
    let fraction = use_state(current_fraction);
    let fill_class = use_state(|| {
        Style::new(FILL_CSS)
            .map(|style| style.get_class_name().to_string())
            .unwrap_or_default()
    });

    {
        let fraction = fraction.clone();
        use_event_with_window("scroll", move |_: Event| fraction.set(current_fraction()));
    }
    {
        let fraction = fraction.clone();
        use_event_with_window("resize", move |_: Event| fraction.set(current_fraction()));
    }

    let style = format!(
        "background: {}; transform: {};",
        props.background,
        scale_transform(*fraction)
    );
    html! {
        <div class={(*fill_class).clone()} {style}></div>
    }
}

thread_local! {
    static MOUNTED: Cell<bool> = Cell::new(false);
}

pub fn init(page: &Page) -> FxResult {
    let host = match page.by_id(BAR_ID) {
        Some(bar) => bar,
        None => {
            let bar = page.create("div")?;
            bar.set_id(BAR_ID);
            if let Some(body) = page.document.body() {
                body.append_child(&bar)?;
            }
            bar
        }
    };

    if page.reduced_motion {
        set_style(&host, "display", "none");
        return Ok(());
    }
    if MOUNTED.with(|m| m.replace(true)) {
        return Ok(());
    }
    for (prop, value) in HOST_CSS {
        set_style(&host, prop, value);
    }

    let background = gradient(page.accent_2(), page.accent());
    yew::Renderer::<ProgressBar>::with_root_and_props(host.into(), ProgressBarProps { background })
        .render();
    log::debug!("progress bar mounted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_uses_both_accents() {
        assert_eq!(
            gradient(Rgb(96, 165, 250), Rgb(34, 211, 238)),
            "linear-gradient(90deg, rgba(96,165,250, 0.95), rgba(34,211,238, 0.95))"
        );
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(scale_transform(0.25), "scaleX(0.25)");
        assert_eq!(scale_transform(-1.0), "scaleX(0)");
        assert_eq!(scale_transform(3.0), "scaleX(1)");
    }
}
