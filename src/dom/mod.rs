//! Thin web-sys layer shared by the features: page context, styles,
//! observers and frame/timer drivers.

pub mod frames;
pub mod observe;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::config::Config;
use crate::error::{FxError, FxResult};
use crate::motion::unique;
use crate::style::{Rect, Rgb};
use crate::style::color::{ACCENT_2_FALLBACK, ACCENT_FALLBACK};

/// Everything a feature needs to know about the page it runs on.
#[derive(Clone)]
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub config: Config,
    pub reduced_motion: bool,
}

impl Page {
    pub fn detect() -> FxResult<Page> {
        let window = web_sys::window().ok_or(FxError::MissingGlobal("window"))?;
        let document = window.document().ok_or(FxError::MissingGlobal("document"))?;
        let config = Config::from_document(&document);
        let reduced_motion = media_matches(&window, "(prefers-reduced-motion: reduce)");
        Ok(Page { window, document, config, reduced_motion })
    }

    pub fn by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    pub fn query(&self, selector: &str) -> Option<HtmlElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    /// All elements matching any of `selectors`, first match order, each once.
    /// Invalid selectors are skipped.
    pub fn query_all(&self, selectors: &[&str]) -> Vec<HtmlElement> {
        let mut found = Vec::new();
        for selector in selectors {
            let Ok(list) = self.document.query_selector_all(selector) else {
                log::debug!("skipping selector {}", selector);
                continue;
            };
            for i in 0..list.length() {
                if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                    found.push(el);
                }
            }
        }
        unique(found)
    }

    pub fn create(&self, tag: &str) -> FxResult<HtmlElement> {
        self.document
            .create_element(tag)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| FxError::Js(format!("<{tag}> is not an HtmlElement")))
    }

    pub fn viewport_height(&self) -> f64 {
        let inner = self
            .window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let client = self
            .document
            .document_element()
            .map(|el| el.client_height() as f64)
            .unwrap_or(0.0);
        inner.max(client).max(1.0)
    }

    pub fn supports_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &"IntersectionObserver".into()).unwrap_or(false)
    }

    pub fn coarse_pointer(&self) -> bool {
        media_matches(&self.window, "(pointer: coarse)")
    }

    pub fn css_var_rgb(&self, name: &str, fallback: Rgb) -> Rgb {
        self.document
            .document_element()
            .and_then(|root| self.window.get_computed_style(&root).ok().flatten())
            .and_then(|style| style.get_property_value(name).ok())
            .and_then(|value| Rgb::parse(&value))
            .unwrap_or(fallback)
    }

    pub fn accent(&self) -> Rgb {
        self.css_var_rgb("--accent", ACCENT_FALLBACK)
    }

    pub fn accent_2(&self) -> Rgb {
        self.css_var_rgb("--accent-2", ACCENT_2_FALLBACK)
    }
}

fn media_matches(window: &Window, query: &str) -> bool {
    window
        .match_media(query)
        .ok()
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

pub fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect {
        left: r.left(),
        top: r.top(),
        width: r.width(),
        height: r.height(),
    }
}

pub fn style(el: &HtmlElement, prop: &str) -> String {
    el.style().get_property_value(prop).unwrap_or_default()
}

pub fn set_style(el: &HtmlElement, prop: &str, value: &str) {
    let _ = el.style().set_property(prop, value);
}

pub fn clear_style(el: &HtmlElement, prop: &str) {
    let _ = el.style().remove_property(prop);
}

/// Restores a recorded inline value, removing the property if it was unset.
pub fn restore_style(el: &HtmlElement, prop: &str, original: &str) {
    if original.is_empty() {
        clear_style(el, prop);
    } else {
        set_style(el, prop, original);
    }
}

pub fn has_ancestor(el: &Element, selector: &str) -> bool {
    el.closest(selector).ok().flatten().is_some()
}

/// Inline styles recorded before a feature touches an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub opacity: String,
    pub transform: String,
    pub transition: String,
    pub box_shadow: String,
}

impl Snapshot {
    pub fn capture(el: &HtmlElement) -> Snapshot {
        Snapshot {
            opacity: style(el, "opacity"),
            transform: style(el, "transform"),
            transition: style(el, "transition"),
            box_shadow: style(el, "box-shadow"),
        }
    }
}
