//! Community headline: staggered per-letter entrance and a pointer shimmer on
//! the call-to-action.

use std::cell::Cell;

use rand::Rng;
use web_sys::MouseEvent;
use wasm_bindgen::JsCast;

use crate::dom::observe::listen;
use crate::dom::{frames, rect_of, set_style, Page};
use crate::error::FxResult;

const LETTERS: &str = "#community .community-text .letters";
const CTA_ID: &str = "community-cta";

const BASE_DELAY_MS: f64 = 20.0;
const STEP_MS: f64 = 26.0;
const MAX_JITTER_MS: f64 = 18.0;

/// Animation delay of the letter at `index`, given a jitter in `[0, 1)`.
pub fn letter_delay(index: usize, jitter: f64) -> f64 {
    BASE_DELAY_MS + index as f64 * STEP_MS + jitter * MAX_JITTER_MS
}

/// CSS value for a delay in ms, e.g. `0.046s`.
pub fn as_seconds(ms: f64) -> String {
    format!("{}s", ms / 1000.0)
}

thread_local! {
    static SPLIT: Cell<bool> = Cell::new(false);
    static SHIMMER: Cell<bool> = Cell::new(false);
}

pub fn split_letters(page: &Page) -> FxResult {
    let Some(root) = page.query(LETTERS) else {
        return Ok(());
    };
    if SPLIT.with(|s| s.replace(true)) {
        return Ok(());
    }
    let text = root.text_content().unwrap_or_default().trim().to_string();
    root.set_text_content(Some(""));

    let fragment = page.document.create_document_fragment();
    let mut rng = rand::thread_rng();
    for (i, ch) in text.chars().enumerate() {
        let span = page.create("span")?;
        span.set_text_content(Some(&ch.to_string()));
        set_style(&span, "animation-delay", &as_seconds(letter_delay(i, rng.gen())));
        fragment.append_child(&span)?;
    }
    root.append_child(&fragment)?;
    Ok(())
}

pub fn shimmer(page: &Page) -> FxResult {
    let Some(cta) = page.by_id(CTA_ID) else {
        return Ok(());
    };
    if SHIMMER.with(|s| s.replace(true)) {
        return Ok(());
    }

    let target = cta.clone();
    listen(&cta, "mousemove", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let r = rect_of(&target);
        let x = f64::from(event.client_x()) - r.left;
        let y = f64::from(event.client_y()) - r.top;
        set_position(&target, x, y);
    })?;

    frames::next_frame(move || {
        let r = rect_of(&cta);
        set_position(&cta, r.width / 2.0, r.height / 2.0);
    });
    Ok(())
}

fn set_position(el: &web_sys::HtmlElement, x: f64, y: f64) {
    set_style(el, "--sx", &format!("{x}px"));
    set_style(el, "--sy", &format!("{y}px"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_staggered() {
        assert_eq!(letter_delay(0, 0.0), 20.0);
        assert_eq!(letter_delay(3, 0.0), 98.0);
        assert!(letter_delay(3, 0.999) < letter_delay(4, 0.0));
    }

    #[test]
    fn delays_are_written_in_seconds() {
        assert_eq!(as_seconds(46.0), "0.046s");
        assert_eq!(as_seconds(1500.0), "1.5s");
    }
}
