//! Section reveal: fade and slide up once when an element enters the viewport.

use std::cell::RefCell;

use web_sys::HtmlElement;

use crate::dom::observe::{listen_once, observe_once, on_scroll_and_resize};
use crate::dom::{clear_style, has_ancestor, rect_of, set_style, Page, Snapshot};
use crate::error::FxResult;
use crate::motion::Registry;
use crate::style::viewport::is_in_viewport;
use crate::style::{append_transform, merge_transitions, strip_transform};

pub const SELECTORS: &[&str] = &[
    ".hero",
    ".section",
    ".learn-card",
    ".card",
    ".edit-card",
    ".learn-app-card",
    ".tips .tip",
    ".hub .card",
    "main > section",
    "article",
];

/// Cards inside this container are animated by the learn-card feature.
const EXCLUDED: &str = "#overview .learn-card";

const OFFSET_FN: &str = "translateY";
const OFFSET_ARG: &str = "18px";
const TRANSITION: &str = "opacity 600ms ease-out, transform 600ms ease-out";
const THRESHOLD: f64 = 0.12;
const ROOT_MARGIN: &str = "0px 0px -6% 0px";

#[derive(Clone, Debug, Default)]
pub struct RevealState {
    pub original: Snapshot,
    pub revealed: bool,
}

impl RevealState {
    /// Marks the element revealed. Only the first call returns `true`.
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.revealed, true)
    }
}

/// Inline styles for the hidden starting state.
#[derive(Clone, Debug, PartialEq)]
pub struct Hidden {
    pub transform: String,
    pub transition: String,
}

pub fn hidden(original: &Snapshot) -> Hidden {
    Hidden {
        transform: append_transform(&original.transform, &format!("{OFFSET_FN}({OFFSET_ARG})")),
        transition: merge_transitions(&original.transition, TRANSITION),
    }
}

pub fn settled_transform(current: &str) -> String {
    strip_transform(current, OFFSET_FN, Some(OFFSET_ARG))
}

thread_local! {
    static REVEALS: RefCell<Registry<HtmlElement, RevealState>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    if page.reduced_motion {
        return Ok(());
    }

    let fresh: Vec<HtmlElement> = page
        .query_all(SELECTORS)
        .into_iter()
        .filter(|el| !has_ancestor(el, EXCLUDED))
        .filter(|el| {
            REVEALS.with(|reg| {
                reg.borrow_mut().claim(el.clone(), || RevealState {
                    original: Snapshot::capture(el),
                    revealed: false,
                })
            })
        })
        .collect();
    if fresh.is_empty() {
        return Ok(());
    }
    log::debug!("reveal: {} elements", fresh.len());

    for el in &fresh {
        let original = REVEALS.with(|reg| reg.borrow().get(el).map(|s| s.original.clone()));
        let Some(original) = original else { continue };
        let state = hidden(&original);
        set_style(el, "opacity", "0");
        set_style(el, "transform", &state.transform);
        set_style(el, "transition", &state.transition);
        set_style(el, "will-change", "opacity, transform");
    }

    if page.supports_intersection_observer() {
        observe_once(&fresh, THRESHOLD, Some(ROOT_MARGIN), reveal)
    } else {
        let window = page.window.clone();
        let page = page.clone();
        on_scroll_and_resize(&window, move || {
            let vh = page.viewport_height();
            for el in &fresh {
                if !is_revealed(el) && is_in_viewport(&rect_of(el), vh, THRESHOLD) {
                    reveal(el);
                }
            }
        })
    }
}

pub fn is_revealed(el: &HtmlElement) -> bool {
    REVEALS.with(|reg| reg.borrow().get(el).map_or(false, |s| s.revealed))
}

pub fn reveal(el: &HtmlElement) {
    let first = REVEALS.with(|reg| reg.borrow_mut().get_mut(el).map_or(false, RevealState::begin));
    if !first {
        return;
    }
    let current = crate::dom::style(el, "transform");
    set_style(el, "transform", &settled_transform(&current));
    set_style(el, "opacity", "1");
    let target = el.clone();
    let _ = listen_once(el, "transitionend", move |_| clear_style(&target, "will-change"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_state_appends_offset_and_merges_transition() {
        let original = Snapshot {
            transform: "rotate(3deg)".into(),
            transition: "opacity 100ms linear, color 1s".into(),
            ..Snapshot::default()
        };
        let h = hidden(&original);
        assert_eq!(h.transform, "rotate(3deg) translateY(18px)");
        assert_eq!(
            h.transition,
            "opacity 600ms ease-out, color 1s, transform 600ms ease-out"
        );
    }

    #[test]
    fn settle_removes_only_the_hiding_offset() {
        assert_eq!(settled_transform("translateY(18px)"), "none");
        assert_eq!(settled_transform("rotate(3deg) translateY(18px)"), "rotate(3deg)");
    }

    #[test]
    fn reveal_applies_once_per_element() {
        let mut reg: Registry<u32, RevealState> = Registry::new();
        assert!(reg.claim(1, RevealState::default));
        assert!(!reg.claim(1, RevealState::default));

        let mut applied = 0;
        for _ in 0..3 {
            if reg.get_mut(&1).map_or(false, RevealState::begin) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
