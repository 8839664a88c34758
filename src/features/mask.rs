//! Image mask reveal: images wipe in left to right when they scroll into view.

use std::cell::RefCell;

use web_sys::HtmlElement;

use crate::dom::observe::{listen_once, observe_once};
use crate::dom::{
    clear_style, frames, has_ancestor, rect_of, restore_style, set_style, style, Page, Snapshot,
};
use crate::error::FxResult;
use crate::motion::Registry;
use crate::style::viewport::is_in_viewport;
use crate::style::{append_transform, merge_transitions, strip_transform};

const CLIP_HIDDEN: &str = "inset(0 100% 0 0)";
const CLIP_SHOWN: &str = "inset(0 0 0 0)";
const CLIP_TRANSITION: &str =
    "clip-path 800ms cubic-bezier(0.2, 0.8, 0.2, 1), opacity 400ms ease-out";
const SLIDE_TRANSITION: &str = "opacity 600ms ease-out, transform 600ms ease-out";

/// How an image is hidden until it is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Technique {
    Clip,
    Slide,
}

/// Inline styles for the hidden state.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskStyles {
    pub opacity: &'static str,
    pub clip_path: Option<&'static str>,
    pub transform: Option<String>,
    pub transition: String,
}

pub fn hidden(technique: Technique, original: &Snapshot) -> MaskStyles {
    match technique {
        Technique::Clip => MaskStyles {
            opacity: "0.001",
            clip_path: Some(CLIP_HIDDEN),
            transform: None,
            transition: merge_transitions(&original.transition, CLIP_TRANSITION),
        },
        Technique::Slide => MaskStyles {
            opacity: "0",
            clip_path: None,
            transform: Some(append_transform(&original.transform, "translateX(14px)")),
            transition: merge_transitions(&original.transition, SLIDE_TRANSITION),
        },
    }
}

#[derive(Clone, Debug)]
pub struct MaskState {
    pub technique: Technique,
    pub original: Snapshot,
    pub revealed: bool,
}

thread_local! {
    static MASKS: RefCell<Registry<HtmlElement, MaskState>> = RefCell::new(Registry::new());
}

fn supports_clip_path() -> bool {
    web_sys::css::supports_with_value("clip-path", "inset(0 0 0 0)").unwrap_or(false)
        || web_sys::css::supports_with_value("clip-path", "inset(0% 0% 0% 0%)").unwrap_or(false)
}

pub fn init(page: &Page) -> FxResult {
    let technique = if supports_clip_path() { Technique::Clip } else { Technique::Slide };

    let fresh: Vec<HtmlElement> = page
        .query_all(&["img"])
        .into_iter()
        .filter(|el| !has_ancestor(el, ".bg-video"))
        .filter(|el| {
            let original = Snapshot::capture(el);
            MASKS.with(|reg| {
                reg.borrow_mut().claim(el.clone(), || MaskState {
                    technique,
                    original,
                    revealed: false,
                })
            })
        })
        .collect();
    if fresh.is_empty() {
        return Ok(());
    }

    for el in &fresh {
        let original = MASKS.with(|reg| reg.borrow().get(el).map(|s| s.original.clone()));
        let Some(original) = original else { continue };
        let styles = hidden(technique, &original);
        if let Some(clip) = styles.clip_path {
            set_style(el, "clip-path", clip);
        }
        if let Some(transform) = &styles.transform {
            set_style(el, "transform", transform);
        }
        set_style(el, "opacity", styles.opacity);
        set_style(el, "transition", &styles.transition);
        set_style(el, "will-change", "opacity, transform");
    }

    let reduced = page.reduced_motion;
    if !page.supports_intersection_observer() {
        for el in &fresh {
            reveal(el, reduced);
        }
        return Ok(());
    }

    observe_once(&fresh, 0.05, Some("0px 0px -5% 0px"), move |el| reveal(el, reduced))?;
    let page = page.clone();
    frames::next_frame(move || {
        let vh = page.viewport_height();
        for el in &fresh {
            if is_in_viewport(&rect_of(el), vh, 0.01) {
                reveal(el, page.reduced_motion);
            }
        }
    });
    Ok(())
}

/// Inline styles for the revealed state.
#[derive(Clone, Debug, PartialEq)]
pub struct Settled {
    pub clip_path: Option<&'static str>,
    /// Transform to apply; an empty string removes the inline value.
    pub transform: Option<String>,
    /// Whether `will-change` is cleared after the transition ends.
    pub await_transition: bool,
}

/// Reduced motion restores the recorded transform instead of animating out
/// of the offset.
pub fn settled(state: &MaskState, current_transform: &str, reduced_motion: bool) -> Settled {
    let clip_path = (state.technique == Technique::Clip).then_some(CLIP_SHOWN);
    if reduced_motion {
        return Settled {
            clip_path,
            transform: Some(state.original.transform.clone()),
            await_transition: false,
        };
    }
    let transform = (state.technique == Technique::Slide)
        .then(|| strip_transform(current_transform, "translateX", None));
    Settled { clip_path, transform, await_transition: true }
}

pub fn reveal(el: &HtmlElement, reduced_motion: bool) {
    let state = MASKS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let state = reg.get_mut(el)?;
        if std::mem::replace(&mut state.revealed, true) {
            return None;
        }
        Some(state.clone())
    });
    let Some(state) = state else { return };

    let target = settled(&state, &style(el, "transform"), reduced_motion);
    if let Some(clip) = target.clip_path {
        set_style(el, "clip-path", clip);
    }
    set_style(el, "opacity", "1");
    if let Some(transform) = &target.transform {
        restore_style(el, "transform", transform);
    }
    if target.await_transition {
        let el_ref = el.clone();
        let _ = listen_once(el, "transitionend", move |_| clear_style(&el_ref, "will-change"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_technique_hides_by_clipping() {
        let original = Snapshot { transition: "color 1s".into(), ..Snapshot::default() };
        let styles = hidden(Technique::Clip, &original);
        assert_eq!(styles.clip_path, Some("inset(0 100% 0 0)"));
        assert_eq!(styles.opacity, "0.001");
        assert!(styles.transform.is_none());
        assert_eq!(
            styles.transition,
            "color 1s, clip-path 800ms cubic-bezier(0.2, 0.8, 0.2, 1), opacity 400ms ease-out"
        );
    }

    #[test]
    fn slide_technique_offsets_existing_transform() {
        let original = Snapshot { transform: "scale(2)".into(), ..Snapshot::default() };
        let styles = hidden(Technique::Slide, &original);
        assert_eq!(styles.transform.as_deref(), Some("scale(2) translateX(14px)"));
        assert_eq!(styles.opacity, "0");
        assert_eq!(
            strip_transform(styles.transform.as_deref().unwrap_or_default(), "translateX", None),
            "scale(2)"
        );
    }

    fn state(technique: Technique, transform: &str) -> MaskState {
        MaskState {
            technique,
            original: Snapshot { transform: transform.into(), ..Snapshot::default() },
            revealed: false,
        }
    }

    #[test]
    fn reduced_motion_restores_recorded_transform() {
        let clip = settled(&state(Technique::Clip, "scale(2)"), "scale(2)", true);
        assert_eq!(clip.clip_path, Some("inset(0 0 0 0)"));
        assert_eq!(clip.transform.as_deref(), Some("scale(2)"));
        assert!(!clip.await_transition);

        let slide = settled(&state(Technique::Slide, ""), "translateX(14px)", true);
        assert_eq!(slide.clip_path, None);
        assert_eq!(slide.transform.as_deref(), Some(""));
    }

    #[test]
    fn animated_reveal_drops_only_the_offset() {
        let current = "scale(2) translateX(14px)";
        let slide = settled(&state(Technique::Slide, "scale(2)"), current, false);
        assert_eq!(slide.transform.as_deref(), Some("scale(2)"));
        assert!(slide.await_transition);

        let clip = settled(&state(Technique::Clip, "scale(2)"), "scale(2)", false);
        assert_eq!(clip.clip_path, Some("inset(0 0 0 0)"));
        assert_eq!(clip.transform, None);
    }
}
