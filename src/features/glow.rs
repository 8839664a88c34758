//! Hover/focus glow: a breathing box-shadow on buttons and calls to action.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::dom::observe::listen;
use crate::dom::{frames, restore_style, set_style, Page, Snapshot};
use crate::error::FxResult;
use crate::motion::{CancelToken, FrameTask, Registry, TaskState};
use crate::style::{append_transform, merge_transitions, Rgb};

pub const SELECTORS: &[&str] = &[
    ".shiny-cta",
    "a.button",
    "a.btn",
    "a[class*=\"btn\"]",
    ".button",
    ".btn",
    ".cta",
    ".cta-button",
    ".primary-btn",
    "button",
    "input[type=\"button\"]",
    "input[type=\"submit\"]",
    "[role=\"button\"]",
];

const TRANSITION: &str = "box-shadow 220ms ease-out, transform 160ms ease-out";
const PHASE_STEP: f64 = 0.02;

pub fn pulse_shadow(accent: Rgb, phase: f64) -> String {
    let osc = (phase.sin() + 1.0) / 2.0;
    let outer = 0.25 + osc * 0.45;
    let inner = 0.15 + (1.0 - osc) * 0.35;
    format!("0 0 8px {}, 0 0 20px {}", accent.rgba(inner), accent.rgba(outer))
}

pub fn entry_shadow(accent: Rgb) -> String {
    format!("0 0 6px {}, 0 0 14px {}", accent.rgba(0.28), accent.rgba(0.2))
}

/// Advances the pulse phase by a fixed step every frame until cancelled.
pub struct PulseTask<F> {
    accent: Rgb,
    phase: f64,
    sink: F,
}

impl<F: FnMut(&str)> PulseTask<F> {
    pub fn new(accent: Rgb, sink: F) -> Self {
        Self { accent, phase: 0.0, sink }
    }
}

impl<F: FnMut(&str)> FrameTask for PulseTask<F> {
    fn tick(&mut self, _now: f64) -> TaskState {
        self.phase += PHASE_STEP;
        (self.sink)(&pulse_shadow(self.accent, self.phase));
        TaskState::Running
    }
}

#[derive(Debug, Default)]
struct GlowState {
    original: Snapshot,
    pulse: Option<CancelToken>,
}

thread_local! {
    static GLOWS: RefCell<Registry<HtmlElement, GlowState>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    if page.reduced_motion {
        return Ok(());
    }
    let accent = page.accent();
    let active = page.document.active_element();

    for el in page.query_all(SELECTORS) {
        let original = Snapshot::capture(&el);
        let claimed = GLOWS.with(|reg| {
            reg.borrow_mut().claim(el.clone(), || GlowState {
                original: original.clone(),
                pulse: None,
            })
        });
        if !claimed {
            continue;
        }
        set_style(&el, "transition", &merge_transitions(&original.transition, TRANSITION));

        for event in ["mouseenter", "focus"] {
            let target = el.clone();
            listen(&el, event, move |_| enter(&target, accent))?;
        }
        for event in ["mouseleave", "blur"] {
            let target = el.clone();
            listen(&el, event, move |_| leave(&target))?;
        }
        if active.as_ref().map_or(false, |a| a == el.unchecked_ref::<Element>()) {
            enter(&el, accent);
        }
    }
    Ok(())
}

fn enter(el: &HtmlElement, accent: Rgb) {
    let Some(original) = GLOWS.with(|reg| reg.borrow().get(el).map(|s| s.original.clone())) else {
        return;
    };
    cancel_pulse(el);
    set_style(el, "transform", &append_transform(&original.transform, "scale(1.03)"));
    set_style(el, "box-shadow", &entry_shadow(accent));

    let target = el.clone();
    let token = frames::spawn(PulseTask::new(accent, move |shadow: &str| {
        set_style(&target, "box-shadow", shadow);
    }));
    GLOWS.with(|reg| {
        if let Some(state) = reg.borrow_mut().get_mut(el) {
            state.pulse = Some(token);
        }
    });
}

fn leave(el: &HtmlElement) {
    cancel_pulse(el);
    let Some(original) = GLOWS.with(|reg| reg.borrow().get(el).map(|s| s.original.clone())) else {
        return;
    };
    restore_style(el, "box-shadow", &original.box_shadow);
    restore_style(el, "transform", &original.transform);
}

fn cancel_pulse(el: &HtmlElement) {
    GLOWS.with(|reg| {
        if let Some(token) = reg.borrow_mut().get_mut(el).and_then(|s| s.pulse.take()) {
            token.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::VirtualClock;
    use std::rc::Rc;

    const ACCENT: Rgb = Rgb(34, 211, 238);

    #[test]
    fn shadow_oscillates_between_bounds() {
        assert_eq!(
            pulse_shadow(ACCENT, 0.0),
            "0 0 8px rgba(34,211,238, 0.325), 0 0 20px rgba(34,211,238, 0.475)"
        );
        let peak = pulse_shadow(ACCENT, std::f64::consts::FRAC_PI_2);
        assert_eq!(peak, "0 0 8px rgba(34,211,238, 0.15), 0 0 20px rgba(34,211,238, 0.7)");
    }

    #[test]
    fn pulse_stops_when_cancelled() {
        let frames = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = frames.clone();
        let mut clock = VirtualClock::new(16.0);
        let token = clock.spawn(PulseTask::new(ACCENT, move |s: &str| {
            sink.borrow_mut().push(s.to_string())
        }));
        clock.advance(160.0);
        let seen = frames.borrow().len();
        assert_eq!(seen, 10);
        assert_ne!(frames.borrow()[0], frames.borrow()[9]);

        token.cancel();
        clock.advance(160.0);
        assert_eq!(frames.borrow().len(), seen);
        assert_eq!(clock.active_tasks(), 0);
    }
}
