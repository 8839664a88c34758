//! Hero heading typed out one character at a time.

use std::cell::RefCell;

use web_sys::HtmlElement;

use crate::dom::observe::listen_once;
use crate::dom::{frames, restore_style, set_style, style, Page};
use crate::error::FxResult;
use crate::motion::{FrameTask, Registry, TaskState};
use crate::style::merge_transitions;

const HEADINGS: &[&str] = &["#hero-title", "main h1", "h1"];

pub const START_DELAY_MS: f64 = 60.0;
const BASE_DELAY_MS: f64 = 38.0;
const SPACE_DELAY_MS: f64 = 12.0;
const PUNCT_DELAY_MS: f64 = 110.0;

/// Pause after typing `ch`.
pub fn delay_after(ch: char) -> f64 {
    match ch {
        ',' | '.' | '!' | '?' | ':' | ';' => PUNCT_DELAY_MS,
        ' ' => SPACE_DELAY_MS,
        _ => BASE_DELAY_MS,
    }
}

/// Offset from start at which each character appears.
pub fn schedule(text: &str) -> Vec<(char, f64)> {
    let mut at = START_DELAY_MS;
    text.chars()
        .map(|ch| {
            let slot = (ch, at);
            at += delay_after(ch);
            slot
        })
        .collect()
}

/// Emits characters through `sink` as their scheduled time passes.
pub struct TypewriterTask<F> {
    script: Vec<(char, f64)>,
    next: usize,
    started_at: Option<f64>,
    sink: F,
}

impl<F: FnMut(char)> TypewriterTask<F> {
    pub fn new(text: &str, sink: F) -> Self {
        Self {
            script: schedule(text),
            next: 0,
            started_at: None,
            sink,
        }
    }
}

impl<F: FnMut(char)> FrameTask for TypewriterTask<F> {
    fn tick(&mut self, now: f64) -> TaskState {
        let elapsed = now - *self.started_at.get_or_insert(now);
        while let Some(&(ch, at)) = self.script.get(self.next) {
            if at > elapsed {
                break;
            }
            (self.sink)(ch);
            self.next += 1;
        }
        if self.next >= self.script.len() {
            TaskState::Finished
        } else {
            TaskState::Running
        }
    }
}

/// How the heading is brought in.
#[derive(Clone, Debug, PartialEq)]
pub enum Intro {
    Fade { duration_ms: u32 },
    Type(String),
    Skip,
}

/// Reduced motion and headings with nested markup fade in; anything else
/// with text is typed.
pub fn intro(reduced_motion: bool, has_child_elements: bool, text: &str) -> Intro {
    if reduced_motion {
        return Intro::Fade { duration_ms: 250 };
    }
    if has_child_elements {
        return Intro::Fade { duration_ms: 350 };
    }
    match text.trim() {
        "" => Intro::Skip,
        trimmed => Intro::Type(trimmed.to_string()),
    }
}

thread_local! {
    static TYPED: RefCell<Registry<HtmlElement, ()>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    let Some(heading) = HEADINGS.iter().find_map(|sel| page.query(sel)) else {
        return Ok(());
    };
    if !TYPED.with(|reg| reg.borrow_mut().claim(heading.clone(), || ())) {
        return Ok(());
    }
    let text = heading.text_content().unwrap_or_default();
    let text = match intro(page.reduced_motion, heading.child_element_count() > 0, &text) {
        Intro::Fade { duration_ms } => {
            fade_in(&heading, duration_ms);
            return Ok(());
        }
        Intro::Skip => return Ok(()),
        Intro::Type(text) => text,
    };

    heading.set_text_content(Some(""));
    set_style(&heading, "white-space", "pre-wrap");
    set_style(&heading, "opacity", "0.98");

    let target = heading.clone();
    let document = page.document.clone();
    let mut shown = false;
    frames::spawn(TypewriterTask::new(&text, move |ch| {
        if !shown {
            set_style(&target, "opacity", "1");
            shown = true;
        }
        let node = document.create_text_node(&ch.to_string());
        let _ = target.append_child(&node);
    }));
    log::debug!("typewriter: {} chars", text.chars().count());
    Ok(())
}

fn fade_in(el: &HtmlElement, duration_ms: u32) {
    let original = style(el, "transition");
    set_style(
        el,
        "transition",
        &merge_transitions(&original, &format!("opacity {duration_ms}ms ease-out")),
    );
    set_style(el, "opacity", "0");
    let target = el.clone();
    frames::next_frame(move || {
        set_style(&target, "opacity", "1");
        let restore_on = target.clone();
        let _ = listen_once(&target, "transitionend", move |_| {
            restore_style(&restore_on, "transition", &original)
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::VirtualClock;
    use std::rc::Rc;

    #[test]
    fn pacing_depends_on_character() {
        assert_eq!(delay_after('a'), 38.0);
        assert_eq!(delay_after(' '), 12.0);
        assert_eq!(delay_after('!'), 110.0);
    }

    #[test]
    fn schedule_accumulates_delays() {
        let times: Vec<f64> = schedule("Hi, yo").into_iter().map(|(_, at)| at).collect();
        assert_eq!(times, vec![60.0, 98.0, 136.0, 246.0, 258.0, 296.0]);
    }

    #[test]
    fn task_types_whole_text_in_order() {
        let typed = Rc::new(RefCell::new(String::new()));
        let sink = typed.clone();
        let mut clock = VirtualClock::new(16.0);
        clock.spawn(TypewriterTask::new("Learn. Edit.", move |ch| sink.borrow_mut().push(ch)));

        clock.advance(50.0);
        assert!(typed.borrow().is_empty());
        clock.advance(100.0);
        assert!(typed.borrow().starts_with("Le"));
        clock.advance(2000.0);
        assert_eq!(*typed.borrow(), "Learn. Edit.");
        assert_eq!(clock.active_tasks(), 0);
    }

    #[test]
    fn intro_prefers_fading_when_typing_is_unsuitable() {
        assert_eq!(intro(true, false, "Hello"), Intro::Fade { duration_ms: 250 });
        assert_eq!(intro(true, true, "Hello"), Intro::Fade { duration_ms: 250 });
        assert_eq!(intro(false, true, "Hello"), Intro::Fade { duration_ms: 350 });
        assert_eq!(intro(false, false, "  Hi there \n"), Intro::Type("Hi there".into()));
        assert_eq!(intro(false, false, "   "), Intro::Skip);
    }

    #[test]
    fn empty_text_finishes_immediately() {
        let mut clock = VirtualClock::new(16.0);
        clock.spawn(TypewriterTask::new("", |_| {}));
        clock.advance(16.0);
        assert_eq!(clock.active_tasks(), 0);
    }
}
