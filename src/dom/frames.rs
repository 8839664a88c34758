use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::motion::{CancelToken, FrameTask, Scheduler, TaskState};

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drives `task` from `requestAnimationFrame` until it finishes or `token`
/// is cancelled.
pub fn run(task: impl FrameTask + 'static, token: CancelToken) {
    let slot: FrameSlot = Rc::new(RefCell::new(None));
    let handle = slot.clone();
    let mut task = task;
    *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
        if token.is_cancelled() || task.tick(now) == TaskState::Finished {
            // Dropping the closure ends the loop.
            let _ = handle.borrow_mut().take();
            return;
        }
        request(&handle);
    }));
    request(&slot);
}

/// Spawns a task with a fresh token and hands the token back.
pub fn spawn(task: impl FrameTask + 'static) -> CancelToken {
    let token = CancelToken::new();
    run(task, token.clone());
    token
}

fn request(slot: &FrameSlot) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(callback) = slot.borrow().as_ref() {
        if window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("requestAnimationFrame rejected, dropping frame task");
        }
    }
}

/// Runs `f` once on the next animation frame.
pub fn next_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move |_now: f64| f());
    let _ = window.request_animation_frame(callback.unchecked_ref());
}

/// Current `performance.now()`, or 0 when the API is missing.
pub fn now() -> f64 {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &"performance".into()).ok())
        .and_then(|perf| {
            let now = js_sys::Reflect::get(&perf, &"now".into()).ok()?;
            let now: js_sys::Function = now.dyn_into().ok()?;
            now.call0(&perf).ok()?.as_f64()
        })
        .unwrap_or(0.0)
}

/// Queues work on the real browser timers and animation frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn after(&mut self, delay_ms: u32, run: Box<dyn FnOnce()>) {
        gloo_timers::callback::Timeout::new(delay_ms, run).forget();
    }

    fn frames(&mut self, mut task: Box<dyn FrameTask>) {
        run(move |now: f64| task.tick(now), CancelToken::new());
    }
}
