//! Before/after comparison: two looping videos kept in lockstep under a
//! draggable split.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Element, Event, HtmlElement, HtmlInputElement, HtmlMediaElement, MouseEvent, TouchEvent,
};

use crate::dom::frames::BrowserScheduler;
use crate::dom::observe::listen;
use crate::dom::{rect_of, Page};
use crate::error::FxResult;
use crate::motion::{Registry, Scheduler};
use crate::style::viewport::horizontal_percent;

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
pub const HAVE_CURRENT_DATA: u16 = 2;

const SYNC_EVENTS: &[&str] = &["play", "timeupdate", "seeked", "loadeddata", "canplay"];

/// What the synchronizer needs from a video element.
pub trait Playback {
    fn current_time(&self) -> f64;
    fn seek(&self, seconds: f64);
    fn is_paused(&self) -> bool;
    fn ready_state(&self) -> u16;
    /// Starts playback. Failures are ignored; the next correction retries.
    fn resume(&self);
}

impl Playback for HtmlMediaElement {
    fn current_time(&self) -> f64 {
        HtmlMediaElement::current_time(self)
    }

    fn seek(&self, seconds: f64) {
        self.set_current_time(seconds);
    }

    fn is_paused(&self) -> bool {
        self.paused()
    }

    fn ready_state(&self) -> u16 {
        HtmlMediaElement::ready_state(self)
    }

    fn resume(&self) {
        if let Ok(promise) = self.play() {
            spawn_local(async move {
                let _ = JsFuture::from(promise).await;
            });
        }
    }
}

/// Actions one correction pass takes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Correction {
    pub seek_both_to: Option<f64>,
    pub resume_a: bool,
    pub resume_b: bool,
}

/// Snap both videos to the earlier of their times when they drift apart and
/// both have a frame to show; resume whichever is paused if only one is.
pub fn plan_correction(a: &impl Playback, b: &impl Playback, tolerance: f64) -> Correction {
    let (ta, tb) = (a.current_time(), b.current_time());
    let both_ready = a.ready_state() >= HAVE_CURRENT_DATA && b.ready_state() >= HAVE_CURRENT_DATA;
    let seek_both_to = ((ta - tb).abs() > tolerance && both_ready).then(|| ta.min(tb));
    let (pa, pb) = (a.is_paused(), b.is_paused());
    Correction {
        seek_both_to,
        resume_a: pa && !pb,
        resume_b: pb && !pa,
    }
}

pub fn align(a: &impl Playback, b: &impl Playback, tolerance: f64) -> Correction {
    let plan = plan_correction(a, b, tolerance);
    if let Some(t) = plan.seek_both_to {
        a.seek(t);
        b.seek(t);
    }
    if plan.resume_a {
        a.resume();
    }
    if plan.resume_b {
        b.resume();
    }
    plan
}

pub fn clamp_percent(pct: f64) -> f64 {
    if pct.is_nan() {
        return 50.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Range input value as a percentage; unparsable input centres the split.
pub fn parse_range(value: &str) -> f64 {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(50.0)
}

/// Tap on a coarse pointer flips the split to the far side.
pub fn tap_target(current: f64) -> f64 {
    if current < 50.0 {
        100.0
    } else {
        0.0
    }
}

pub fn css_position(pct: f64) -> String {
    format!("{}%", clamp_percent(pct))
}

/// The split position, mirrored to the wrapper's `--pos` and the range input.
#[derive(Clone)]
struct Slider {
    wrap: HtmlElement,
    input: HtmlInputElement,
}

impl Slider {
    fn set(&self, pct: f64) {
        let pct = clamp_percent(pct);
        let _ = self.wrap.style().set_property("--pos", &css_position(pct));
        self.input.set_value(&pct.to_string());
    }

    fn current(&self) -> f64 {
        parse_range(&self.input.value())
    }

    fn set_from_client_x(&self, client_x: f64) {
        self.set(horizontal_percent(client_x, &rect_of(&self.wrap)));
    }
}

fn client_x(event: &Event) -> Option<f64> {
    if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        return touch.touches().get(0).map(|t| t.client_x() as f64);
    }
    event.dyn_ref::<MouseEvent>().map(|m| m.client_x() as f64)
}

/// What the hint needs from its element.
pub trait HintTarget: Clone + 'static {
    /// Starts the CSS fade-out.
    fn fade(&self);
    fn remove(&self);
}

impl HintTarget for HtmlElement {
    fn fade(&self) {
        let _ = self.class_list().add_1("hide");
    }

    fn remove(&self) {
        Element::remove(self);
    }
}

/// The one-time "drag me" hint. Clones share the dismissed flag.
#[derive(Clone)]
pub struct Hint<T> {
    el: Option<T>,
    dismissed: Rc<Cell<bool>>,
    fade_ms: u32,
}

impl<T: HintTarget> Hint<T> {
    pub fn new(el: Option<T>, fade_ms: u32) -> Self {
        Self { el, dismissed: Rc::new(Cell::new(false)), fade_ms }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.get()
    }

    /// Fades the hint and removes it after the fade. Later calls do nothing.
    pub fn dismiss(&self, scheduler: &mut impl Scheduler) {
        if self.dismissed.replace(true) {
            return;
        }
        let Some(el) = self.el.clone() else { return };
        el.fade();
        scheduler.after(self.fade_ms, Box::new(move || el.remove()));
    }
}

thread_local! {
    static COMPARES: RefCell<Registry<HtmlElement, ()>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    let Some(wrap) = page.query("#compare .compare-media") else {
        return Ok(());
    };
    let Some(input) = page
        .query("#compare .compare-range")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return Ok(());
    };
    let before = page.by_id("vid-before").and_then(|el| el.dyn_into::<HtmlMediaElement>().ok());
    let after = page.by_id("vid-after").and_then(|el| el.dyn_into::<HtmlMediaElement>().ok());
    let (Some(before), Some(after)) = (before, after) else {
        return Ok(());
    };
    if !COMPARES.with(|reg| reg.borrow_mut().claim(wrap.clone(), || ())) {
        return Ok(());
    }

    for video in [&before, &after] {
        video.set_muted(true);
        video.set_loop(true);
        let _ = video.set_attribute("playsinline", "");
    }

    let tolerance = page.config.sync_tolerance_secs;
    let sync = {
        let (a, b) = (before.clone(), after.clone());
        Rc::new(move || {
            align(&a, &b, tolerance);
        })
    };
    let try_play = {
        let (a, b, sync) = (before.clone(), after.clone(), sync.clone());
        Rc::new(move || {
            a.resume();
            b.resume();
            sync();
        })
    };

    {
        let try_play = try_play.clone();
        listen(&page.document, "visibilitychange", move |_| try_play())?;
    }
    for video in [&before, &after] {
        for event in SYNC_EVENTS {
            let sync = sync.clone();
            listen(video, event, move |_| sync())?;
        }
    }
    {
        let sync = sync.clone();
        Interval::new(page.config.sync_interval_ms, move || sync()).forget();
    }

    let slider = Slider { wrap: wrap.clone(), input: input.clone() };
    let hint = Hint::new(page.by_id("compare-hint"), page.config.hint_fade_ms);
    let dragging = Rc::new(Cell::new(false));

    for event in ["mousedown", "touchstart"] {
        let (slider, hint, dragging) = (slider.clone(), hint.clone(), dragging.clone());
        listen(&wrap, event, move |e| {
            dragging.set(true);
            if let Some(x) = client_x(&e) {
                slider.set_from_client_x(x);
            }
            hint.dismiss(&mut BrowserScheduler);
        })?;
    }
    for event in ["mousemove", "touchmove"] {
        let (slider, dragging) = (slider.clone(), dragging.clone());
        listen(&page.window, event, move |e| {
            if !dragging.get() {
                return;
            }
            if let Some(x) = client_x(&e) {
                slider.set_from_client_x(x);
            }
        })?;
    }
    for event in ["mouseup", "touchend"] {
        let dragging = dragging.clone();
        listen(&page.window, event, move |_| dragging.set(false))?;
    }
    {
        let slider_for_input = slider.clone();
        listen(&input, "input", move |_| {
            let value = slider_for_input.current();
            slider_for_input.set(value);
        })?;
    }
    {
        let (slider, hint, page) = (slider.clone(), hint.clone(), page.clone());
        listen(&wrap, "click", move |_| {
            if page.coarse_pointer() {
                slider.set(tap_target(slider.current()));
                hint.dismiss(&mut BrowserScheduler);
            }
        })?;
    }
    {
        let hint = hint.clone();
        Timeout::new(page.config.hint_auto_hide_ms, move || {
            hint.dismiss(&mut BrowserScheduler)
        })
        .forget();
    }

    slider.set(50.0);
    try_play();
    log::debug!("compare: synchronizer running");
    Ok(())
}
