//! Contact form: validate, submit in the background, celebrate on success.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::future::Future;
use std::rc::Rc;

use gloo_net::http::Request;
use rand::Rng;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FormData, HtmlButtonElement, HtmlElement, HtmlFormElement};

use crate::config::Config;
use crate::dom::frames::BrowserScheduler;
use crate::dom::observe::listen;
use crate::dom::{clear_style, rect_of, set_style, Page};
use crate::error::FxResult;
use crate::motion::easing::progress;
use crate::motion::{ease_out_cubic, FrameTask, Registry, Scheduler, TaskState};
use crate::style::Rect;

pub const FILL_ALL_FIELDS: &str = "Please fill all fields.";
pub const SUBMISSION_FAILED: &str = "Submission failed.";
pub const NETWORK_ERROR: &str = "Network error. Try again.";
pub const SUCCESS_LABEL: &str = "Message Sent Successfully ✨";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Fields {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

/// What came back from the endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Accepted,
    Rejected { body: Option<String> },
    Unreachable,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: Option<String>,
}

/// Joins `{errors: [{message}]}` messages, or falls back to a generic text.
pub fn rejection_message(body: Option<&str>) -> String {
    body.and_then(|raw| serde_json::from_str::<ErrorBody>(raw).ok())
        .map(|parsed| {
            parsed
                .errors
                .into_iter()
                .filter_map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| SUBMISSION_FAILED.to_string())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

/// Result of one submit action.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    /// A required field was blank; nothing was sent.
    Invalid,
    /// A submission is already in flight.
    Busy,
    Sent,
    Failed(String),
}

/// Submission state: idle until a valid submit, sending until the endpoint
/// answers.
#[derive(Debug, Default)]
pub struct ContactFlow {
    phase: Phase,
}

impl ContactFlow {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Validates and, if the form may be sent, moves to sending.
    pub fn begin(&mut self, fields: &Fields) -> Option<Report> {
        if self.phase == Phase::Sending {
            return Some(Report::Busy);
        }
        if !fields.is_complete() {
            return Some(Report::Invalid);
        }
        self.phase = Phase::Sending;
        None
    }

    pub fn finish(&mut self, outcome: Outcome) -> Report {
        self.phase = Phase::Idle;
        match outcome {
            Outcome::Accepted => Report::Sent,
            Outcome::Rejected { body } => Report::Failed(rejection_message(body.as_deref())),
            Outcome::Unreachable => Report::Failed(NETWORK_ERROR.to_string()),
        }
    }
}

/// The DOM surface the submission flow drives.
pub trait ContactView {
    type Node: Clone + 'static;

    fn show_status(&self, message: &str);
    fn clear_status(&self);
    fn set_sending(&self);
    fn reset_button(&self);
    fn reset_form(&self);
    fn morph_button(&self);
    fn end_button_pulse(&self);
    /// Button centre and launch height inside the effects layer, in px.
    fn anchor(&self) -> Anchor;
    fn spawn_bubble(&self, anchor: Anchor) -> Option<Self::Node>;
    fn spawn_particle(&self, anchor: Anchor) -> Option<Self::Node>;
    fn place_particle(&self, node: &Self::Node, left: f64, bottom: f64, opacity: f64);
    fn remove(&self, node: &Self::Node);
}

/// Where the celebration starts, relative to the effects layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Anchor {
    pub center_x: f64,
    pub bottom: f64,
}

impl Anchor {
    /// Centred on the button, 8px above it, never lower than 12px.
    pub fn between(button: &Rect, layer: &Rect) -> Anchor {
        Anchor {
            center_x: button.left - layer.left + button.width / 2.0,
            bottom: (layer.bottom() - button.top).max(12.0) + 8.0,
        }
    }

    pub fn particle_origin(&self) -> (f64, f64) {
        (self.center_x, self.bottom - 12.0)
    }
}

/// Fixed timings of the success animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Celebration {
    pub particle_count: usize,
    pub particle_duration_ms: f64,
    pub bubble_lifetime_ms: u32,
    pub button_pulse_ms: u32,
    pub button_reset_ms: u32,
}

impl From<&Config> for Celebration {
    fn from(config: &Config) -> Self {
        Celebration {
            particle_count: config.particle_count,
            particle_duration_ms: f64::from(config.particle_duration_ms),
            bubble_lifetime_ms: config.bubble_lifetime_ms,
            button_pulse_ms: config.button_pulse_ms,
            button_reset_ms: config.button_reset_ms,
        }
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Celebration::from(&Config::default())
    }
}

/// Radial offset a particle travels, in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    pub dx: f64,
    pub dy: f64,
}

impl Trajectory {
    pub fn random(rng: &mut impl Rng) -> Trajectory {
        let angle = rng.gen::<f64>() * TAU;
        let radius = 60.0 + rng.gen::<f64>() * 120.0;
        Trajectory {
            dx: angle.cos() * radius,
            dy: angle.sin() * radius,
        }
    }

    /// `(dx, dy, opacity)` at linear progress `k`.
    pub fn at(&self, k: f64) -> (f64, f64, f64) {
        let e = ease_out_cubic(k);
        (self.dx * e, self.dy * e, 1.0 - k)
    }
}

struct ParticleTask<V: ContactView> {
    view: Rc<V>,
    node: V::Node,
    origin: (f64, f64),
    path: Trajectory,
    duration_ms: f64,
    started_at: Option<f64>,
}

impl<V: ContactView> FrameTask for ParticleTask<V> {
    fn tick(&mut self, now: f64) -> TaskState {
        let t0 = *self.started_at.get_or_insert(now);
        let k = progress(now - t0, self.duration_ms);
        let (dx, dy, opacity) = self.path.at(k);
        self.view
            .place_particle(&self.node, self.origin.0 + dx, self.origin.1 + dy, opacity);
        if k < 1.0 {
            TaskState::Running
        } else {
            self.view.remove(&self.node);
            TaskState::Finished
        }
    }
}

/// Clears the form and plays the floating label, particle burst and button
/// morph. The button is handed back after `button_reset_ms` regardless of
/// how far the animation got.
pub fn celebrate<V: ContactView + 'static>(
    view: &Rc<V>,
    scheduler: &mut impl Scheduler,
    plan: &Celebration,
    rng: &mut impl Rng,
) {
    view.reset_form();
    view.clear_status();

    let anchor = view.anchor();
    if let Some(bubble) = view.spawn_bubble(anchor) {
        let view = view.clone();
        scheduler.after(plan.bubble_lifetime_ms, Box::new(move || view.remove(&bubble)));
    }

    for _ in 0..plan.particle_count {
        let Some(node) = view.spawn_particle(anchor) else {
            continue;
        };
        scheduler.frames(Box::new(ParticleTask {
            view: view.clone(),
            node,
            origin: anchor.particle_origin(),
            path: Trajectory::random(rng),
            duration_ms: plan.particle_duration_ms,
            started_at: None,
        }));
    }

    view.morph_button();
    {
        let view = view.clone();
        scheduler.after(plan.button_pulse_ms, Box::new(move || view.end_button_pulse()));
    }
    let view = view.clone();
    scheduler.after(plan.button_reset_ms, Box::new(move || view.reset_button()));
}

/// Runs one submit action end to end. `send` is only called when the fields
/// are complete and nothing else is in flight.
pub async fn submit<V, S, Fut>(
    flow: &RefCell<ContactFlow>,
    view: &Rc<V>,
    fields: &Fields,
    send: S,
    on_sent: impl FnOnce(),
) -> Report
where
    V: ContactView + 'static,
    S: FnOnce() -> Fut,
    Fut: Future<Output = Outcome>,
{
    if let Some(early) = flow.borrow_mut().begin(fields) {
        if early == Report::Invalid {
            view.show_status(FILL_ALL_FIELDS);
        }
        return early;
    }
    view.set_sending();

    let outcome = send().await;
    let report = flow.borrow_mut().finish(outcome);
    match &report {
        Report::Sent => on_sent(),
        Report::Failed(message) => {
            view.show_status(message);
            view.reset_button();
        }
        Report::Invalid | Report::Busy => {}
    }
    report
}

async fn post(endpoint: &str, body: FormData) -> Outcome {
    let response = Request::post(endpoint)
        .header("Accept", "application/json")
        .body(body)
        .send()
        .await;
    match response {
        Ok(resp) if resp.ok() => Outcome::Accepted,
        Ok(resp) => Outcome::Rejected {
            body: resp.text().await.ok(),
        },
        Err(e) => {
            log::warn!("contact: request failed: {}", e);
            Outcome::Unreachable
        }
    }
}

struct DomContactView {
    document: web_sys::Document,
    form: HtmlFormElement,
    status: Option<HtmlElement>,
    button: HtmlButtonElement,
    layer: HtmlElement,
}

impl DomContactView {
    fn label(&self) -> Option<web_sys::Element> {
        self.button.query_selector("span").ok().flatten()
    }

    fn create(&self, class: &str) -> Option<HtmlElement> {
        let el = self.document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()?;
        el.set_class_name(class);
        self.layer.append_child(&el).ok()?;
        Some(el)
    }
}

impl ContactView for DomContactView {
    type Node = HtmlElement;

    fn show_status(&self, message: &str) {
        if let Some(status) = &self.status {
            let _ = status.class_list().remove_1("visually-hidden");
            status.set_text_content(Some(message));
        }
    }

    fn clear_status(&self) {
        if let Some(status) = &self.status {
            status.set_text_content(Some(""));
        }
    }

    fn set_sending(&self) {
        self.button.set_disabled(true);
        set_style(&self.button, "filter", "brightness(0.9)");
        set_style(&self.button, "pointer-events", "none");
    }

    fn reset_button(&self) {
        self.button.set_disabled(false);
        clear_style(&self.button, "filter");
        clear_style(&self.button, "pointer-events");
        let _ = self.button.class_list().remove_1("success");
        if let Some(label) = self.label() {
            label.set_text_content(Some("Send"));
        }
    }

    fn reset_form(&self) {
        self.form.reset();
    }

    fn morph_button(&self) {
        let _ = self.button.class_list().add_1("success");
        if let Some(label) = self.label() {
            label.set_text_content(Some("Sent"));
        }
        set_style(
            &self.button,
            "box-shadow",
            "0 0 12px rgba(16,185,129,.65), 0 0 24px rgba(52,211,153,.45)",
        );
        set_style(&self.button, "transform", "scale(1.03)");
    }

    fn end_button_pulse(&self) {
        clear_style(&self.button, "box-shadow");
        clear_style(&self.button, "transform");
    }

    fn anchor(&self) -> Anchor {
        Anchor::between(&rect_of(&self.button), &rect_of(&self.layer))
    }

    fn spawn_bubble(&self, anchor: Anchor) -> Option<HtmlElement> {
        let bubble = self.create("success-bubble")?;
        bubble.set_text_content(Some(SUCCESS_LABEL));
        set_style(&bubble, "left", &format!("{}px", anchor.center_x));
        set_style(&bubble, "bottom", &format!("{}px", anchor.bottom));
        set_style(&bubble, "transform", "translateX(-50%) translateY(10px)");
        set_style(&bubble, "animation", "floatUpFade 2.5s ease-out forwards");
        Some(bubble)
    }

    fn spawn_particle(&self, anchor: Anchor) -> Option<HtmlElement> {
        let particle = self.create("particle")?;
        let (left, bottom) = anchor.particle_origin();
        self.place_particle(&particle, left, bottom, 0.0);
        Some(particle)
    }

    fn place_particle(&self, node: &HtmlElement, left: f64, bottom: f64, opacity: f64) {
        set_style(node, "left", &format!("{left}px"));
        set_style(node, "bottom", &format!("{bottom}px"));
        set_style(node, "opacity", &opacity.to_string());
    }

    fn remove(&self, node: &HtmlElement) {
        node.remove();
    }
}

fn read_fields(data: &FormData) -> Fields {
    let field = |name: &str| data.get(name).as_string().unwrap_or_default();
    Fields {
        name: field("name"),
        email: field("email"),
        message: field("message"),
    }
}

thread_local! {
    static FORMS: RefCell<Registry<HtmlFormElement, ()>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    let Some(form) = page
        .by_id("contact-form")
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        return Ok(());
    };
    let Some(button) = page
        .by_id("sendBtn")
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    else {
        return Ok(());
    };
    let Some(layer) = page.by_id("success-float") else {
        return Ok(());
    };
    if !FORMS.with(|reg| reg.borrow_mut().claim(form.clone(), || ())) {
        return Ok(());
    }

    let endpoint = form
        .get_attribute("action")
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| page.config.form_endpoint.clone());
    let plan = Celebration::from(&page.config);
    let view = Rc::new(DomContactView {
        document: page.document.clone(),
        form: form.clone(),
        status: page.by_id("form-status"),
        button,
        layer,
    });
    let flow = Rc::new(RefCell::new(ContactFlow::default()));

    listen(&form.clone(), "submit", move |event| {
        event.prevent_default();
        view.clear_status();
        let Ok(data) = FormData::new_with_form(&form) else {
            return;
        };
        let fields = read_fields(&data);
        let (flow, view, endpoint) = (flow.clone(), view.clone(), endpoint.clone());
        spawn_local(async move {
            let celebrate_view = view.clone();
            let report = submit(&flow, &view, &fields, || post(&endpoint, data), move || {
                celebrate(&celebrate_view, &mut BrowserScheduler, &plan, &mut rand::thread_rng())
            })
            .await;
            log::info!("contact: {:?}", report);
        });
    })
}
