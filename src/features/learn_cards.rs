//! Overview learn cards, animated through the optional gsap library: a
//! staggered entrance, an idle icon float and a pointer tilt.

use std::cell::{Cell, RefCell};

use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlElement, HtmlScriptElement, MouseEvent};

use crate::dom::observe::{listen, observe_once};
use crate::dom::{frames, rect_of, set_style, Page};
use crate::error::{FxError, FxResult};
use crate::motion::Registry;
use crate::style::viewport::horizontal_percent;
use crate::style::Rect;

const CARDS: &str = "#overview .learn-card";
const ICON: &str = ".learn-icon";
const ENTER_THRESHOLD: f64 = 0.2;
const STAGGER_SECS: f64 = 0.06;

pub fn stagger_delay(index: usize) -> f64 {
    index as f64 * STAGGER_SECS
}

/// True when a card sits in the middle 80% of the viewport.
pub fn already_in_view(rect: &Rect, viewport_height: f64) -> bool {
    rect.top < viewport_height * 0.9 && rect.bottom() > viewport_height * 0.1
}

/// Pointer position as fractions of the card box, `(0.5, 0.5)` at the centre.
pub fn pointer_fraction(client_x: f64, client_y: f64, rect: &Rect) -> (f64, f64) {
    let mx = horizontal_percent(client_x, rect) / 100.0;
    let my = if rect.height <= 0.0 {
        0.5
    } else {
        (client_y - rect.top) / rect.height
    };
    (mx, my)
}

/// `(rotationX, rotationY)` in degrees for a pointer at `(mx, my)`.
pub fn tilt(mx: f64, my: f64) -> (f64, f64) {
    ((0.5 - my) * 8.0, (mx - 0.5) * 10.0)
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Tween {
    #[serde(skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ease: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    yoyo: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Perspective {
    transform_perspective: u32,
    transform_style: &'static str,
}

#[derive(Serialize)]
struct Timeline {
    defaults: Tween,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    yoyo: Option<bool>,
}

fn to_js<T: Serialize>(value: &T) -> FxResult<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| FxError::Js(e.to_string()))
}

/// Calls `target[method](...args)`.
fn invoke(target: &JsValue, method: &str, args: &[JsValue]) -> FxResult<JsValue> {
    let function: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    let args: Array = args.iter().collect();
    Ok(function.apply(target, &args)?)
}

/// Handle on the global gsap object.
#[derive(Clone)]
pub struct Gsap(JsValue);

impl Gsap {
    fn from_window(window: &web_sys::Window) -> Option<Gsap> {
        Reflect::get(window, &JsValue::from_str("gsap"))
            .ok()
            .filter(|g| g.is_object())
            .map(Gsap)
    }

    fn timeline(&self, options: &Timeline) -> FxResult<JsValue> {
        invoke(&self.0, "timeline", &[to_js(options)?])
    }

    /// Returns a setter that tweens `prop` towards each value it is given.
    fn quick_to(&self, target: &HtmlElement, prop: &str) -> FxResult<Function> {
        let options = to_js(&Tween {
            duration: Some(0.18),
            ease: Some("power2.out"),
            ..Tween::default()
        })?;
        let setter = invoke(&self.0, "quickTo", &[target.clone().into(), prop.into(), options])?;
        Ok(setter.dyn_into()?)
    }
}

/// Resolves with the gsap global, injecting its script first when needed.
/// `None` when the script fails to load.
pub async fn load(page: &Page) -> Option<Gsap> {
    if let Some(gsap) = Gsap::from_window(&page.window) {
        return Some(gsap);
    }
    let injected = inject_script(page, &page.config.animation_library_src);
    match injected {
        Ok(loaded) => {
            if let Err(e) = JsFuture::from(loaded).await {
                log::warn!("animation library unavailable: {}", FxError::from(e));
                return None;
            }
        }
        Err(e) => {
            log::warn!("animation library unavailable: {}", e);
            return None;
        }
    }
    Gsap::from_window(&page.window)
}

fn inject_script(page: &Page, src: &str) -> FxResult<Promise> {
    let script = page
        .document
        .create_element("script")?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| FxError::Js("<script> is not an HtmlScriptElement".into()))?;
    script.set_src(src);
    script.set_async(true);
    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    let head = page.document.head().ok_or(FxError::MissingGlobal("document.head"))?;
    head.append_child(&script)?;
    Ok(loaded)
}

thread_local! {
    static ENTERED: RefCell<Registry<HtmlElement, ()>> = RefCell::new(Registry::new());
    static WIRED: Cell<bool> = Cell::new(false);
}

fn enter(gsap: &Gsap, card: &HtmlElement, index: usize) -> FxResult {
    if !ENTERED.with(|reg| reg.borrow_mut().claim(card.clone(), || ())) {
        return Ok(());
    }
    let icon = card
        .query_selector(ICON)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());

    invoke(
        &gsap.0,
        "set",
        &[
            card.clone().into(),
            to_js(&Perspective {
                transform_perspective: 800,
                transform_style: "preserve-3d",
            })?,
        ],
    )?;
    set_style(card, "will-change", "transform");

    let entrance = gsap.timeline(&Timeline {
        defaults: Tween { ease: Some("power2.out"), ..Tween::default() },
        delay: Some(stagger_delay(index)),
        repeat: None,
        yoyo: None,
    })?;
    invoke(
        &entrance,
        "fromTo",
        &[
            card.clone().into(),
            to_js(&Tween {
                opacity: Some(0.0),
                y: Some(24.0),
                scale: Some(0.96),
                rotate_x: Some(-6.0),
                ..Tween::default()
            })?,
            to_js(&Tween {
                opacity: Some(1.0),
                y: Some(0.0),
                scale: Some(1.0),
                rotate_x: Some(0.0),
                duration: Some(0.6),
                ..Tween::default()
            })?,
        ],
    )?;

    if let Some(icon) = &icon {
        set_style(icon, "will-change", "transform");
        invoke(
            &entrance,
            "fromTo",
            &[
                icon.clone().into(),
                to_js(&Tween { scale: Some(0.85), rotation: Some(-8.0), ..Tween::default() })?,
                to_js(&Tween {
                    scale: Some(1.0),
                    rotation: Some(0.0),
                    duration: Some(0.38),
                    ease: Some("back.out(2)"),
                    ..Tween::default()
                })?,
                "-=0.2".into(),
            ],
        )?;
        float_icon(gsap, icon)?;
    }

    wire_tilt(gsap, card)
}

fn float_icon(gsap: &Gsap, icon: &HtmlElement) -> FxResult {
    let idle = gsap.timeline(&Timeline {
        defaults: Tween { ease: Some("sine.inOut"), ..Tween::default() },
        delay: None,
        repeat: Some(-1),
        yoyo: Some(true),
    })?;
    for (y, rotation, duration) in [(3.0, 2.0, 2.0), (-3.0, -2.0, 2.0), (0.0, 0.0, 1.6)] {
        invoke(
            &idle,
            "to",
            &[
                icon.clone().into(),
                to_js(&Tween {
                    y: Some(y),
                    rotation: Some(rotation),
                    duration: Some(duration),
                    ..Tween::default()
                })?,
            ],
        )?;
    }
    invoke(
        &gsap.0,
        "to",
        &[
            icon.clone().into(),
            to_js(&Tween {
                scale: Some(1.02),
                duration: Some(2.4),
                repeat: Some(-1),
                yoyo: Some(true),
                ease: Some("sine.inOut"),
                delay: Some(0.6),
                ..Tween::default()
            })?,
        ],
    )?;
    Ok(())
}

fn wire_tilt(gsap: &Gsap, card: &HtmlElement) -> FxResult {
    let rotate_x = gsap.quick_to(card, "rotationX")?;
    let rotate_y = gsap.quick_to(card, "rotationY")?;
    let scale = gsap.quick_to(card, "scale")?;
    let set = |f: &Function, v: f64| {
        let _ = f.call1(&JsValue::NULL, &JsValue::from_f64(v));
    };

    {
        let (card_ref, rotate_x, rotate_y) = (card.clone(), rotate_x.clone(), rotate_y.clone());
        listen(card, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let (mx, my) = pointer_fraction(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                &rect_of(&card_ref),
            );
            let (rx, ry) = tilt(mx, my);
            set(&rotate_x, rx);
            set(&rotate_y, ry);
        })?;
    }
    for event in ["mouseenter", "focus"] {
        let scale = scale.clone();
        listen(card, event, move |_| set(&scale, 1.02))?;
    }
    for event in ["mouseleave", "blur"] {
        let (rotate_x, rotate_y, scale) = (rotate_x.clone(), rotate_y.clone(), scale.clone());
        listen(card, event, move |_| {
            set(&rotate_x, 0.0);
            set(&rotate_y, 0.0);
            set(&scale, 1.0);
        })?;
    }
    Ok(())
}

fn enter_logged(gsap: &Gsap, card: &HtmlElement, index: usize) {
    if let Err(e) = enter(gsap, card, index) {
        log::warn!("learn card animation failed: {}", e);
    }
}

pub fn init(page: &Page) -> FxResult {
    if page.reduced_motion {
        return Ok(());
    }
    let cards = page.query_all(&[CARDS]);
    if cards.is_empty() {
        return Ok(());
    }
    if WIRED.with(|w| w.replace(true)) {
        return Ok(());
    }
    let page = page.clone();
    spawn_local(async move {
        let Some(gsap) = load(&page).await else {
            return;
        };
        if !page.supports_intersection_observer() {
            for (i, card) in cards.iter().enumerate() {
                enter_logged(&gsap, card, i);
            }
            return;
        }

        let (observed, on_enter_gsap) = (cards.clone(), gsap.clone());
        let observing = observe_once(&cards, ENTER_THRESHOLD, None, move |card| {
            let index = observed.iter().position(|c| c == card).unwrap_or(0);
            enter_logged(&on_enter_gsap, card, index);
        });
        if let Err(e) = observing {
            log::warn!("learn cards: {}", e);
            return;
        }
        frames::next_frame(move || {
            let vh = page.viewport_height();
            for (i, card) in cards.iter().enumerate() {
                if already_in_view(&rect_of(card), vh) {
                    enter_logged(&gsap, card, i);
                }
            }
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrance_is_staggered_by_index() {
        assert_eq!(stagger_delay(0), 0.0);
        assert!((stagger_delay(3) - 0.18).abs() < 1e-12);
    }

    #[test]
    fn in_view_band_excludes_edges() {
        let card = |top: f64| Rect { left: 0.0, top, width: 200.0, height: 100.0 };
        assert!(already_in_view(&card(300.0), 1000.0));
        assert!(!already_in_view(&card(950.0), 1000.0));
        assert!(!already_in_view(&card(-20.0), 1000.0));
    }

    #[test]
    fn tilt_is_flat_at_centre_and_bounded_at_corners() {
        let rect = Rect { left: 100.0, top: 50.0, width: 200.0, height: 100.0 };
        let (mx, my) = pointer_fraction(200.0, 100.0, &rect);
        assert_eq!((mx, my), (0.5, 0.5));
        assert_eq!(tilt(mx, my), (0.0, 0.0));
        assert_eq!(tilt(0.0, 0.0), (4.0, -5.0));
        assert_eq!(tilt(1.0, 1.0), (-4.0, 5.0));
    }
}
