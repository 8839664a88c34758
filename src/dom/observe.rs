use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Event, EventTarget, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::error::FxResult;

/// Calls `on_enter` the first time each target intersects, then unobserves
/// it. The observer lives as long as the page.
pub fn observe_once(
    targets: &[HtmlElement],
    threshold: f64,
    root_margin: Option<&str>,
    on_enter: impl Fn(&HtmlElement) + 'static,
) -> FxResult {
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                observer.unobserve(&target);
                if let Ok(el) = target.dyn_into::<HtmlElement>() {
                    on_enter(&el);
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    for el in targets {
        observer.observe(el);
    }
    callback.forget();
    Ok(())
}

/// Attaches a page-lifetime listener.
pub fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) -> FxResult {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Runs `handler` on every scroll and resize of the window, and once now.
pub fn on_scroll_and_resize(window: &web_sys::Window, handler: impl Fn() + 'static) -> FxResult {
    let handler = std::rc::Rc::new(handler);
    let on_scroll = handler.clone();
    listen(window, "scroll", move |_| on_scroll())?;
    let on_resize = handler.clone();
    listen(window, "resize", move |_| on_resize())?;
    handler();
    Ok(())
}

/// Attaches a listener that the browser removes after its first call.
pub fn listen_once(
    target: &EventTarget,
    event: &str,
    handler: impl FnOnce(Event) + 'static,
) -> FxResult {
    let callback = Closure::once_into_js(handler);
    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.unchecked_ref(),
        &options,
    )?;
    Ok(())
}
