//! Scroll, pointer and form enhancements for a static marketing page.
//!
//! Each feature discovers its elements once, records the inline styles it
//! touches and settles them on a one-shot trigger. Features are independent:
//! a missing element or a failing browser API only disables that feature.

pub mod config;
pub mod dom;
pub mod error;
pub mod features;
pub mod motion;
pub mod style;

use log::{debug, info, warn};

use crate::dom::observe::listen_once;
use crate::dom::Page;
use crate::error::FxResult;

/// Runs every feature against the current page. Safe to call more than once;
/// already enhanced elements are left alone.
pub fn enhance(page: &Page) {
    for (name, init) in features::ALL {
        match init(page) {
            Ok(()) => debug!("{} ready", name),
            Err(e) => warn!("{} skipped: {}", name, e),
        }
    }
}

/// Enhances the page now, or once the document has finished parsing.
pub fn boot() -> FxResult {
    let page = Page::detect()?;
    info!(
        "booting page enhancements (reduced motion: {})",
        page.reduced_motion
    );
    if page.document.ready_state() == "loading" {
        let document = page.document.clone();
        listen_once(&document, "DOMContentLoaded", move |_| enhance(&page))?;
    } else {
        enhance(&page);
    }
    Ok(())
}
