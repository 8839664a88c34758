//! Background crossfade: the page video hands over to the email video as the
//! contact section scrolls into view.

use std::cell::Cell;
use std::rc::Rc;

use crate::dom::observe::on_scroll_and_resize;
use crate::dom::{frames, rect_of, set_style, Page};
use crate::error::FxResult;
use crate::motion::ease_in_out_cubic;
use crate::style::viewport::visible_share;
use crate::style::Rect;

const SECTION_ID: &str = "contact";
const MAIN_LAYER: &str = ".bg-video--main";
const EMAIL_LAYER: &str = ".bg-video--email";

/// Opacity of the email layer for the section's current box. The main layer
/// takes the complement.
pub fn blend(section: &Rect, viewport_height: f64) -> f64 {
    let base = visible_share(section, viewport_height);
    ease_in_out_cubic(((base - 0.02) / 0.96).clamp(0.0, 1.0))
}

thread_local! {
    static WIRED: Cell<bool> = Cell::new(false);
}

pub fn init(page: &Page) -> FxResult {
    let Some(section) = page.by_id(SECTION_ID) else {
        return Ok(());
    };
    let (Some(main), Some(email)) = (page.query(MAIN_LAYER), page.query(EMAIL_LAYER)) else {
        return Ok(());
    };
    if WIRED.with(|w| w.replace(true)) {
        return Ok(());
    }

    set_style(&main, "opacity", "1");
    set_style(&email, "opacity", "0");

    let ticking = Rc::new(Cell::new(false));
    let page_ctx = page.clone();
    on_scroll_and_resize(&page.window, move || {
        if ticking.replace(true) {
            return;
        }
        let (ticking, page, section, main, email) = (
            ticking.clone(),
            page_ctx.clone(),
            section.clone(),
            main.clone(),
            email.clone(),
        );
        frames::next_frame(move || {
            ticking.set(false);
            let t = blend(&rect_of(&section), page.viewport_height());
            set_style(&main, "opacity", &(1.0 - t).to_string());
            set_style(&email, "opacity", &t.to_string());
        });
    })?;
    log::debug!("crossfade wired");
    Ok(())
}
