//! Small one-shot page fixes: footer year and a steady background video.

use chrono::{Datelike, Local};

use crate::dom::{clear_style, set_style, Page};
use crate::error::FxResult;

pub fn set_year(page: &Page) -> FxResult {
    if let Some(el) = page.by_id("year") {
        el.set_text_content(Some(&Local::now().year().to_string()));
    }
    Ok(())
}

/// Pins the background video in place so no gaps open up while scrolling.
pub fn settle_background(page: &Page) -> FxResult {
    let Some(video) = page.query(".bg-video video") else {
        return Ok(());
    };
    set_style(&video, "transform", "none");
    clear_style(&video, "will-change");
    set_style(&video, "opacity", "1");
    clear_style(&video, "clip-path");
    Ok(())
}
