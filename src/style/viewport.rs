//! Geometry helpers shared by the visibility-driven features.

/// Subset of `DOMRect` the features care about.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// True when the element's top sits above `vh * (1 - threshold)` and its
/// bottom below `-vh * threshold`.
pub fn is_in_viewport(rect: &Rect, viewport_height: f64, threshold: f64) -> bool {
    rect.top < viewport_height * (1.0 - threshold) && rect.bottom() > -viewport_height * threshold
}

/// Share of a section that is on screen, measured against the smaller of the
/// viewport and the section itself so tall sections still reach 1.
pub fn visible_share(rect: &Rect, viewport_height: f64) -> f64 {
    let height = rect.height.max(1.0);
    let visible = (viewport_height.min(rect.bottom()) - rect.top.max(0.0)).max(0.0);
    (visible / viewport_height.min(height)).min(1.0)
}

/// Document scroll progress in [0, 1].
pub fn scroll_fraction(scroll_top: f64, document_height: f64, viewport_height: f64) -> f64 {
    let max = (document_height - viewport_height).max(1.0);
    (scroll_top / max).clamp(0.0, 1.0)
}

/// Horizontal pointer position inside `rect` as a percentage. Not clamped.
pub fn horizontal_percent(client_x: f64, rect: &Rect) -> f64 {
    if rect.width <= 0.0 {
        return 50.0;
    }
    (client_x - rect.left) / rect.width * 100.0
}
