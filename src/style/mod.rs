pub mod color;
pub mod transition;
pub mod viewport;

pub use color::Rgb;
pub use transition::{append_transform, merge_transitions, strip_transform};
pub use viewport::Rect;
