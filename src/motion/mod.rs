//! Host-independent animation plumbing: easing curves, cancellable frame
//! tasks and the per-element side-table.

pub mod easing;
pub mod registry;
pub mod task;

pub use easing::{ease_in_out_cubic, ease_out_cubic};
pub use registry::{unique, Registry};
pub use task::{CancelToken, FrameTask, Scheduler, TaskState, VirtualClock};
