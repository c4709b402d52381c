pub mod clock;
pub mod markers;

// Re-export commonly used types and functions for convenience
pub use clock::{FrameClock, ScheduledFrameClock};
pub use markers::{bounce_offset, selection_scale, MarkerAnimationEngine, MarkerFrame};
