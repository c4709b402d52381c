pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{MapEvent, ScreenPoint, SurfaceEvent};
pub use handler::{resolve_tap, TapAction};
