pub mod annotation;
pub mod builder;
pub mod camera;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod queue;
pub mod settings;
pub mod viewport;

pub use annotation::{Annotation, AnnotationKind, Difficulty, SiteStatus, SiteType};
pub use builder::MapCoreBuilder;
pub use camera::{Camera, CameraController, NativeCamera};
pub use config::MapConfig;
pub use geo::{Color, LatLng, LatLngBounds, TileCoord};
pub use map::MapCore;
pub use queue::{MapHandle, UiQueue, UiSender, UiTask};
pub use settings::{HeatmapPoint, LayerSettings, StyleMode};
pub use viewport::{Viewport, ViewportEmitter};
