//! # reefmap
//!
//! Map rendering and interaction core for a dive-logging application.
//!
//! The crate owns everything that sits between a host application (which
//! supplies dive-site annotations, camera requests and display settings) and
//! an opaque tile-rendering engine (the [`MapSurface`](traits::MapSurface)):
//!
//! - which basemap style document is active, with offline fallback and
//!   recovery back to the online style,
//! - the ordered set of data-driven overlay layers drawn above that style,
//! - the debounced rebuild of the clustered annotation source,
//! - threshold-gated camera application and viewport notifications,
//! - procedural marker animations driven by a frame ticker.
//!
//! Everything runs on a single UI-owning context; see [`core::queue`].

pub mod animation;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod style;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    annotation::{Annotation, AnnotationKind, Difficulty, SiteStatus, SiteType},
    builder::MapCoreBuilder,
    camera::{Camera, CameraController},
    config::MapConfig,
    geo::{LatLng, LatLngBounds},
    map::MapCore,
    queue::{MapHandle, UiTask},
    settings::{HeatmapPoint, LayerSettings, StyleMode},
    viewport::{Viewport, ViewportEmitter},
};

pub use animation::markers::{MarkerAnimationEngine, MarkerFrame};
pub use data::sync::AnnotationSyncEngine;
pub use input::events::{MapEvent, ScreenPoint, SurfaceEvent};
pub use layers::composer::LayerComposer;
pub use plugins::{heatmap::HeatmapLayerManager, terrain::TerrainLayerManager};
pub use rendering::memory::MemorySurface;
pub use style::lifecycle::{StyleLifecycleController, StyleState};
pub use traits::MapSurface;

/// Installs an `env_logger` logger filtered by `RUST_LOG` (default `info`).
/// Later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("logger already installed");
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;
