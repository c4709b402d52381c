//! Prelude module for common reefmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use reefmap::prelude::*;`

pub use crate::core::{
    annotation::{Annotation, AnnotationKind, Difficulty, SiteStatus, SiteType},
    builder::MapCoreBuilder,
    camera::{Camera, CameraController, NativeCamera},
    config::{
        AnimationConfig, CameraConfig, Capabilities, ClusterOptions, HeatmapConfig, MapConfig,
        SizingConfig, StyleConfig, TerrainConfig, ThemePalette, ViewportConfig,
    },
    geo::{Color, LatLng, LatLngBounds},
    map::MapCore,
    queue::{MapHandle, UiQueue, UiSender, UiTask},
    settings::{HeatmapPoint, LayerSettings, StyleMode},
    viewport::{Viewport, ViewportEmitter},
};

pub use crate::data::{
    geojson::{Feature, FeatureCollection},
    sync::{AnnotationSyncEngine, RebuildContext, RebuildOutcome, RebuildStats},
};

pub use crate::layers::{
    composer::LayerComposer,
    expression::Expression,
    spec::{LayerKind, LayerPosition, LayerSpec, SourceSpec},
};

pub use crate::input::events::{MapEvent, ScreenPoint, SurfaceEvent};

pub use crate::animation::{
    clock::{FrameClock, ScheduledFrameClock},
    markers::{MarkerAnimationEngine, MarkerFrame},
};

pub use crate::plugins::{
    base::AuxiliaryLayer, heatmap::HeatmapLayerManager, terrain::TerrainLayerManager,
};

pub use crate::style::{
    lifecycle::{StyleLifecycleController, StyleState},
    probe::{ConnectivityProbe, HttpProbe, ProbeOutcome},
    resources::{BundleResolver, ResourceResolver, StaticResolver, StyleResources},
};

pub use crate::runtime::{AsyncHandle, AsyncSpawner, ManualScheduler, Scheduler};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TokioScheduler;

pub use crate::rendering::memory::{MemorySurface, SurfaceCall};

pub use crate::traits::MapSurface;

pub use crate::{Error as MapError, Result};

pub use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
