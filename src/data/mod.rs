pub mod geojson;
pub mod sync;

pub use geojson::{Feature, FeatureCollection, Geometry};
pub use sync::{AnnotationSyncEngine, RebuildContext, RebuildOutcome, RebuildStats};
