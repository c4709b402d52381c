//! Basemap style documents: resolution, loading and offline recovery

pub mod lifecycle;
pub mod probe;
pub mod resources;

pub use lifecycle::{StyleLifecycleController, StyleState, StyleTransition};
pub use probe::{ConnectivityProbe, HttpProbe, ProbeOutcome};
pub use resources::{BundleResolver, ResourceResolver, StaticResolver, StyleResources};
