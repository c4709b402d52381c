//! Identifiers and engine-wide magic numbers.
//! Keeping them in a single place makes it easier to keep the composer, the
//! sync engine and tap resolution agreeing on names.

/// Clustered GeoJSON source holding one point per annotation.
pub const SITES_SOURCE_ID: &str = "dive-sites";

pub const CLUSTER_LAYER_ID: &str = "dive-sites-clusters";
pub const CLUSTER_COUNT_LAYER_ID: &str = "dive-sites-cluster-count";

pub const GLOW_LOGGED_LAYER_ID: &str = "dive-sites-glow-logged";
pub const GLOW_SAVED_LAYER_ID: &str = "dive-sites-glow-saved";
pub const GLOW_PLANNED_LAYER_ID: &str = "dive-sites-glow-planned";
pub const GLOW_DEFAULT_LAYER_ID: &str = "dive-sites-glow-default";

pub const DIFFICULTY_BEGINNER_LAYER_ID: &str = "dive-sites-beginner";
pub const DIFFICULTY_INTERMEDIATE_LAYER_ID: &str = "dive-sites-intermediate";
pub const DIFFICULTY_ADVANCED_LAYER_ID: &str = "dive-sites-advanced";
pub const DIFFICULTY_EXPERT_LAYER_ID: &str = "dive-sites-expert";
pub const DIFFICULTY_DEFAULT_LAYER_ID: &str = "dive-sites-default";

pub const SELECTION_LAYER_ID: &str = "dive-sites-selection";

pub const HEATMAP_SOURCE_ID: &str = "dive-heatmap";
pub const HEATMAP_LAYER_ID: &str = "dive-heatmap-layer";

pub const TERRAIN_SOURCE_ID: &str = "terrain-dem";
pub const TERRAIN_LAYER_ID: &str = "terrain-hillshade";

/// Attribute set by the clustering engine on synthetic cluster features.
pub const CLUSTER_FLAG: &str = "cluster";
/// Attribute carrying the number of points a cluster stands for.
pub const POINT_COUNT: &str = "point_count";
pub const POINT_COUNT_ABBREVIATED: &str = "point_count_abbreviated";

/// Cluster taps drill in faster at continental scale.
pub const CLUSTER_ZOOM_LOW_BAND: f64 = 5.0;
pub const CLUSTER_ZOOM_HIGH_BAND: f64 = 8.0;
pub const CLUSTER_ZOOM_STEP_LOW: f64 = 3.0;
pub const CLUSTER_ZOOM_STEP_MID: f64 = 2.5;
pub const CLUSTER_ZOOM_STEP_HIGH: f64 = 2.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
/// Steepest tilt the surface renders, in degrees from nadir
pub const MAX_PITCH: f64 = 85.0;
