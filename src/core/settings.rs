use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Display toggles for the overlay layers.
///
/// Turning a toggle off only hides layers or flattens their colour; the
/// underlying features are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub show_clusters: bool,
    pub show_status_glows: bool,
    pub color_by_difficulty: bool,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            show_clusters: true,
            show_status_glows: true,
            color_by_difficulty: true,
        }
    }
}

/// Basemap theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    #[default]
    Underwater,
    Daylight,
}

/// One weighted point of the dive-density heatmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub position: LatLng,
    /// Number of dives logged at this position
    pub dive_count: u32,
}

impl HeatmapPoint {
    pub fn new(position: LatLng, dive_count: u32) -> Self {
        Self {
            position,
            dive_count,
        }
    }
}
