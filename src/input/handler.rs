use crate::core::geo::LatLng;
use crate::input::events::ScreenPoint;
use crate::traits::MapSurface;

/// What a tap on the map resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum TapAction {
    /// A cluster: drill in and tell the host
    ExpandCluster { coordinate: LatLng, count: u64 },
    /// A single site marker
    Select { id: String },
    /// Empty map, or a feature without an identifier
    None,
}

/// Resolves a tap against the rendered features of `layer_ids`; the topmost
/// feature wins.
pub fn resolve_tap<S: MapSurface + ?Sized>(
    surface: &S,
    point: ScreenPoint,
    layer_ids: &[&str],
) -> TapAction {
    let features = surface.query_rendered_features(point, layer_ids);
    let Some(feature) = features.first() else {
        return TapAction::None;
    };

    if feature.is_cluster() {
        return TapAction::ExpandCluster {
            coordinate: feature.coordinate(),
            count: feature.point_count().unwrap_or(0),
        };
    }

    match feature.site_id() {
        Some(id) => TapAction::Select { id: id.to_string() },
        None => {
            log::debug!("tapped feature without id at ({}, {})", point.x, point.y);
            TapAction::None
        }
    }
}
