use crate::animation::markers::MarkerFrame;
use crate::core::geo::LatLng;
use crate::core::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// A point in surface coordinates (screen points, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Events raised by the map surface, fed to `MapCore::dispatch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The requested style document finished loading
    StyleLoaded,
    /// The style document could not be loaded or parsed
    StyleLoadFailed { reason: String },
    /// The visible region changed (pan, pinch, camera transition)
    RegionChanged,
    /// Single tap on the map
    Tapped { point: ScreenPoint },
}

/// Notifications delivered to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A site marker was tapped
    Select { id: String },
    /// The visible region moved past the emission threshold
    RegionChange(Viewport),
    /// A cluster was tapped
    ClusterTap { coordinate: LatLng, count: u64 },
    /// Every style fallback failed; the host should swap in another map
    /// provider
    LoadFailure,
    /// Per-frame marker transform from the animation engine
    MarkerFrame(MarkerFrame),
    /// Fired once when a marker animation starts
    Haptic,
}

impl MapEvent {
    /// Whether this is a per-frame animation event
    pub fn is_frame(&self) -> bool {
        matches!(self, MapEvent::MarkerFrame(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_event_serde() {
        let event = SurfaceEvent::Tapped {
            point: ScreenPoint::new(10.0, 20.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SurfaceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_frame_classification() {
        let frame = MapEvent::MarkerFrame(MarkerFrame {
            site_id: "a".to_string(),
            scale: 1.0,
            offset: 0.0,
        });
        assert!(frame.is_frame());
        assert!(!MapEvent::LoadFailure.is_frame());
    }
}
