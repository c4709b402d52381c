use crate::core::config::ViewportConfig;
use crate::core::geo::LatLngBounds;
use serde::{Deserialize, Serialize};

/// The visible region reported to the host. Produced by the core only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: LatLngBounds,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(bounds: LatLngBounds, zoom: f64) -> Self {
        Self { bounds, zoom }
    }

    pub fn min_lat(&self) -> f64 {
        self.bounds.min_lat()
    }

    pub fn max_lat(&self) -> f64 {
        self.bounds.max_lat()
    }

    pub fn min_lng(&self) -> f64 {
        self.bounds.min_lng()
    }

    pub fn max_lng(&self) -> f64 {
        self.bounds.max_lng()
    }

    /// Whether `other` differs from this viewport by less than the
    /// configured thresholds on every edge and on zoom
    pub fn is_within(&self, other: &Viewport, config: &ViewportConfig) -> bool {
        self.bounds.max_edge_delta(&other.bounds) < config.degree_threshold
            && (self.zoom - other.zoom).abs() < config.zoom_threshold
    }
}

/// Debounces region-change notifications: drag and pinch gestures raise a
/// region change per frame, the host only hears about meaningful moves.
#[derive(Debug, Clone)]
pub struct ViewportEmitter {
    config: ViewportConfig,
    last_emitted: Option<Viewport>,
}

impl ViewportEmitter {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            last_emitted: None,
        }
    }

    /// Returns the viewport to emit, or `None` when the change is under
    /// threshold.
    pub fn on_region_change(&mut self, viewport: Viewport) -> Option<Viewport> {
        if let Some(last) = &self.last_emitted {
            if last.is_within(&viewport, &self.config) {
                return None;
            }
        }
        self.last_emitted = Some(viewport);
        Some(viewport)
    }

    /// Emits regardless of threshold (after a style becomes ready)
    pub fn force(&mut self, viewport: Viewport) -> Viewport {
        self.last_emitted = Some(viewport);
        viewport
    }

    pub fn last_emitted(&self) -> Option<&Viewport> {
        self.last_emitted.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(south: f64, west: f64, zoom: f64) -> Viewport {
        Viewport::new(
            LatLngBounds::from_coords(south, west, south + 2.0, west + 3.0),
            zoom,
        )
    }

    #[test]
    fn test_first_viewport_always_emitted() {
        let mut emitter = ViewportEmitter::new(ViewportConfig::default());
        assert!(emitter.on_region_change(viewport(0.0, 0.0, 5.0)).is_some());
    }

    #[test]
    fn test_small_moves_suppressed() {
        let mut emitter = ViewportEmitter::new(ViewportConfig::default());
        emitter.on_region_change(viewport(0.0, 0.0, 5.0));

        assert!(emitter.on_region_change(viewport(0.05, 0.09, 5.04)).is_none());
        assert!(emitter.on_region_change(viewport(0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn test_large_moves_emitted() {
        let mut emitter = ViewportEmitter::new(ViewportConfig::default());
        emitter.on_region_change(viewport(0.0, 0.0, 5.0));

        assert!(emitter.on_region_change(viewport(0.15, 0.0, 5.0)).is_some());
        assert!(emitter.on_region_change(viewport(0.15, 0.0, 5.06)).is_some());
    }

    #[test]
    fn test_drift_measured_against_last_emitted() {
        let mut emitter = ViewportEmitter::new(ViewportConfig::default());
        emitter.on_region_change(viewport(0.0, 0.0, 5.0));

        // Each step is under threshold, the accumulated drift is not.
        assert!(emitter.on_region_change(viewport(0.06, 0.0, 5.0)).is_none());
        assert!(emitter.on_region_change(viewport(0.12, 0.0, 5.0)).is_some());
    }
}
