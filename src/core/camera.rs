//! Camera requests from the host and their threshold-gated application.

use crate::constants::{
    CLUSTER_ZOOM_HIGH_BAND, CLUSTER_ZOOM_LOW_BAND, CLUSTER_ZOOM_STEP_HIGH, CLUSTER_ZOOM_STEP_LOW,
    CLUSTER_ZOOM_STEP_MID, MAX_PITCH, MAX_ZOOM, MIN_ZOOM,
};
use crate::core::config::CameraConfig;
use crate::core::geo::LatLng;
use crate::traits::MapSurface;
use serde::{Deserialize, Serialize};

/// Abstract camera: what the host asks to look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
    /// Degrees from nadir
    #[serde(default)]
    pub pitch: f64,
    /// Degrees clockwise from north
    #[serde(default)]
    pub bearing: f64,
}

impl Camera {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            pitch: 0.0,
            bearing: 0.0,
        }
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    /// Finite everywhere, on the globe, and tilted no further than the
    /// surface can render. Zoom outside the surface's range is clamped, not
    /// rejected.
    pub fn is_valid(&self) -> bool {
        self.center.is_valid()
            && self.zoom.is_finite()
            && self.bearing.is_finite()
            && (0.0..=MAX_PITCH).contains(&self.pitch)
    }

    /// Zoom clamped to `[MIN_ZOOM, MAX_ZOOM]`
    pub fn clamped(self) -> Camera {
        Camera {
            zoom: self.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..self
        }
    }

    /// True when every field is within the configured epsilon of `other`.
    /// Cameras are never compared with `==` for this decision.
    pub fn is_close_to(&self, other: &Camera, config: &CameraConfig) -> bool {
        self.center.max_degree_delta(&other.center) < config.center_epsilon_deg
            && (self.zoom - other.zoom).abs() < config.zoom_epsilon
            && angle_delta(self.pitch, other.pitch) < config.angle_epsilon_deg
            && angle_delta(self.bearing, other.bearing) < config.angle_epsilon_deg
    }
}

fn angle_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// The surface's own camera representation: an eye distance instead of a
/// zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeCamera {
    pub center: LatLng,
    /// Eye-to-center distance in metres
    pub distance: f64,
    pub pitch: f64,
    pub heading: f64,
}

impl NativeCamera {
    pub fn from_camera(camera: &Camera, base_distance: f64) -> Self {
        Self {
            center: camera.center,
            distance: zoom_to_distance(camera.zoom, base_distance),
            pitch: camera.pitch,
            heading: camera.bearing.rem_euclid(360.0),
        }
    }
}

/// `distance = base / 2^zoom`
pub fn zoom_to_distance(zoom: f64, base_distance: f64) -> f64 {
    base_distance / 2_f64.powf(zoom)
}

pub fn distance_to_zoom(distance: f64, base_distance: f64) -> f64 {
    (base_distance / distance).log2()
}

/// Zoom to fly to after a cluster tap at `current_zoom`.
///
/// The step is larger at continental scale and smaller near the clustering
/// cutoff; the result never exceeds `max_cluster_zoom + 1`.
pub fn cluster_zoom_target(current_zoom: f64, max_cluster_zoom: f64) -> f64 {
    let step = if current_zoom < CLUSTER_ZOOM_LOW_BAND {
        CLUSTER_ZOOM_STEP_LOW
    } else if current_zoom <= CLUSTER_ZOOM_HIGH_BAND {
        CLUSTER_ZOOM_STEP_MID
    } else {
        CLUSTER_ZOOM_STEP_HIGH
    };
    (current_zoom + step).min(max_cluster_zoom + 1.0)
}

/// Applies host camera requests to the surface, skipping requests that are
/// within epsilon of the last applied camera. Without the gate, a host that
/// derives its camera from our own region-change events would feed back
/// into the surface forever.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    last_applied: Option<Camera>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            last_applied: None,
        }
    }

    pub fn last_applied(&self) -> Option<&Camera> {
        self.last_applied.as_ref()
    }

    /// Whether `camera` would be skipped by the threshold gate
    pub fn is_redundant(&self, camera: &Camera) -> bool {
        self.last_applied
            .as_ref()
            .map(|last| last.is_close_to(camera, &self.config))
            .unwrap_or(false)
    }

    /// Applies a host camera request. Invalid cameras are dropped; the gate
    /// compares the clamped request against the last applied camera.
    /// Returns `true` if the surface was moved.
    pub fn set_camera<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        camera: Camera,
        animated: bool,
    ) -> bool {
        if !camera.is_valid() {
            log::warn!("ignoring invalid camera {:?}", camera);
            return false;
        }
        let camera = camera.clamped();
        if self.is_redundant(&camera) {
            log::debug!("camera request within threshold, skipped");
            return false;
        }
        self.apply(surface, camera, animated);
        true
    }

    /// Moves the surface unconditionally (used for cluster drill-in)
    pub fn fly_to<S: MapSurface + ?Sized>(&mut self, surface: &mut S, center: LatLng, zoom: f64) {
        let base = self.last_applied.unwrap_or_else(|| Camera::new(center, zoom));
        let camera = Camera {
            center,
            zoom,
            ..base
        };
        self.apply(surface, camera, true);
    }

    fn apply<S: MapSurface + ?Sized>(&mut self, surface: &mut S, camera: Camera, animated: bool) {
        let camera = camera.clamped();
        let native = NativeCamera::from_camera(&camera, self.config.base_distance_m);
        let transition = animated.then(|| self.config.transition());
        log::debug!(
            "camera -> ({:.4}, {:.4}) z{:.2} animated={}",
            camera.center.lat,
            camera.center.lng,
            camera.zoom,
            animated
        );
        surface.set_camera(native, transition);
        self.last_applied = Some(camera);
    }
}
