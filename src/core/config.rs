//! Configuration for the map core
//!
//! All tuning lives in one immutable [`MapConfig`] value injected at
//! construction (shared as `Arc<MapConfig>`). Every struct can be
//! deserialised from JSON with missing fields taking their defaults, so a host
//! only has to spell out what it overrides.

use crate::core::geo::{Color, TileCoord};
use crate::core::settings::StyleMode;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub style: StyleConfig,
    pub underwater: ThemePalette,
    pub daylight: ThemePalette,
    pub sizing: SizingConfig,
    pub clustering: ClusterOptions,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
    pub animation: AnimationConfig,
    pub heatmap: HeatmapConfig,
    pub terrain: TerrainConfig,
    pub capabilities: Capabilities,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            underwater: ThemePalette::underwater(),
            daylight: ThemePalette::daylight(),
            sizing: SizingConfig::default(),
            clustering: ClusterOptions::default(),
            camera: CameraConfig::default(),
            viewport: ViewportConfig::default(),
            animation: AnimationConfig::default(),
            heatmap: HeatmapConfig::default(),
            terrain: TerrainConfig::default(),
            capabilities: Capabilities::default(),
        }
    }
}

impl MapConfig {
    /// Profile for host runtimes that disable the dynamic-expression
    /// evaluator: every interpolated radius falls back to a constant.
    pub fn static_styling() -> Self {
        Self {
            capabilities: Capabilities {
                dynamic_expressions: false,
            },
            ..Self::default()
        }
    }

    /// Parses a (possibly partial) JSON override document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn palette(&self, mode: StyleMode) -> &ThemePalette {
        match mode {
            StyleMode::Underwater => &self.underwater,
            StyleMode::Daylight => &self.daylight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizing.marker_radius_stops.is_empty() {
            return Err(MapError::Config(
                "sizing.marker_radius_stops must not be empty".to_string(),
            ));
        }
        if !is_ascending(&self.sizing.marker_radius_stops) {
            return Err(MapError::Config(
                "sizing.marker_radius_stops must be sorted by zoom".to_string(),
            ));
        }
        if !is_ascending(&self.sizing.cluster_radius_steps) {
            return Err(MapError::Config(
                "sizing.cluster_radius_steps must be sorted by point count".to_string(),
            ));
        }
        if self.animation.selection_duration_ms == 0 || self.animation.bounce_duration_ms == 0 {
            return Err(MapError::Config(
                "animation durations must be non-zero".to_string(),
            ));
        }
        if self.animation.frame_rate == 0 {
            return Err(MapError::Config("animation.frame_rate must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn is_ascending(stops: &[(f64, f64)]) -> bool {
    stops.windows(2).all(|pair| pair[0].0 < pair[1].0)
}

/// Logical names of bundled style documents, and connectivity-probe tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Online vector style (preferred primary)
    pub vector_style: String,
    /// Legacy raster style (primary when no vector style is bundled)
    pub raster_style: String,
    /// Packaged offline style backed by a local pmtiles archive
    pub offline_style: String,
    /// Daylight theme variant of the primary style
    pub daylight_style: String,
    /// Tile template probed to decide whether the primary style is reachable
    pub primary_tile_template: Option<String>,
    pub probe_tile: TileCoord,
    pub probe_timeout_ms: u64,
    pub probe_retry_ms: u64,
}

impl StyleConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_retry(&self) -> Duration {
        Duration::from_millis(self.probe_retry_ms)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            vector_style: "underwater-vector".to_string(),
            raster_style: "underwater-raster".to_string(),
            offline_style: "underwater-offline".to_string(),
            daylight_style: "daylight-vector".to_string(),
            primary_tile_template: None,
            probe_tile: TileCoord::new(0, 0, 0),
            probe_timeout_ms: 4_000,
            probe_retry_ms: 12_000,
        }
    }
}

/// Colours for one basemap theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePalette {
    /// Placeholder shown until the style paints
    pub background: Color,
    pub cluster_fill: Color,
    pub cluster_stroke: Color,
    pub cluster_text: Color,
    pub glow_logged: Color,
    pub glow_saved: Color,
    pub glow_planned: Color,
    pub glow_default: Color,
    pub difficulty_beginner: Color,
    pub difficulty_intermediate: Color,
    pub difficulty_advanced: Color,
    pub difficulty_expert: Color,
    pub difficulty_other: Color,
    /// Flat marker colour used when colour-by-difficulty is off
    pub marker_default: Color,
    pub marker_stroke: Color,
    pub selection_ring: Color,
}

impl ThemePalette {
    pub fn underwater() -> Self {
        Self {
            background: Color::rgb(0x0a, 0x2a, 0x43),
            cluster_fill: Color::rgb(0x1b, 0x6c, 0xa8),
            cluster_stroke: Color::rgb(0xe6, 0xf4, 0xff),
            cluster_text: Color::rgb(0xff, 0xff, 0xff),
            glow_logged: Color::rgb(0x2e, 0xe5, 0x9d),
            glow_saved: Color::rgb(0xff, 0xc8, 0x3d),
            glow_planned: Color::rgb(0x5a, 0xc8, 0xfa),
            glow_default: Color::rgb(0x8e, 0xa4, 0xb8),
            difficulty_beginner: Color::rgb(0x34, 0xc7, 0x59),
            difficulty_intermediate: Color::rgb(0x00, 0x7a, 0xff),
            difficulty_advanced: Color::rgb(0xff, 0x95, 0x00),
            difficulty_expert: Color::rgb(0xff, 0x3b, 0x30),
            difficulty_other: Color::rgb(0x8e, 0x8e, 0x93),
            marker_default: Color::rgb(0x00, 0xb4, 0xd8),
            marker_stroke: Color::rgb(0xff, 0xff, 0xff),
            selection_ring: Color::rgb(0xff, 0xff, 0xff),
        }
    }

    pub fn daylight() -> Self {
        Self {
            background: Color::rgb(0xe8, 0xf1, 0xf5),
            cluster_fill: Color::rgb(0x00, 0x5f, 0x99),
            cluster_stroke: Color::rgb(0xff, 0xff, 0xff),
            cluster_text: Color::rgb(0xff, 0xff, 0xff),
            selection_ring: Color::rgb(0x0a, 0x2a, 0x43),
            ..Self::underwater()
        }
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::underwater()
    }
}

/// Radius tables for overlay layers, in screen points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// `(zoom, radius)` stops for the marker circles
    pub marker_radius_stops: Vec<(f64, f64)>,
    pub static_marker_radius: f64,
    /// Glow radius = marker radius x multiplier
    pub glow_multiplier: f64,
    pub static_glow_radius: f64,
    pub glow_blur: f64,
    pub glow_opacity: f64,
    /// Cluster radius below the first step
    pub cluster_base_radius: f64,
    /// `(point_count, radius)` steps for cluster circles
    pub cluster_radius_steps: Vec<(f64, f64)>,
    pub static_cluster_radius: f64,
    pub cluster_text_size: f64,
    /// Added to the marker radius for the selection ring
    pub selection_ring_padding: f64,
    pub selection_ring_width: f64,
    pub marker_stroke_width: f64,
}

impl SizingConfig {
    /// Marker radius at the top of the zoom table
    pub fn max_marker_radius(&self) -> f64 {
        self.marker_radius_stops
            .last()
            .map(|(_, radius)| *radius)
            .unwrap_or(self.static_marker_radius)
    }
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            marker_radius_stops: vec![(2.0, 3.0), (6.0, 5.0), (10.0, 7.0), (14.0, 9.0)],
            static_marker_radius: 6.0,
            glow_multiplier: 2.2,
            static_glow_radius: 14.0,
            glow_blur: 0.8,
            glow_opacity: 0.55,
            cluster_base_radius: 16.0,
            cluster_radius_steps: vec![(10.0, 20.0), (50.0, 26.0), (200.0, 32.0)],
            static_cluster_radius: 20.0,
            cluster_text_size: 12.0,
            selection_ring_padding: 4.0,
            selection_ring_width: 2.5,
            marker_stroke_width: 1.5,
        }
    }
}

/// Options handed to the surface's built-in clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Cluster radius in screen points
    pub radius: f64,
    /// Highest zoom at which points are still clustered
    pub max_zoom: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 50.0,
            max_zoom: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub center_epsilon_deg: f64,
    pub zoom_epsilon: f64,
    pub angle_epsilon_deg: f64,
    /// Eye distance in metres at zoom 0
    pub base_distance_m: f64,
    pub transition_ms: u64,
}

impl CameraConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            center_epsilon_deg: 0.001,
            zoom_epsilon: 0.1,
            angle_epsilon_deg: 0.5,
            base_distance_m: 40_000_000.0,
            transition_ms: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub degree_threshold: f64,
    pub zoom_threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            degree_threshold: 0.1,
            zoom_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub selection_duration_ms: u64,
    /// Peak scale of the selection oscillation
    pub pulse_scale: f64,
    /// Scale the selected marker settles on
    pub final_scale: f64,
    pub bounce_duration_ms: u64,
    pub stagger_delay_ms: u64,
    /// Vertical offset at the top of the bounce, in screen points
    pub peak_offset: f64,
    pub decay: f64,
    /// Oscillations per bounce
    pub frequency: f64,
    pub frame_rate: u32,
    pub haptics: bool,
}

impl AnimationConfig {
    pub fn selection_duration(&self) -> Duration {
        Duration::from_millis(self.selection_duration_ms)
    }

    pub fn bounce_duration(&self) -> Duration {
        Duration::from_millis(self.bounce_duration_ms)
    }

    pub fn stagger_delay(&self) -> Duration {
        Duration::from_millis(self.stagger_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            selection_duration_ms: 600,
            pulse_scale: 1.45,
            final_scale: 1.2,
            bounce_duration_ms: 700,
            stagger_delay_ms: 60,
            peak_offset: 18.0,
            decay: 0.85,
            frequency: 2.0,
            frame_rate: 60,
            haptics: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Dive count that maps to full weight
    pub max_dive_count: f64,
    /// `(zoom, intensity)` stops
    pub intensity_stops: Vec<(f64, f64)>,
    /// `(zoom, radius)` stops
    pub radius_stops: Vec<(f64, f64)>,
    /// `(density, colour)` ramp; the first entry should be transparent-ish
    pub color_ramp: Vec<(f64, String)>,
    pub opacity: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            max_dive_count: 50.0,
            intensity_stops: vec![(0.0, 0.6), (9.0, 2.0)],
            radius_stops: vec![(0.0, 4.0), (9.0, 24.0)],
            color_ramp: vec![
                (0.0, "rgba(0,0,255,0)".to_string()),
                (0.2, "rgb(0,90,170)".to_string()),
                (0.4, "rgb(0,170,200)".to_string()),
                (0.6, "rgb(60,220,170)".to_string()),
                (0.8, "rgb(250,220,70)".to_string()),
                (1.0, "rgb(255,90,60)".to_string()),
            ],
            opacity: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Elevation tile template
    pub dem_tiles: String,
    /// `terrarium` or `mapbox`
    pub encoding: String,
    pub tile_size: u32,
    pub max_zoom: u8,
    pub default_exaggeration: f64,
    pub shadow_color: Color,
    pub highlight_color: Color,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            dem_tiles: "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png"
                .to_string(),
            encoding: "terrarium".to_string(),
            tile_size: 256,
            max_zoom: 15,
            default_exaggeration: 0.5,
            shadow_color: Color::rgb(0x04, 0x1a, 0x2b),
            highlight_color: Color::rgb(0xd8, 0xf0, 0xff),
        }
    }
}

/// What the host runtime's styling engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Whether zoom/count interpolation expressions may be used
    pub dynamic_expressions: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            dynamic_expressions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.style.probe_timeout(), Duration::from_secs(4));
        assert_eq!(config.style.probe_retry(), Duration::from_secs(12));
        assert!(config.capabilities.dynamic_expressions);
    }

    #[test]
    fn test_static_styling_profile() {
        let config = MapConfig::static_styling();
        assert!(!config.capabilities.dynamic_expressions);
        assert_eq!(config.sizing, SizingConfig::default());
    }

    #[test]
    fn test_partial_json_override() {
        let config = MapConfig::from_json(
            r##"{
                "clustering": { "max_zoom": 12 },
                "underwater": { "background": "#001122" },
                "capabilities": { "dynamic_expressions": false }
            }"##,
        )
        .unwrap();
        assert_eq!(config.clustering.max_zoom, 12.0);
        assert_eq!(config.clustering.radius, 50.0);
        assert_eq!(config.underwater.background, Color::rgb(0x00, 0x11, 0x22));
        assert!(!config.capabilities.dynamic_expressions);
    }

    #[test]
    fn test_unsorted_stops_rejected() {
        let result = MapConfig::from_json(
            r#"{ "sizing": { "marker_radius_stops": [[10, 7], [2, 3]] } }"#,
        );
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[test]
    fn test_palette_per_mode() {
        let config = MapConfig::default();
        assert_ne!(
            config.palette(StyleMode::Underwater).background,
            config.palette(StyleMode::Daylight).background
        );
    }
}
