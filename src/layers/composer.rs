//! Overlay layers drawn above the basemap style.
//!
//! The set is fixed and ordered bottom to top: clusters, cluster labels,
//! status glows, difficulty markers, selection ring. Every layer reads the
//! clustered sites source and is gated by a filter over feature attributes.

use crate::constants::*;
use crate::core::config::{Capabilities, MapConfig, SizingConfig, ThemePalette};
use crate::core::annotation::{Difficulty, SiteStatus};
use crate::core::geo::Color;
use crate::core::settings::LayerSettings;
use crate::layers::expression::Expression;
use crate::layers::spec::{LayerKind, LayerPosition, LayerSpec};
use crate::prelude::Arc;
use crate::traits::MapSurface;
use crate::{MapError, Result};
use serde_json::{json, Value};

/// Glow layers in stacking order, with the status each one shows.
/// `None` is the catch-all for statuses without a dedicated glow.
pub const GLOW_LAYERS: [(&str, Option<SiteStatus>); 4] = [
    (GLOW_LOGGED_LAYER_ID, Some(SiteStatus::Logged)),
    (GLOW_SAVED_LAYER_ID, Some(SiteStatus::Saved)),
    (GLOW_PLANNED_LAYER_ID, Some(SiteStatus::Planned)),
    (GLOW_DEFAULT_LAYER_ID, None),
];

/// Difficulty marker layers in stacking order
pub const DIFFICULTY_LAYERS: [(&str, Option<Difficulty>); 5] = [
    (DIFFICULTY_BEGINNER_LAYER_ID, Some(Difficulty::Beginner)),
    (DIFFICULTY_INTERMEDIATE_LAYER_ID, Some(Difficulty::Intermediate)),
    (DIFFICULTY_ADVANCED_LAYER_ID, Some(Difficulty::Advanced)),
    (DIFFICULTY_EXPERT_LAYER_ID, Some(Difficulty::Expert)),
    (DIFFICULTY_DEFAULT_LAYER_ID, None),
];

/// Every overlay layer id, bottom to top
pub const OVERLAY_LAYER_IDS: [&str; 12] = [
    CLUSTER_LAYER_ID,
    CLUSTER_COUNT_LAYER_ID,
    GLOW_LOGGED_LAYER_ID,
    GLOW_SAVED_LAYER_ID,
    GLOW_PLANNED_LAYER_ID,
    GLOW_DEFAULT_LAYER_ID,
    DIFFICULTY_BEGINNER_LAYER_ID,
    DIFFICULTY_INTERMEDIATE_LAYER_ID,
    DIFFICULTY_ADVANCED_LAYER_ID,
    DIFFICULTY_EXPERT_LAYER_ID,
    DIFFICULTY_DEFAULT_LAYER_ID,
    SELECTION_LAYER_ID,
];

/// Layers a tap is resolved against, topmost first
pub const INTERACTIVE_LAYER_IDS: [&str; 8] = [
    SELECTION_LAYER_ID,
    DIFFICULTY_DEFAULT_LAYER_ID,
    DIFFICULTY_EXPERT_LAYER_ID,
    DIFFICULTY_ADVANCED_LAYER_ID,
    DIFFICULTY_INTERMEDIATE_LAYER_ID,
    DIFFICULTY_BEGINNER_LAYER_ID,
    CLUSTER_COUNT_LAYER_ID,
    CLUSTER_LAYER_ID,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerGroup {
    Cluster,
    Glow,
    Marker,
    Selection,
}

fn group_of(id: &str) -> Option<LayerGroup> {
    if id == CLUSTER_LAYER_ID || id == CLUSTER_COUNT_LAYER_ID {
        Some(LayerGroup::Cluster)
    } else if GLOW_LAYERS.iter().any(|(glow, _)| *glow == id) {
        Some(LayerGroup::Glow)
    } else if DIFFICULTY_LAYERS.iter().any(|(marker, _)| *marker == id) {
        Some(LayerGroup::Marker)
    } else if id == SELECTION_LAYER_ID {
        Some(LayerGroup::Selection)
    } else {
        None
    }
}

fn paint_color(color: Color) -> Value {
    Value::from(color.to_hex())
}

/// Declares and repairs the overlay layers.
///
/// Whether radii interpolate over zoom and point count is decided once, from
/// the injected [`Capabilities`], when the composer is built.
#[derive(Debug, Clone)]
pub struct LayerComposer {
    config: Arc<MapConfig>,
    dynamic: bool,
}

impl LayerComposer {
    pub fn new(config: Arc<MapConfig>) -> Self {
        let Capabilities {
            dynamic_expressions,
        } = config.capabilities;
        if !dynamic_expressions {
            log::info!("dynamic expressions unavailable, using static radii");
        }
        Self {
            config,
            dynamic: dynamic_expressions,
        }
    }

    pub fn uses_dynamic_expressions(&self) -> bool {
        self.dynamic
    }

    pub fn overlay_layer_ids(&self) -> &'static [&'static str] {
        &OVERLAY_LAYER_IDS
    }

    pub fn interactive_layer_ids(&self) -> &'static [&'static str] {
        &INTERACTIVE_LAYER_IDS
    }

    /// Whether `id` is visible under `settings`. Heatmap mode hides every
    /// overlay layer.
    pub fn layer_visible(id: &str, settings: &LayerSettings, heatmap_mode: bool) -> bool {
        if heatmap_mode {
            return false;
        }
        match group_of(id) {
            Some(LayerGroup::Cluster) => settings.show_clusters,
            Some(LayerGroup::Glow) => settings.show_status_glows,
            Some(LayerGroup::Marker) | Some(LayerGroup::Selection) => true,
            None => true,
        }
    }

    /// Ensures every overlay layer exists, each directly above the previous
    /// one. The bottom layer goes below the lowest existing overlay, or on
    /// top when there is none. Layers that already exist are left
    /// untouched. Returns how many layers were added.
    pub fn compose<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        palette: &ThemePalette,
        settings: &LayerSettings,
        heatmap_mode: bool,
    ) -> Result<usize> {
        if !surface.has_source(SITES_SOURCE_ID) {
            return Err(MapError::Source(format!(
                "cannot compose overlays, source '{}' missing",
                SITES_SOURCE_ID
            )));
        }

        let mut added = 0;
        let mut previous: Option<String> = None;
        let specs = self.layer_specs(palette, settings, heatmap_mode);
        for (index, spec) in specs.into_iter().enumerate() {
            let id = spec.id.clone();
            if !surface.has_layer(&id) {
                let position = match previous.take() {
                    Some(below) => LayerPosition::Above(below),
                    None => OVERLAY_LAYER_IDS[index + 1..]
                        .iter()
                        .find(|above| surface.has_layer(above))
                        .map(|above| LayerPosition::Below(above.to_string()))
                        .unwrap_or(LayerPosition::Top),
                };
                surface.add_layer(spec, position)?;
                added += 1;
            }
            previous = Some(id);
        }

        if added > 0 {
            log::debug!("composed {} overlay layers", added);
        }
        Ok(added)
    }

    /// Removes every overlay layer that exists, top first
    pub fn remove_all<S: MapSurface + ?Sized>(&self, surface: &mut S) -> Result<usize> {
        let mut removed = 0;
        for id in OVERLAY_LAYER_IDS.iter().rev() {
            if surface.has_layer(id) {
                surface.remove_layer(id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Visibility and flat colours only; geometry and the source are left
    /// alone.
    pub fn apply_settings<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        palette: &ThemePalette,
        settings: &LayerSettings,
        heatmap_mode: bool,
    ) -> Result<()> {
        for id in OVERLAY_LAYER_IDS {
            if surface.has_layer(id) {
                surface.set_layer_visibility(id, Self::layer_visible(id, settings, heatmap_mode))?;
            }
        }

        for (id, difficulty) in DIFFICULTY_LAYERS {
            if surface.has_layer(id) {
                let color = marker_color(palette, difficulty, settings.color_by_difficulty);
                surface.set_paint_property(id, "circle-color", paint_color(color))?;
            }
        }
        Ok(())
    }

    /// The full overlay declaration, bottom to top
    pub fn layer_specs(
        &self,
        palette: &ThemePalette,
        settings: &LayerSettings,
        heatmap_mode: bool,
    ) -> Vec<LayerSpec> {
        let sizing = &self.config.sizing;
        let visible = |id: &str| Self::layer_visible(id, settings, heatmap_mode);
        let mut specs = Vec::with_capacity(OVERLAY_LAYER_IDS.len());

        specs.push(
            LayerSpec::new(CLUSTER_LAYER_ID, LayerKind::Circle, SITES_SOURCE_ID)
                .filter(Expression::is_cluster())
                .paint("circle-color", paint_color(palette.cluster_fill))
                .paint("circle-radius", self.cluster_radius(sizing))
                .paint("circle-stroke-color", paint_color(palette.cluster_stroke))
                .paint("circle-stroke-width", sizing.marker_stroke_width)
                .visible(visible(CLUSTER_LAYER_ID)),
        );

        specs.push(
            LayerSpec::new(CLUSTER_COUNT_LAYER_ID, LayerKind::Symbol, SITES_SOURCE_ID)
                .filter(Expression::is_cluster())
                .layout("text-field", Expression::get(POINT_COUNT_ABBREVIATED))
                .layout("text-size", sizing.cluster_text_size)
                .layout("text-allow-overlap", true)
                .paint("text-color", paint_color(palette.cluster_text))
                .visible(visible(CLUSTER_COUNT_LAYER_ID)),
        );

        for (id, status) in GLOW_LAYERS {
            specs.push(
                LayerSpec::new(id, LayerKind::Circle, SITES_SOURCE_ID)
                    .filter(Expression::all([Expression::not_cluster(), status_filter(status)]))
                    .paint("circle-color", paint_color(glow_color(palette, status)))
                    .paint("circle-radius", self.glow_radius(sizing))
                    .paint("circle-blur", sizing.glow_blur)
                    .paint("circle-opacity", sizing.glow_opacity)
                    .visible(visible(id)),
            );
        }

        for (id, difficulty) in DIFFICULTY_LAYERS {
            let color = marker_color(palette, difficulty, settings.color_by_difficulty);
            specs.push(
                LayerSpec::new(id, LayerKind::Circle, SITES_SOURCE_ID)
                    .filter(Expression::all([
                        Expression::not_cluster(),
                        difficulty_filter(difficulty),
                    ]))
                    .paint("circle-color", paint_color(color))
                    .paint("circle-radius", self.marker_radius(sizing, 0.0))
                    .paint("circle-stroke-color", paint_color(palette.marker_stroke))
                    .paint("circle-stroke-width", sizing.marker_stroke_width)
                    .visible(visible(id)),
            );
        }

        specs.push(
            LayerSpec::new(SELECTION_LAYER_ID, LayerKind::Circle, SITES_SOURCE_ID)
                .filter(Expression::all([
                    Expression::equals(Expression::get("selected"), true),
                    Expression::not_cluster(),
                ]))
                .paint("circle-color", "rgba(0,0,0,0)")
                .paint(
                    "circle-radius",
                    self.marker_radius(sizing, sizing.selection_ring_padding),
                )
                .paint("circle-stroke-color", paint_color(palette.selection_ring))
                .paint("circle-stroke-width", sizing.selection_ring_width)
                .visible(visible(SELECTION_LAYER_ID)),
        );

        specs
    }

    fn marker_radius(&self, sizing: &SizingConfig, padding: f64) -> Value {
        if !self.dynamic {
            return json!(sizing.static_marker_radius + padding);
        }
        let stops: Vec<(f64, f64)> = sizing
            .marker_radius_stops
            .iter()
            .map(|(zoom, radius)| (*zoom, radius + padding))
            .collect();
        Expression::interpolate_linear(Expression::zoom(), &stops).into_value()
    }

    fn glow_radius(&self, sizing: &SizingConfig) -> Value {
        if !self.dynamic {
            return json!(sizing.static_glow_radius);
        }
        let stops: Vec<(f64, f64)> = sizing
            .marker_radius_stops
            .iter()
            .map(|(zoom, radius)| (*zoom, radius * sizing.glow_multiplier))
            .collect();
        Expression::interpolate_linear(Expression::zoom(), &stops).into_value()
    }

    fn cluster_radius(&self, sizing: &SizingConfig) -> Value {
        if !self.dynamic {
            return json!(sizing.static_cluster_radius);
        }
        Expression::step(
            Expression::get(POINT_COUNT),
            sizing.cluster_base_radius,
            &sizing.cluster_radius_steps,
        )
        .into_value()
    }
}

fn status_filter(status: Option<SiteStatus>) -> Expression {
    match status {
        Some(status) => Expression::equals(Expression::get("status"), status.as_str()),
        None => Expression::matches_any(
            Expression::get("status"),
            &[
                SiteStatus::Logged.as_str(),
                SiteStatus::Saved.as_str(),
                SiteStatus::Planned.as_str(),
            ],
            json!(false),
            json!(true),
        ),
    }
}

fn difficulty_filter(difficulty: Option<Difficulty>) -> Expression {
    match difficulty {
        Some(difficulty) => Expression::equals(Expression::get("difficulty"), difficulty.as_str()),
        None => Expression::matches_any(
            Expression::get("difficulty"),
            &[
                Difficulty::Beginner.as_str(),
                Difficulty::Intermediate.as_str(),
                Difficulty::Advanced.as_str(),
                Difficulty::Expert.as_str(),
            ],
            json!(false),
            json!(true),
        ),
    }
}

fn glow_color(palette: &ThemePalette, status: Option<SiteStatus>) -> Color {
    match status {
        Some(SiteStatus::Logged) => palette.glow_logged,
        Some(SiteStatus::Saved) => palette.glow_saved,
        Some(SiteStatus::Planned) => palette.glow_planned,
        Some(SiteStatus::Baseline) | None => palette.glow_default,
    }
}

fn marker_color(palette: &ThemePalette, difficulty: Option<Difficulty>, by_difficulty: bool) -> Color {
    if !by_difficulty {
        return palette.marker_default;
    }
    match difficulty {
        Some(Difficulty::Beginner) => palette.difficulty_beginner,
        Some(Difficulty::Intermediate) => palette.difficulty_intermediate,
        Some(Difficulty::Advanced) => palette.difficulty_advanced,
        Some(Difficulty::Expert) => palette.difficulty_expert,
        Some(Difficulty::Other) | None => palette.difficulty_other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::Annotation;
    use crate::core::geo::LatLng;
    use crate::data::geojson::{Feature, FeatureCollection};
    use crate::layers::spec::SourceSpec;
    use crate::rendering::memory::MemorySurface;

    fn surface_with_source() -> MemorySurface {
        let mut surface = MemorySurface::new();
        surface
            .add_source(SourceSpec::clustered(
                SITES_SOURCE_ID,
                FeatureCollection::default(),
                Default::default(),
            ))
            .unwrap();
        surface
    }

    #[test]
    fn test_compose_order_and_idempotence() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = surface_with_source();
        let palette = ThemePalette::underwater();
        let settings = LayerSettings::default();

        assert_eq!(composer.compose(&mut surface, &palette, &settings, false).unwrap(), 12);
        assert_eq!(surface.layer_ids(), OVERLAY_LAYER_IDS.to_vec());

        assert_eq!(composer.compose(&mut surface, &palette, &settings, false).unwrap(), 0);
        assert_eq!(surface.layer_ids().len(), 12);
    }

    #[test]
    fn test_compose_repairs_missing_layer_in_place() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = surface_with_source();
        let palette = ThemePalette::underwater();
        let settings = LayerSettings::default();
        composer.compose(&mut surface, &palette, &settings, false).unwrap();

        surface.remove_layer(GLOW_SAVED_LAYER_ID).unwrap();
        assert_eq!(composer.compose(&mut surface, &palette, &settings, false).unwrap(), 1);
        assert_eq!(surface.layer_ids(), OVERLAY_LAYER_IDS.to_vec());
    }

    #[test]
    fn test_compose_repairs_bottom_layer_below_the_rest() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = surface_with_source();
        let palette = ThemePalette::underwater();
        let settings = LayerSettings::default();
        composer.compose(&mut surface, &palette, &settings, false).unwrap();

        surface.remove_layer(CLUSTER_LAYER_ID).unwrap();
        assert_eq!(composer.compose(&mut surface, &palette, &settings, false).unwrap(), 1);
        assert_eq!(surface.layer_ids(), OVERLAY_LAYER_IDS.to_vec());

        surface.remove_layer(CLUSTER_LAYER_ID).unwrap();
        surface.remove_layer(CLUSTER_COUNT_LAYER_ID).unwrap();
        surface.remove_layer(GLOW_LOGGED_LAYER_ID).unwrap();
        assert_eq!(composer.compose(&mut surface, &palette, &settings, false).unwrap(), 3);
        assert_eq!(surface.layer_ids(), OVERLAY_LAYER_IDS.to_vec());
    }

    #[test]
    fn test_compose_requires_source() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = MemorySurface::new();
        let result = composer.compose(
            &mut surface,
            &ThemePalette::underwater(),
            &LayerSettings::default(),
            false,
        );
        assert!(matches!(result, Err(MapError::Source(_))));
    }

    #[test]
    fn test_static_styling_has_no_interpolation() {
        let composer = LayerComposer::new(Arc::new(MapConfig::static_styling()));
        assert!(!composer.uses_dynamic_expressions());
        let specs = composer.layer_specs(&ThemePalette::underwater(), &LayerSettings::default(), false);
        for spec in specs {
            if let Some(radius) = spec.paint.get("circle-radius") {
                assert!(radius.is_number(), "{} radius {}", spec.id, radius);
            }
        }
    }

    #[test]
    fn test_dynamic_glow_radius_scales_marker_stops() {
        let config = MapConfig::default();
        let composer = LayerComposer::new(Arc::new(config.clone()));
        let specs = composer.layer_specs(&ThemePalette::underwater(), &LayerSettings::default(), false);
        let glow = specs.iter().find(|s| s.id == GLOW_LOGGED_LAYER_ID).unwrap();
        let radius = glow.paint.get("circle-radius").unwrap();
        assert_eq!(radius[0], "interpolate");
        let (zoom, marker) = config.sizing.marker_radius_stops[0];
        assert_eq!(radius[3], json!(zoom));
        assert_eq!(radius[4], json!(marker * config.sizing.glow_multiplier));
    }

    #[test]
    fn test_filters_partition_sites() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let specs = composer.layer_specs(&ThemePalette::underwater(), &LayerSettings::default(), false);
        let site = Feature::from_annotation(
            &Annotation::site("a", LatLng::new(0.0, 0.0))
                .with_status(SiteStatus::Saved)
                .with_difficulty(Difficulty::Expert)
                .selected(true),
            0,
        );

        let matching: Vec<&str> = specs
            .iter()
            .filter(|s| s.filter.as_ref().map(|f| f.matches(&site.properties)).unwrap_or(true))
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            matching,
            vec![GLOW_SAVED_LAYER_ID, DIFFICULTY_EXPERT_LAYER_ID, SELECTION_LAYER_ID]
        );
    }

    #[test]
    fn test_settings_toggle_glows_only() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = surface_with_source();
        let palette = ThemePalette::underwater();
        composer
            .compose(&mut surface, &palette, &LayerSettings::default(), false)
            .unwrap();

        let settings = LayerSettings {
            show_status_glows: false,
            ..LayerSettings::default()
        };
        composer.apply_settings(&mut surface, &palette, &settings, false).unwrap();

        for id in OVERLAY_LAYER_IDS {
            let is_glow = GLOW_LAYERS.iter().any(|(glow, _)| *glow == id);
            assert_eq!(surface.is_layer_visible(id), Some(!is_glow), "{}", id);
        }
    }

    #[test]
    fn test_flat_colour_when_not_by_difficulty() {
        let composer = LayerComposer::new(Arc::new(MapConfig::default()));
        let mut surface = surface_with_source();
        let palette = ThemePalette::underwater();
        composer
            .compose(&mut surface, &palette, &LayerSettings::default(), false)
            .unwrap();

        let settings = LayerSettings {
            color_by_difficulty: false,
            ..LayerSettings::default()
        };
        composer.apply_settings(&mut surface, &palette, &settings, false).unwrap();
        for (id, _) in DIFFICULTY_LAYERS {
            assert_eq!(
                surface.paint_property(id, "circle-color"),
                Some(&json!(palette.marker_default.to_hex()))
            );
        }
    }

    #[test]
    fn test_heatmap_mode_hides_overlays() {
        for id in OVERLAY_LAYER_IDS {
            assert!(!LayerComposer::layer_visible(id, &LayerSettings::default(), true));
        }
    }
}
