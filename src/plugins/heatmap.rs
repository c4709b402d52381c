use crate::constants::{HEATMAP_LAYER_ID, HEATMAP_SOURCE_ID};
use crate::core::config::HeatmapConfig;
use crate::core::settings::HeatmapPoint;
use crate::data::geojson::FeatureCollection;
use crate::layers::expression::Expression;
use crate::layers::spec::{LayerKind, LayerPosition, LayerSpec, SourceSpec};
use crate::plugins::base::AuxiliaryLayer;
use crate::traits::MapSurface;
use crate::Result;

/// Dive-density heatmap over the logged sites
#[derive(Debug, Clone)]
pub struct HeatmapLayerManager {
    config: HeatmapConfig,
    points: Vec<HeatmapPoint>,
    show: bool,
}

impl HeatmapLayerManager {
    pub fn new(config: HeatmapConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
            show: false,
        }
    }

    pub fn points(&self) -> &[HeatmapPoint] {
        &self.points
    }

    /// Stores the host's values and applies them
    pub fn update(
        &mut self,
        surface: &mut dyn MapSurface,
        points: Vec<HeatmapPoint>,
        show: bool,
        style_ready: bool,
    ) -> Result<()> {
        self.points = points;
        self.show = show;
        self.apply(surface, style_ready)
    }

    pub fn layer_spec(&self) -> LayerSpec {
        let config = &self.config;
        LayerSpec::new(HEATMAP_LAYER_ID, LayerKind::Heatmap, HEATMAP_SOURCE_ID)
            .paint(
                "heatmap-weight",
                Expression::interpolate_linear(
                    Expression::get("dive_count"),
                    &[(0.0, 0.0), (config.max_dive_count, 1.0)],
                ),
            )
            .paint(
                "heatmap-intensity",
                Expression::interpolate_linear(Expression::zoom(), &config.intensity_stops),
            )
            .paint(
                "heatmap-color",
                Expression::interpolate_colors(Expression::heatmap_density(), &config.color_ramp),
            )
            .paint(
                "heatmap-radius",
                Expression::interpolate_linear(Expression::zoom(), &config.radius_stops),
            )
            .paint("heatmap-opacity", config.opacity)
    }
}

impl AuxiliaryLayer for HeatmapLayerManager {
    fn name(&self) -> &str {
        "heatmap"
    }

    fn source_id(&self) -> &str {
        HEATMAP_SOURCE_ID
    }

    fn layer_id(&self) -> &str {
        HEATMAP_LAYER_ID
    }

    fn is_enabled(&self) -> bool {
        self.show
    }

    fn apply(&mut self, surface: &mut dyn MapSurface, style_ready: bool) -> Result<()> {
        if !style_ready {
            return Ok(());
        }
        if !self.show {
            return self.remove(surface);
        }

        let data = FeatureCollection::from_heatmap_points(&self.points);
        if surface.has_source(HEATMAP_SOURCE_ID) {
            surface.set_source_data(HEATMAP_SOURCE_ID, data)?;
        } else {
            surface.add_source(SourceSpec::geojson(HEATMAP_SOURCE_ID, data))?;
        }
        if !surface.has_layer(HEATMAP_LAYER_ID) {
            surface.add_layer(self.layer_spec(), LayerPosition::Top)?;
        }
        log::debug!("heatmap showing {} points", self.points.len());
        Ok(())
    }
}
