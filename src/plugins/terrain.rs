use crate::constants::{CLUSTER_LAYER_ID, TERRAIN_LAYER_ID, TERRAIN_SOURCE_ID};
use crate::core::config::TerrainConfig;
use crate::layers::spec::{LayerKind, LayerPosition, LayerSpec, SourceSpec};
use crate::plugins::base::AuxiliaryLayer;
use crate::traits::MapSurface;
use crate::Result;
use serde_json::Value;

/// Shaded relief from remote elevation tiles
#[derive(Debug, Clone)]
pub struct TerrainLayerManager {
    config: TerrainConfig,
    enabled: bool,
    exaggeration: f64,
}

impl TerrainLayerManager {
    pub fn new(config: TerrainConfig) -> Self {
        let exaggeration = config.default_exaggeration;
        Self {
            config,
            enabled: false,
            exaggeration,
        }
    }

    pub fn exaggeration(&self) -> f64 {
        self.exaggeration
    }

    /// Stores the host's values and applies them. Exaggeration is clamped to
    /// `[0, 1]`.
    pub fn update(
        &mut self,
        surface: &mut dyn MapSurface,
        enabled: bool,
        exaggeration: f64,
        style_ready: bool,
    ) -> Result<()> {
        self.enabled = enabled;
        self.exaggeration = if exaggeration.is_finite() {
            exaggeration.clamp(0.0, 1.0)
        } else {
            self.config.default_exaggeration
        };
        self.apply(surface, style_ready)
    }

    pub fn source_spec(&self) -> SourceSpec {
        SourceSpec::raster_dem(
            TERRAIN_SOURCE_ID,
            self.config.dem_tiles.clone(),
            self.config.encoding.clone(),
            self.config.tile_size,
            self.config.max_zoom,
        )
    }

    pub fn layer_spec(&self) -> LayerSpec {
        LayerSpec::new(TERRAIN_LAYER_ID, LayerKind::Hillshade, TERRAIN_SOURCE_ID)
            .paint("hillshade-exaggeration", self.exaggeration)
            .paint("hillshade-shadow-color", self.config.shadow_color.to_hex())
            .paint("hillshade-highlight-color", self.config.highlight_color.to_hex())
    }
}

impl AuxiliaryLayer for TerrainLayerManager {
    fn name(&self) -> &str {
        "terrain"
    }

    fn source_id(&self) -> &str {
        TERRAIN_SOURCE_ID
    }

    fn layer_id(&self) -> &str {
        TERRAIN_LAYER_ID
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply(&mut self, surface: &mut dyn MapSurface, style_ready: bool) -> Result<()> {
        if !style_ready {
            return Ok(());
        }
        if !self.enabled {
            return self.remove(surface);
        }

        if !surface.has_source(TERRAIN_SOURCE_ID) {
            surface.add_source(self.source_spec())?;
        }
        if surface.has_layer(TERRAIN_LAYER_ID) {
            surface.set_paint_property(
                TERRAIN_LAYER_ID,
                "hillshade-exaggeration",
                Value::from(self.exaggeration),
            )?;
        } else {
            // relief goes under the site overlays
            let position = if surface.has_layer(CLUSTER_LAYER_ID) {
                LayerPosition::Below(CLUSTER_LAYER_ID.to_string())
            } else {
                LayerPosition::Top
            };
            surface.add_layer(self.layer_spec(), position)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SITES_SOURCE_ID;
    use crate::data::geojson::FeatureCollection;
    use crate::rendering::memory::MemorySurface;
    use serde_json::json;

    #[test]
    fn test_enable_then_change_exaggeration() {
        let mut manager = TerrainLayerManager::new(TerrainConfig::default());
        let mut surface = MemorySurface::new();

        manager.update(&mut surface, true, 0.3, true).unwrap();
        assert!(manager.is_present(&surface));
        assert_eq!(
            surface.paint_property(TERRAIN_LAYER_ID, "hillshade-exaggeration"),
            Some(&json!(0.3))
        );

        manager.update(&mut surface, true, 4.0, true).unwrap();
        assert_eq!(manager.exaggeration(), 1.0);
        assert_eq!(
            surface.paint_property(TERRAIN_LAYER_ID, "hillshade-exaggeration"),
            Some(&json!(1.0))
        );

        manager.update(&mut surface, false, 1.0, true).unwrap();
        assert!(!surface.has_source(TERRAIN_SOURCE_ID));
    }

    #[test]
    fn test_hillshade_below_overlays() {
        let mut manager = TerrainLayerManager::new(TerrainConfig::default());
        let mut surface = MemorySurface::new();
        surface
            .add_source(SourceSpec::geojson(SITES_SOURCE_ID, FeatureCollection::default()))
            .unwrap();
        surface
            .add_layer(
                LayerSpec::new(CLUSTER_LAYER_ID, LayerKind::Circle, SITES_SOURCE_ID),
                LayerPosition::Top,
            )
            .unwrap();

        manager.update(&mut surface, true, 0.5, true).unwrap();
        assert_eq!(surface.layer_ids(), vec![TERRAIN_LAYER_ID, CLUSTER_LAYER_ID]);
    }

    #[test]
    fn test_noop_before_style_ready() {
        let mut manager = TerrainLayerManager::new(TerrainConfig::default());
        let mut surface = MemorySurface::new();
        manager.update(&mut surface, true, 0.5, false).unwrap();
        assert!(surface.calls().is_empty());
    }
}
