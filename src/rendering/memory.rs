//! In-memory map surface
//!
//! Keeps the same bookkeeping a tile-rendering engine keeps (loaded style,
//! sources, ordered layers with their paint and layout) without drawing
//! anything, and records every call in order. Used by the headless driver
//! and by tests.

use crate::core::camera::{distance_to_zoom, NativeCamera};
use crate::core::geo::{Color, LatLng, LatLngBounds};
use crate::data::geojson::{Feature, FeatureCollection};
use crate::input::events::ScreenPoint;
use crate::layers::spec::{visibility_value, LayerPosition, LayerSpec, SourceKind, SourceSpec};
use crate::prelude::Duration;
use crate::traits::MapSurface;
use crate::{MapError, Result};
use serde_json::Value;

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    LoadStyle(String),
    SetBackground(Color),
    AddSource(String),
    SetSourceData(String),
    RemoveSource(String),
    AddLayer(String),
    RemoveLayer(String),
    SetVisibility { id: String, visible: bool },
    SetPaint { id: String, name: String },
    SetCamera {
        camera: NativeCamera,
        transition: Option<Duration>,
    },
}

#[derive(Debug, Clone)]
pub struct MemorySurface {
    base_distance: f64,
    style_url: Option<String>,
    background: Option<Color>,
    sources: Vec<SourceSpec>,
    layers: Vec<LayerSpec>,
    rendered: Vec<Feature>,
    region: Option<(LatLngBounds, f64)>,
    camera: Option<NativeCamera>,
    calls: Vec<SurfaceCall>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::with_base_distance(crate::core::config::CameraConfig::default().base_distance_m)
    }

    /// `base_distance` must match the camera config so camera moves map
    /// back to the same zoom.
    pub fn with_base_distance(base_distance: f64) -> Self {
        Self {
            base_distance,
            style_url: None,
            background: None,
            sources: Vec::new(),
            layers: Vec::new(),
            rendered: Vec::new(),
            region: None,
            camera: None,
            calls: Vec::new(),
        }
    }

    pub fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref()
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn camera(&self) -> Option<NativeCamera> {
        self.camera
    }

    /// Layer ids bottom to top
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn is_layer_visible(&self, id: &str) -> Option<bool> {
        self.layer(id).map(LayerSpec::is_visible)
    }

    pub fn paint_property(&self, id: &str, name: &str) -> Option<&Value> {
        self.layer(id).and_then(|l| l.paint.get(name))
    }

    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn source_feature_count(&self, id: &str) -> Option<usize> {
        self.source(id).map(SourceSpec::feature_count)
    }

    /// Site ids carried by a GeoJSON source, in order
    pub fn source_feature_ids(&self, id: &str) -> Vec<&str> {
        match self.source(id).map(|s| &s.kind) {
            Some(SourceKind::Geojson { data, .. }) => {
                data.features.iter().filter_map(Feature::site_id).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Features returned by the next tap queries. A feature is reported for
    /// a query when one of the queried layers exists, is visible and its
    /// filter accepts the feature.
    pub fn set_rendered_features(&mut self, features: Vec<Feature>) {
        self.rendered = features;
    }

    /// Overrides the visible region reported to the core
    pub fn set_visible_region(&mut self, bounds: LatLngBounds, zoom: f64) {
        self.region = Some((bounds, zoom));
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn camera_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::SetCamera { .. }))
            .count()
    }

    pub fn load_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::LoadStyle(_)))
            .count()
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MapError::Layer(format!("no layer '{}'", id)))
    }

    fn layer_index(&self, id: &str) -> Result<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| MapError::Layer(format!("no layer '{}'", id)))
    }

    /// Region a camera would show on a roughly square viewport
    fn region_for(&self, camera: &NativeCamera) -> (LatLngBounds, f64) {
        let zoom = distance_to_zoom(camera.distance, self.base_distance);
        let lng_span = 360.0 / 2_f64.powf(zoom);
        let lat_span = lng_span / 2.0;
        let center = camera.center;
        let bounds = LatLngBounds::new(
            LatLng::new(
                LatLng::clamp_lat(center.lat - lat_span / 2.0),
                center.lng - lng_span / 2.0,
            ),
            LatLng::new(
                LatLng::clamp_lat(center.lat + lat_span / 2.0),
                center.lng + lng_span / 2.0,
            ),
        );
        (bounds, zoom)
    }
}

impl MapSurface for MemorySurface {
    fn load_style(&mut self, url: &str) {
        self.style_url = Some(url.to_string());
        self.sources.clear();
        self.layers.clear();
        self.calls.push(SurfaceCall::LoadStyle(url.to_string()));
    }

    fn set_background_color(&mut self, color: Color) {
        self.background = Some(color);
        self.calls.push(SurfaceCall::SetBackground(color));
    }

    fn has_source(&self, id: &str) -> bool {
        self.source(id).is_some()
    }

    fn add_source(&mut self, source: SourceSpec) -> Result<()> {
        if self.has_source(&source.id) {
            return Err(MapError::Source(format!("source '{}' already exists", source.id)));
        }
        self.calls.push(SurfaceCall::AddSource(source.id.clone()));
        self.sources.push(source);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MapError::Source(format!("no source '{}'", id)))?;
        match &mut source.kind {
            SourceKind::Geojson { data: current, .. } => *current = data,
            SourceKind::RasterDem { .. } => {
                return Err(MapError::Source(format!("source '{}' is not GeoJSON", id)))
            }
        }
        self.calls.push(SurfaceCall::SetSourceData(id.to_string()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(MapError::Source(format!(
                "source '{}' still used by layer '{}'",
                id, layer.id
            )));
        }
        let before = self.sources.len();
        self.sources.retain(|s| s.id != id);
        if self.sources.len() == before {
            return Err(MapError::Source(format!("no source '{}'", id)));
        }
        self.calls.push(SurfaceCall::RemoveSource(id.to_string()));
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }

    fn add_layer(&mut self, layer: LayerSpec, position: LayerPosition) -> Result<()> {
        if self.has_layer(&layer.id) {
            return Err(MapError::Layer(format!("layer '{}' already exists", layer.id)));
        }
        if !self.has_source(&layer.source) {
            return Err(MapError::Source(format!(
                "layer '{}' references missing source '{}'",
                layer.id, layer.source
            )));
        }
        let index = match &position {
            LayerPosition::Top => self.layers.len(),
            LayerPosition::Above(id) => self.layer_index(id)? + 1,
            LayerPosition::Below(id) => self.layer_index(id)?,
        };
        self.calls.push(SurfaceCall::AddLayer(layer.id.clone()));
        self.layers.insert(index, layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        let index = self.layer_index(id)?;
        self.layers.remove(index);
        self.calls.push(SurfaceCall::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<()> {
        let layer = self.layer_mut(id)?;
        layer
            .layout
            .insert("visibility".to_string(), visibility_value(visible));
        self.calls.push(SurfaceCall::SetVisibility {
            id: id.to_string(),
            visible,
        });
        Ok(())
    }

    fn set_paint_property(&mut self, id: &str, name: &str, value: Value) -> Result<()> {
        let layer = self.layer_mut(id)?;
        layer.paint.insert(name.to_string(), value);
        self.calls.push(SurfaceCall::SetPaint {
            id: id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    fn query_rendered_features(&self, _point: ScreenPoint, layer_ids: &[&str]) -> Vec<Feature> {
        let layers: Vec<&LayerSpec> = layer_ids
            .iter()
            .filter_map(|id| self.layer(id))
            .filter(|layer| layer.is_visible())
            .collect();

        self.rendered
            .iter()
            .filter(|feature| {
                layers.iter().any(|layer| {
                    layer
                        .filter
                        .as_ref()
                        .map(|filter| filter.matches(&feature.properties))
                        .unwrap_or(true)
                })
            })
            .cloned()
            .collect()
    }

    fn set_camera(&mut self, camera: NativeCamera, transition: Option<Duration>) {
        self.region = Some(self.region_for(&camera));
        self.camera = Some(camera);
        self.calls.push(SurfaceCall::SetCamera { camera, transition });
    }

    fn visible_region(&self) -> Option<(LatLngBounds, f64)> {
        self.region
    }
}
