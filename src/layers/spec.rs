use crate::core::config::ClusterOptions;
use crate::data::geojson::FeatureCollection;
use crate::layers::expression::Expression;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Circle,
    Symbol,
    Heatmap,
    Hillshade,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Circle => write!(f, "circle"),
            LayerKind::Symbol => write!(f, "symbol"),
            LayerKind::Heatmap => write!(f, "heatmap"),
            LayerKind::Hillshade => write!(f, "hillshade"),
        }
    }
}

/// Declarative description of one style layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expression>,
    pub paint: Map<String, Value>,
    pub layout: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            filter: None,
            paint: Map::new(),
            layout: Map::new(),
        }
    }

    pub fn filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_string(), value.into());
        self
    }

    pub fn layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_string(), value.into());
        self
    }

    pub fn visible(self, visible: bool) -> Self {
        self.layout("visibility", visibility_value(visible))
    }

    pub fn is_visible(&self) -> bool {
        self.layout
            .get("visibility")
            .map(|v| v != "none")
            .unwrap_or(true)
    }

    /// Style-spec JSON for this layer
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub fn visibility_value(visible: bool) -> Value {
    Value::from(if visible { "visible" } else { "none" })
}

/// Where a new layer goes in the surface's stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerPosition {
    Top,
    Above(String),
    Below(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceKind {
    Geojson {
        data: FeatureCollection,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster: Option<ClusterOptions>,
    },
    RasterDem {
        tiles: Vec<String>,
        encoding: String,
        #[serde(rename = "tileSize")]
        tile_size: u32,
        maxzoom: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    #[serde(flatten)]
    pub kind: SourceKind,
}

impl SourceSpec {
    pub fn geojson(id: impl Into<String>, data: FeatureCollection) -> Self {
        Self {
            id: id.into(),
            kind: SourceKind::Geojson {
                data,
                cluster: None,
            },
        }
    }

    /// A GeoJSON source the surface clusters itself. The cluster options are
    /// fixed when the source is created.
    pub fn clustered(id: impl Into<String>, data: FeatureCollection, options: ClusterOptions) -> Self {
        Self {
            id: id.into(),
            kind: SourceKind::Geojson {
                data,
                cluster: Some(options),
            },
        }
    }

    /// Elevation tiles for hillshading
    pub fn raster_dem(
        id: impl Into<String>,
        tiles: impl Into<String>,
        encoding: impl Into<String>,
        tile_size: u32,
        maxzoom: u8,
    ) -> Self {
        Self {
            id: id.into(),
            kind: SourceKind::RasterDem {
                tiles: vec![tiles.into()],
                encoding: encoding.into(),
                tile_size,
                maxzoom,
            },
        }
    }

    pub fn feature_count(&self) -> usize {
        match &self.kind {
            SourceKind::Geojson { data, .. } => data.features.len(),
            SourceKind::RasterDem { .. } => 0,
        }
    }

    pub fn cluster_options(&self) -> Option<ClusterOptions> {
        match &self.kind {
            SourceKind::Geojson { cluster, .. } => *cluster,
            SourceKind::RasterDem { .. } => None,
        }
    }
}
