use crate::core::annotation::Annotation;
use crate::core::geo::LatLng;
use crate::core::settings::HeatmapPoint;
use crate::constants::{CLUSTER_FLAG, POINT_COUNT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON geometry. Only points are produced by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn point(coordinate: LatLng, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry: Geometry::Point {
                coordinates: coordinate.to_position(),
            },
            properties,
        }
    }

    /// Map feature for one annotation; `index` is its position in the host's
    /// ordered list.
    pub fn from_annotation(annotation: &Annotation, index: usize) -> Self {
        let mut properties = Map::new();
        properties.insert("id".into(), Value::from(annotation.id.clone()));
        properties.insert("kind".into(), Value::from(annotation.kind.as_str()));
        properties.insert("status".into(), Value::from(annotation.status.as_str()));
        properties.insert("difficulty".into(), Value::from(annotation.difficulty.as_str()));
        properties.insert("site_type".into(), Value::from(annotation.site_type.as_str()));
        properties.insert("visited".into(), Value::from(annotation.visited));
        properties.insert("wishlist".into(), Value::from(annotation.wishlist));
        properties.insert("selected".into(), Value::from(annotation.selected));
        properties.insert("index".into(), Value::from(index as u64));

        Self {
            id: Some(Value::from(annotation.id.clone())),
            ..Self::point(annotation.coordinate, properties)
        }
    }

    pub fn from_heatmap_point(point: &HeatmapPoint) -> Self {
        let mut properties = Map::new();
        properties.insert("dive_count".into(), Value::from(point.dive_count));
        Self::point(point.position, properties)
    }

    pub fn coordinate(&self) -> LatLng {
        match self.geometry {
            Geometry::Point { coordinates } => LatLng::from_position(coordinates),
        }
    }

    /// Whether the clustering engine synthesised this feature
    pub fn is_cluster(&self) -> bool {
        self.properties
            .get(CLUSTER_FLAG)
            .and_then(Value::as_bool)
            .unwrap_or(false)
            || self.properties.contains_key(POINT_COUNT)
    }

    pub fn point_count(&self) -> Option<u64> {
        self.properties.get(POINT_COUNT).and_then(Value::as_u64)
    }

    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn bool_property(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(Value::as_bool)
    }

    /// Identifier of the annotation behind a non-cluster feature
    pub fn site_id(&self) -> Option<&str> {
        self.string_property("id")
    }
}

/// Root GeoJSON object handed to sources
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        Self::new(
            annotations
                .iter()
                .enumerate()
                .map(|(index, annotation)| Feature::from_annotation(annotation, index))
                .collect(),
        )
    }

    pub fn from_heatmap_points(points: &[HeatmapPoint]) -> Self {
        Self::new(points.iter().map(Feature::from_heatmap_point).collect())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
