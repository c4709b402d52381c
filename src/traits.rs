//! The map surface port
//!
//! The tile-rendering engine is a black box to this crate. Everything the
//! core needs from it is captured by [`MapSurface`]; events flowing the
//! other way arrive as [`SurfaceEvent`](crate::input::events::SurfaceEvent)
//! values passed to [`MapCore::dispatch`](crate::core::map::MapCore::dispatch).
//!
//! Implementations are only ever called from the UI-owning context, so the
//! trait does not require `Send`.

use crate::core::camera::NativeCamera;
use crate::core::geo::{Color, LatLngBounds};
use crate::data::geojson::{Feature, FeatureCollection};
use crate::input::events::ScreenPoint;
use crate::layers::spec::{LayerPosition, LayerSpec, SourceSpec};
use crate::Result;
use std::time::Duration;

pub trait MapSurface {
    /// Starts loading a style document. Completion is reported later as
    /// `StyleLoaded` or `StyleLoadFailed`. All sources and layers added on
    /// top of the previous style are discarded.
    fn load_style(&mut self, url: &str);

    /// Placeholder colour painted until the style draws
    fn set_background_color(&mut self, color: Color);

    fn has_source(&self, id: &str) -> bool;

    fn add_source(&mut self, source: SourceSpec) -> Result<()>;

    /// Replaces the data of an existing GeoJSON source
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;

    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn has_layer(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec, position: LayerPosition) -> Result<()>;

    fn remove_layer(&mut self, id: &str) -> Result<()>;

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<()>;

    fn set_paint_property(&mut self, id: &str, name: &str, value: serde_json::Value) -> Result<()>;

    /// Rendered features under a screen point, restricted to `layer_ids`,
    /// topmost first
    fn query_rendered_features(&self, point: ScreenPoint, layer_ids: &[&str]) -> Vec<Feature>;

    /// Moves the camera, animated over `transition` when given
    fn set_camera(&mut self, camera: NativeCamera, transition: Option<Duration>);

    /// Visible bounding box and zoom, or `None` before the first layout
    fn visible_region(&self) -> Option<(LatLngBounds, f64)>;
}
