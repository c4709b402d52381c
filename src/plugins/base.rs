use crate::traits::MapSurface;
use crate::Result;

/// An optional visualisation that owns one source and one layer.
///
/// Managers keep the last values the host gave them and are otherwise
/// stateless: [`apply`](AuxiliaryLayer::apply) makes the surface match
/// those values, so it can run again after every style load.
pub trait AuxiliaryLayer {
    fn name(&self) -> &str;
    fn source_id(&self) -> &str;
    fn layer_id(&self) -> &str;
    fn is_enabled(&self) -> bool;

    /// Creates, updates or removes the source and layer. A no-op until the
    /// style is ready.
    fn apply(&mut self, surface: &mut dyn MapSurface, style_ready: bool) -> Result<()>;

    /// Removes the layer, then its source. Missing pieces are skipped.
    fn remove(&self, surface: &mut dyn MapSurface) -> Result<()> {
        if surface.has_layer(self.layer_id()) {
            surface.remove_layer(self.layer_id())?;
        }
        if surface.has_source(self.source_id()) {
            surface.remove_source(self.source_id())?;
        }
        Ok(())
    }

    fn is_present(&self, surface: &dyn MapSurface) -> bool {
        surface.has_source(self.source_id()) && surface.has_layer(self.layer_id())
    }
}
