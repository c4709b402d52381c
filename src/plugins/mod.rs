pub mod base;
pub mod heatmap;
pub mod terrain;

pub use base::AuxiliaryLayer;
pub use heatmap::HeatmapLayerManager;
pub use terrain::TerrainLayerManager;
