//! Keeps the clustered sites source in step with the host's annotations.
//!
//! The surface's clustering is fixed when a source is created, so a new
//! annotation list means tearing down the overlay layers and the source and
//! building both again. Updates are coalesced: each one supersedes the
//! rebuild scheduled before it, and only the newest generation executes.

use crate::constants::SITES_SOURCE_ID;
use crate::core::annotation::Annotation;
use crate::core::config::{MapConfig, ThemePalette};
use crate::core::queue::{UiSender, UiTask};
use crate::core::settings::LayerSettings;
use crate::data::geojson::FeatureCollection;
use crate::layers::composer::LayerComposer;
use crate::layers::spec::SourceSpec;
use crate::prelude::Arc;
use crate::traits::MapSurface;
use crate::Result;

/// Running totals, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub scheduled: u64,
    pub executed: u64,
    /// Scheduled rebuilds skipped because a newer one replaced them
    pub superseded: u64,
    /// Rebuilds dropped because the style was not ready
    pub deferred: u64,
    pub features_written: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Executed { features: usize, layers: usize },
    Superseded,
    Deferred,
}

/// What the rebuild composes against
pub struct RebuildContext<'a> {
    pub composer: &'a LayerComposer,
    pub palette: &'a ThemePalette,
    pub settings: &'a LayerSettings,
    pub heatmap_mode: bool,
    pub style_ready: bool,
}

pub struct AnnotationSyncEngine {
    config: Arc<MapConfig>,
    sender: UiSender,
    annotations: Vec<Annotation>,
    generation: u64,
    pending: Option<u64>,
    stats: RebuildStats,
}

impl AnnotationSyncEngine {
    pub fn new(config: Arc<MapConfig>, sender: UiSender) -> Self {
        Self {
            config,
            sender,
            annotations: Vec::new(),
            generation: 0,
            pending: None,
            stats: RebuildStats::default(),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn stats(&self) -> RebuildStats {
        self.stats
    }

    /// Generation of the rebuild still waiting to run
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending
    }

    /// Replaces the list and schedules a rebuild on the UI queue, cancelling
    /// the one scheduled before it. Never touches the surface.
    pub fn update(&mut self, annotations: Vec<Annotation>) -> u64 {
        self.annotations = annotations;
        self.generation += 1;
        if let Some(previous) = self.pending.replace(self.generation) {
            log::trace!("rebuild {} superseded by {}", previous, self.generation);
        }
        self.stats.scheduled += 1;
        self.sender.post(UiTask::Rebuild {
            generation: self.generation,
        });
        self.generation
    }

    /// Runs the rebuild scheduled under `generation` if it is still the
    /// newest one.
    pub fn run_scheduled<S: MapSurface + ?Sized>(
        &mut self,
        generation: u64,
        surface: &mut S,
        ctx: &RebuildContext<'_>,
    ) -> Result<RebuildOutcome> {
        if self.pending != Some(generation) {
            self.stats.superseded += 1;
            return Ok(RebuildOutcome::Superseded);
        }
        self.pending = None;

        if !ctx.style_ready {
            // Style-ready reruns the rebuild with whatever list is current.
            self.stats.deferred += 1;
            log::debug!("style not ready, rebuild {} deferred", generation);
            return Ok(RebuildOutcome::Deferred);
        }
        self.rebuild(surface, ctx)
    }

    /// Tears down and rebuilds the source and overlay layers from the
    /// current list. Any scheduled rebuild is cancelled since this one
    /// already reflects the newest list.
    pub fn rebuild<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        ctx: &RebuildContext<'_>,
    ) -> Result<RebuildOutcome> {
        self.pending = None;
        let features = FeatureCollection::from_annotations(&self.annotations);
        let count = features.len();
        log::debug!(
            "rebuilding {}: {} features, first={}",
            SITES_SOURCE_ID,
            count,
            self.annotations
                .first()
                .map(|a| a.id.as_str())
                .unwrap_or("-")
        );

        ctx.composer.remove_all(surface)?;
        if surface.has_source(SITES_SOURCE_ID) {
            surface.remove_source(SITES_SOURCE_ID)?;
        }
        surface.add_source(SourceSpec::clustered(
            SITES_SOURCE_ID,
            features,
            self.config.clustering,
        ))?;

        let layers = if count == 0 {
            0
        } else {
            ctx.composer
                .compose(surface, ctx.palette, ctx.settings, ctx.heatmap_mode)?
        };

        self.stats.executed += 1;
        self.stats.features_written += count as u64;
        Ok(RebuildOutcome::Executed {
            features: count,
            layers,
        })
    }
}
