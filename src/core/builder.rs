//! Fluent construction of a [`MapCore`]

use crate::core::config::MapConfig;
use crate::core::map::MapCore;
use crate::input::events::MapEvent;
use crate::prelude::Arc;
use crate::runtime::Scheduler;
use crate::style::probe::{ConnectivityProbe, HttpProbe};
use crate::style::resources::ResourceResolver;
use crate::traits::MapSurface;
use crate::{MapError, Result};
use crossbeam_channel::Receiver;

pub struct MapCoreBuilder {
    config: MapConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
    resolver: Option<Box<dyn ResourceResolver>>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
}

impl Default for MapCoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCoreBuilder {
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            scheduler: None,
            resolver: None,
            probe: None,
        }
    }

    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Where logical style names are looked up
    pub fn with_resolver(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Connectivity probe; defaults to [`HttpProbe`]
    pub fn with_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Validates the configuration and builds the core. Without an explicit
    /// scheduler the tokio runtime of the calling thread is used.
    pub fn build<S: MapSurface>(self, surface: S) -> Result<(MapCore<S>, Receiver<MapEvent>)> {
        self.config.validate()?;
        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => default_scheduler()?,
        };
        let resolver = self
            .resolver
            .ok_or_else(|| MapError::Config("no style resolver configured".to_string()))?;
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(HttpProbe::new()) as Arc<dyn ConnectivityProbe>);

        Ok(MapCore::new(
            surface,
            Arc::new(self.config),
            scheduler,
            resolver.as_ref(),
            probe,
        ))
    }
}

#[cfg(feature = "tokio-runtime")]
fn default_scheduler() -> Result<Arc<dyn Scheduler>> {
    crate::runtime::TokioScheduler::current()
        .map(|scheduler| Arc::new(scheduler) as Arc<dyn Scheduler>)
        .ok_or_else(|| MapError::Config("no scheduler and no tokio runtime".to_string()))
}

#[cfg(not(feature = "tokio-runtime"))]
fn default_scheduler() -> Result<Arc<dyn Scheduler>> {
    Err(MapError::Config("no scheduler configured".to_string()))
}
