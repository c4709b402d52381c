#![allow(dead_code)]

use async_trait::async_trait;
use crossbeam_channel::Receiver;
use reefmap::prelude::*;
use reefmap::style::StaticResolver;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const VECTOR_URL: &str = "https://styles.example/underwater.json";
pub const OFFLINE_URL: &str = "file:///bundle/underwater-offline.json";
pub const DAYLIGHT_URL: &str = "https://styles.example/daylight.json";

#[derive(Default)]
pub struct StubProbe {
    pub reachable: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ConnectivityProbe for StubProbe {
    async fn probe(&self, _url: &str, _timeout: Duration) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            ProbeOutcome::Reachable { status: 200 }
        } else {
            ProbeOutcome::Unreachable {
                reason: "connection refused".to_string(),
            }
        }
    }
}

pub struct Harness {
    pub core: MapCore<MemorySurface>,
    pub events: Receiver<MapEvent>,
    pub scheduler: Arc<ManualScheduler>,
    pub probe: Arc<StubProbe>,
}

impl Harness {
    /// Every event emitted so far, animation frames included
    pub fn events(&self) -> Vec<MapEvent> {
        self.events.try_iter().collect()
    }

    /// Events emitted so far, without animation frames
    pub fn notifications(&self) -> Vec<MapEvent> {
        self.events().into_iter().filter(|e| !e.is_frame()).collect()
    }

    pub fn surface(&self) -> &MemorySurface {
        self.core.surface()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.surface()
            .calls()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::LoadStyle(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn full_resolver() -> StaticResolver {
    StaticResolver::new()
        .with("underwater-vector", VECTOR_URL)
        .with("underwater-offline", OFFLINE_URL)
        .with("daylight-vector", DAYLIGHT_URL)
}

pub fn config() -> MapConfig {
    let mut config = MapConfig::default();
    config.style.primary_tile_template =
        Some("https://tiles.example/{z}/{x}/{y}.pbf".to_string());
    config
}

pub fn harness_with(config: MapConfig, resolver: StaticResolver) -> Harness {
    #[cfg(feature = "debug")]
    reefmap::init_logging();

    let scheduler = Arc::new(ManualScheduler::new());
    let probe = Arc::new(StubProbe::default());
    let mut surface = MemorySurface::new();
    surface.set_visible_region(LatLngBounds::from_coords(-10.0, 110.0, 0.0, 125.0), 5.0);
    let (core, events) = MapCore::new(
        surface,
        Arc::new(config),
        scheduler.clone(),
        &resolver,
        probe.clone(),
    );
    Harness {
        core,
        events,
        scheduler,
        probe,
    }
}

pub fn harness() -> Harness {
    harness_with(config(), full_resolver())
}

/// Started, style loaded, with `sites` on the map
pub fn ready_harness(sites: Vec<Annotation>) -> Harness {
    let mut h = harness();
    h.core.start();
    h.core.set_annotations(sites);
    h.core.pump();
    h.core.dispatch(SurfaceEvent::StyleLoaded);
    h.core.pump();
    h
}

pub fn sites(n: usize) -> Vec<Annotation> {
    let statuses = SiteStatus::ALL;
    let difficulties = Difficulty::ALL;
    (0..n)
        .map(|i| {
            Annotation::site(format!("site-{}", i), LatLng::new(-8.0 + i as f64 * 0.01, 115.0))
                .with_status(statuses[i % statuses.len()])
                .with_difficulty(difficulties[i % difficulties.len()])
        })
        .collect()
}
