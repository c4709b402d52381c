//! The map core: one owner for the surface and every component that
//! touches it.
//!
//! Surface events come in through [`MapCore::dispatch`], host requests
//! through the setters (or a [`MapHandle`] from other threads), and
//! deferred work through the UI queue drained by [`MapCore::pump`].
//! Host notifications go out on the [`MapEvent`] channel returned by
//! [`MapCore::new`].

use crate::animation::clock::ScheduledFrameClock;
use crate::animation::markers::MarkerAnimationEngine;
use crate::core::annotation::Annotation;
use crate::core::camera::{cluster_zoom_target, Camera, CameraController};
use crate::core::config::MapConfig;
use crate::core::queue::{MapHandle, UiQueue, UiTask};
use crate::core::settings::{HeatmapPoint, LayerSettings, StyleMode};
use crate::core::viewport::{Viewport, ViewportEmitter};
use crate::data::sync::{AnnotationSyncEngine, RebuildContext, RebuildOutcome, RebuildStats};
use crate::input::events::{MapEvent, ScreenPoint, SurfaceEvent};
use crate::input::handler::{resolve_tap, TapAction};
use crate::layers::composer::LayerComposer;
use crate::plugins::base::AuxiliaryLayer;
use crate::plugins::heatmap::HeatmapLayerManager;
use crate::plugins::terrain::TerrainLayerManager;
use crate::prelude::{Arc, Instant};
use crate::runtime::Scheduler;
use crate::style::lifecycle::{StyleLifecycleController, StyleState, StyleTransition};
use crate::style::probe::ConnectivityProbe;
use crate::style::resources::{ResourceResolver, StyleResources};
use crate::traits::MapSurface;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};

pub struct MapCore<S: MapSurface> {
    config: Arc<MapConfig>,
    surface: S,
    queue: UiQueue,
    events: Sender<MapEvent>,
    style: StyleLifecycleController,
    composer: LayerComposer,
    sync: AnnotationSyncEngine,
    camera: CameraController,
    viewport: ViewportEmitter,
    animations: MarkerAnimationEngine,
    heatmap: HeatmapLayerManager,
    terrain: TerrainLayerManager,
    settings: LayerSettings,
}

impl<S: MapSurface> MapCore<S> {
    /// Wires the components together. Nothing touches the surface until
    /// [`start`](Self::start).
    pub fn new(
        surface: S,
        config: Arc<MapConfig>,
        scheduler: Arc<dyn Scheduler>,
        resolver: &dyn ResourceResolver,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> (Self, Receiver<MapEvent>) {
        let queue = UiQueue::new();
        let (events, receiver) = unbounded();

        let resources = StyleResources::resolve(&config.style, resolver);
        let style = StyleLifecycleController::new(
            config.style.clone(),
            resources,
            probe,
            scheduler.clone(),
            queue.sender(),
        );
        let clock = ScheduledFrameClock::new(
            scheduler,
            queue.sender(),
            config.animation.frame_interval(),
        );

        let core = Self {
            composer: LayerComposer::new(config.clone()),
            sync: AnnotationSyncEngine::new(config.clone(), queue.sender()),
            camera: CameraController::new(config.camera.clone()),
            viewport: ViewportEmitter::new(config.viewport.clone()),
            animations: MarkerAnimationEngine::new(config.animation.clone(), Box::new(clock)),
            heatmap: HeatmapLayerManager::new(config.heatmap.clone()),
            terrain: TerrainLayerManager::new(config.terrain.clone()),
            settings: LayerSettings::default(),
            style,
            queue,
            events,
            surface,
            config,
        };
        (core, receiver)
    }

    /// Loads the initial style document
    pub fn start(&mut self) {
        let config = self.config.clone();
        let palette = config.palette(self.style.mode());
        let transition = self.style.start(&mut self.surface, palette);
        self.on_transition(transition);
    }

    /// Cross-thread handle posting onto this core's queue
    pub fn handle(&self) -> MapHandle {
        MapHandle::new(self.queue.sender())
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn style_state(&self) -> StyleState {
        self.style.state()
    }

    pub fn is_style_ready(&self) -> bool {
        self.style.is_style_ready()
    }

    pub fn style_controller(&self) -> &StyleLifecycleController {
        &self.style
    }

    pub fn layer_settings(&self) -> LayerSettings {
        self.settings
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.sync.annotations()
    }

    pub fn rebuild_stats(&self) -> RebuildStats {
        self.sync.stats()
    }

    pub fn animations(&self) -> &MarkerAnimationEngine {
        &self.animations
    }

    pub fn last_viewport(&self) -> Option<&Viewport> {
        self.viewport.last_emitted()
    }

    /// Single entry point for surface events
    pub fn dispatch(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::StyleLoaded => {
                let transition = self.style.on_style_loaded();
                self.on_transition(transition);
            }
            SurfaceEvent::StyleLoadFailed { reason } => {
                let transition = self.style.on_style_load_failed(&mut self.surface, &reason);
                self.on_transition(transition);
            }
            SurfaceEvent::RegionChanged => self.emit_viewport(false),
            SurfaceEvent::Tapped { point } => self.on_tap(point),
        }
    }

    /// Runs queued tasks in FIFO order, including tasks they queue. Returns
    /// how many ran.
    pub fn pump(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.queue.try_next() {
            self.run_task(task);
            ran += 1;
        }
        ran
    }

    fn run_task(&mut self, task: UiTask) {
        match task {
            UiTask::SetAnnotations(annotations) => self.set_annotations(annotations),
            UiTask::Rebuild { generation } => self.run_rebuild(generation),
            UiTask::ApplySettings(settings) => self.set_layer_settings(settings),
            UiTask::SetCamera { camera, animated } => self.set_camera(camera, animated),
            UiTask::SetStyleMode(mode) => self.set_style_mode(mode),
            UiTask::SetHeatmap { points, show } => self.set_heatmap(points, show),
            UiTask::SetTerrain {
                enabled,
                exaggeration,
            } => self.set_terrain(enabled, exaggeration),
            UiTask::BounceMarkers(site_ids) => self.bounce_markers(site_ids),
            UiTask::CancelAnimations => self.cancel_animations(),
            UiTask::ProbeCompleted(outcome) => {
                let transition = self.style.on_probe_completed(&mut self.surface, outcome);
                self.on_transition(transition);
            }
            UiTask::ProbeRetry => self.style.on_probe_retry(),
            UiTask::Frame => self.tick_animations_at(Instant::now()),
            UiTask::Surface(event) => self.dispatch(event),
        }
    }

    /// Replaces the annotation list; the rebuild runs on the next `pump`
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.sync.update(annotations);
    }

    /// Applies a host camera unless it is within epsilon of the last one
    pub fn set_camera(&mut self, camera: Option<Camera>, animated: bool) {
        let Some(camera) = camera else {
            return;
        };
        self.camera.set_camera(&mut self.surface, camera, animated);
    }

    pub fn set_layer_settings(&mut self, settings: LayerSettings) {
        self.settings = settings;
        self.apply_settings();
    }

    pub fn set_style_mode(&mut self, mode: StyleMode) {
        let config = self.config.clone();
        let transition = self
            .style
            .set_mode(&mut self.surface, mode, config.palette(mode));
        self.on_transition(transition);
    }

    /// Shows or hides the heatmap. While it is shown the marker overlays
    /// are hidden.
    pub fn set_heatmap(&mut self, points: Vec<HeatmapPoint>, show: bool) {
        let ready = self.style.is_style_ready();
        let was_shown = self.heatmap.is_enabled();
        let result = self.heatmap.update(&mut self.surface, points, show, ready);
        log_failure("heatmap update", result);
        if was_shown != show {
            self.apply_settings();
        }
    }

    pub fn set_terrain(&mut self, enabled: bool, exaggeration: f64) {
        let ready = self.style.is_style_ready();
        let result = self
            .terrain
            .update(&mut self.surface, enabled, exaggeration, ready);
        log_failure("terrain update", result);
    }

    /// Staggered bounce over `site_ids`
    pub fn bounce_markers(&mut self, site_ids: Vec<String>) {
        if self.animations.start_bounce(site_ids, Instant::now()) {
            self.emit(MapEvent::Haptic);
        }
    }

    pub fn cancel_animations(&mut self) {
        self.animations.cancel();
    }

    /// Samples running animations at `now` and emits their frames
    pub fn tick_animations_at(&mut self, now: Instant) {
        for frame in self.animations.tick(now) {
            self.emit(MapEvent::MarkerFrame(frame));
        }
    }

    fn on_transition(&mut self, transition: StyleTransition) {
        match transition {
            StyleTransition::Ready => self.on_style_ready(),
            StyleTransition::Failed => {
                log::error!("all style fallbacks exhausted");
                self.emit(MapEvent::LoadFailure);
            }
            StyleTransition::Loading | StyleTransition::None => {}
        }
    }

    /// Overlays, data, settings, auxiliary layers, then a viewport
    fn on_style_ready(&mut self) {
        match self.rebuild_now() {
            Ok(RebuildOutcome::Executed { features, layers }) => {
                log::debug!("style ready: {} features, {} layers", features, layers);
            }
            Ok(_) => {}
            Err(err) => log::error!("rebuild after style load failed: {}", err),
        }
        self.apply_settings();

        let result = self.heatmap.apply(&mut self.surface, true);
        log_failure("heatmap restore", result);
        let result = self.terrain.apply(&mut self.surface, true);
        log_failure("terrain restore", result);

        self.emit_viewport(true);
    }

    fn rebuild_now(&mut self) -> Result<RebuildOutcome> {
        let config = self.config.clone();
        let ctx = RebuildContext {
            composer: &self.composer,
            palette: config.palette(self.style.mode()),
            settings: &self.settings,
            heatmap_mode: self.heatmap.is_enabled(),
            style_ready: self.style.is_style_ready(),
        };
        self.sync.rebuild(&mut self.surface, &ctx)
    }

    fn run_rebuild(&mut self, generation: u64) {
        let config = self.config.clone();
        let ctx = RebuildContext {
            composer: &self.composer,
            palette: config.palette(self.style.mode()),
            settings: &self.settings,
            heatmap_mode: self.heatmap.is_enabled(),
            style_ready: self.style.is_style_ready(),
        };
        match self.sync.run_scheduled(generation, &mut self.surface, &ctx) {
            Ok(RebuildOutcome::Executed { features, .. }) => {
                log::debug!("rebuild {} wrote {} features", generation, features);
            }
            Ok(_) => {}
            Err(err) => log::error!("rebuild {} failed: {}", generation, err),
        }
    }

    fn apply_settings(&mut self) {
        if !self.style.is_style_ready() {
            return;
        }
        let config = self.config.clone();
        let result = self.composer.apply_settings(
            &mut self.surface,
            config.palette(self.style.mode()),
            &self.settings,
            self.heatmap.is_enabled(),
        );
        log_failure("layer settings", result);
    }

    fn on_tap(&mut self, point: ScreenPoint) {
        if !self.style.is_style_ready() {
            return;
        }
        match resolve_tap(&self.surface, point, self.composer.interactive_layer_ids()) {
            TapAction::ExpandCluster { coordinate, count } => {
                self.emit(MapEvent::ClusterTap { coordinate, count });
                let current = self
                    .surface
                    .visible_region()
                    .map(|(_, zoom)| zoom)
                    .or_else(|| self.camera.last_applied().map(|c| c.zoom))
                    .unwrap_or(0.0);
                let target = cluster_zoom_target(current, self.config.clustering.max_zoom);
                if target > current {
                    self.camera.fly_to(&mut self.surface, coordinate, target);
                }
            }
            TapAction::Select { id } => {
                let haptic = self.animations.start_selection(&id, Instant::now());
                self.emit(MapEvent::Select { id });
                if haptic {
                    self.emit(MapEvent::Haptic);
                }
            }
            TapAction::None => {}
        }
    }

    fn emit_viewport(&mut self, force: bool) {
        let Some((bounds, zoom)) = self.surface.visible_region() else {
            return;
        };
        let viewport = Viewport::new(bounds, zoom);
        let emitted = if force {
            Some(self.viewport.force(viewport))
        } else {
            self.viewport.on_region_change(viewport)
        };
        if let Some(viewport) = emitted {
            self.emit(MapEvent::RegionChange(viewport));
        }
    }

    fn emit(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            log::trace!("event receiver dropped");
        }
    }
}

fn log_failure(what: &str, result: Result<()>) {
    if let Err(err) = result {
        log::error!("{} failed: {}", what, err);
    }
}
