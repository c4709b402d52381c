//! Which style document is loaded, and how we get back to it.
//!
//! ```text
//!  start ──► Loading(primary) ──ok──► Ready
//!               │ fail
//!               ▼
//!          OfflineFallback ──probe──► ProbingPrimary ──reachable──► Loading(primary)
//!               │ fail                     │ unreachable
//!               ▼                          └──(+retry delay)──► ProbingPrimary
//!             Failed
//! ```
//!
//! Theme changes reload the themed primary document (`ThemeSwitching`)
//! unless the controller is offline, in which case the mode is recorded for
//! the next recovery.

use crate::core::config::{StyleConfig, ThemePalette};
use crate::core::queue::{UiSender, UiTask};
use crate::core::settings::StyleMode;
use crate::prelude::Arc;
use crate::runtime::Scheduler;
use crate::style::probe::{ConnectivityProbe, ProbeOutcome};
use crate::style::resources::StyleResources;
use crate::traits::MapSurface;

/// Externally visible state, derived from the controller's flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleState {
    /// `start` has not been called
    Idle,
    Loading { url: String },
    Ready,
    /// Running on the packaged offline document
    OfflineFallback,
    /// Offline, with a connectivity probe in flight
    ProbingPrimary,
    ThemeSwitching { mode: StyleMode },
    /// Every fallback is exhausted
    Failed,
}

/// What the orchestrator has to do after a lifecycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTransition {
    None,
    /// A new document was requested from the surface
    Loading,
    /// The loaded document is usable; layers can be composed
    Ready,
    /// Report the failure to the host (at most once)
    Failed,
}

pub struct StyleLifecycleController {
    config: StyleConfig,
    resources: StyleResources,
    probe: Arc<dyn ConnectivityProbe>,
    scheduler: Arc<dyn Scheduler>,
    sender: UiSender,
    mode: StyleMode,
    current_url: Option<String>,
    started: bool,
    style_is_ready: bool,
    offline: bool,
    theme_switching: bool,
    failed: bool,
    failure_reported: bool,
    probe_in_flight: bool,
    retry_pending: bool,
    load_requests: usize,
}

impl StyleLifecycleController {
    pub fn new(
        config: StyleConfig,
        resources: StyleResources,
        probe: Arc<dyn ConnectivityProbe>,
        scheduler: Arc<dyn Scheduler>,
        sender: UiSender,
    ) -> Self {
        Self {
            config,
            resources,
            probe,
            scheduler,
            sender,
            mode: StyleMode::default(),
            current_url: None,
            started: false,
            style_is_ready: false,
            offline: false,
            theme_switching: false,
            failed: false,
            failure_reported: false,
            probe_in_flight: false,
            retry_pending: false,
            load_requests: 0,
        }
    }

    pub fn state(&self) -> StyleState {
        if self.failed {
            StyleState::Failed
        } else if !self.started {
            StyleState::Idle
        } else if self.theme_switching {
            StyleState::ThemeSwitching { mode: self.mode }
        } else if self.offline && self.probe_in_flight {
            StyleState::ProbingPrimary
        } else if self.offline {
            StyleState::OfflineFallback
        } else if self.style_is_ready {
            StyleState::Ready
        } else {
            StyleState::Loading {
                url: self.current_url.clone().unwrap_or_default(),
            }
        }
    }

    pub fn mode(&self) -> StyleMode {
        self.mode
    }

    pub fn is_style_ready(&self) -> bool {
        self.style_is_ready
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Number of `load_style` calls issued so far
    pub fn load_requests(&self) -> usize {
        self.load_requests
    }

    /// Loads the initial document: the primary for the current mode, else
    /// the offline document, else fails immediately.
    pub fn start<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        palette: &ThemePalette,
    ) -> StyleTransition {
        if self.started {
            return StyleTransition::None;
        }
        self.started = true;
        surface.set_background_color(palette.background);

        if let Some(url) = self.resources.primary(self.mode).map(str::to_owned) {
            self.load(surface, url);
            return StyleTransition::Loading;
        }

        match self.resources.offline().map(str::to_owned) {
            Some(url) => {
                log::warn!("no primary style bundled, starting offline");
                self.offline = true;
                self.load(surface, url);
                StyleTransition::Loading
            }
            None => {
                log::error!("no style document bundled");
                self.fail()
            }
        }
    }

    pub fn on_style_loaded(&mut self) -> StyleTransition {
        if self.failed || !self.started {
            return StyleTransition::None;
        }
        self.style_is_ready = true;
        self.theme_switching = false;
        log::info!(
            "style ready: {} (offline={})",
            self.current_url.as_deref().unwrap_or("?"),
            self.offline
        );
        StyleTransition::Ready
    }

    /// Online failures fall back to the offline document and start probing
    /// for the primary; a failure while offline is terminal.
    pub fn on_style_load_failed<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        reason: &str,
    ) -> StyleTransition {
        if self.failed || !self.started {
            return StyleTransition::None;
        }
        self.style_is_ready = false;
        self.theme_switching = false;

        if self.offline {
            log::error!("offline style failed to load: {}", reason);
            return self.fail();
        }

        match self.resources.offline().map(str::to_owned) {
            Some(url) => {
                log::warn!("style failed to load ({}), falling back to offline", reason);
                self.offline = true;
                self.load(surface, url);
                self.start_probe();
                StyleTransition::Loading
            }
            None => {
                log::error!("style failed to load ({}) and no offline style bundled", reason);
                self.fail()
            }
        }
    }

    /// Switches theme. Returns the transition the orchestrator must react
    /// to; `None` when nothing was reloaded.
    pub fn set_mode<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        mode: StyleMode,
        palette: &ThemePalette,
    ) -> StyleTransition {
        if mode == self.mode {
            return StyleTransition::None;
        }
        self.mode = mode;
        if !self.started || self.failed {
            return StyleTransition::None;
        }
        surface.set_background_color(palette.background);

        if self.offline {
            log::info!("offline, {:?} theme applies once the primary is back", mode);
            return StyleTransition::None;
        }

        match self.resources.primary(mode).map(str::to_owned) {
            Some(url) => {
                self.style_is_ready = false;
                self.theme_switching = true;
                self.load(surface, url);
                StyleTransition::Loading
            }
            None => {
                log::error!("no style document for {:?} theme", mode);
                StyleTransition::None
            }
        }
    }

    pub fn on_probe_completed<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        outcome: ProbeOutcome,
    ) -> StyleTransition {
        self.probe_in_flight = false;
        if !self.offline || self.failed {
            return StyleTransition::None;
        }

        match outcome {
            ProbeOutcome::Reachable { status } => {
                let Some(url) = self.resources.primary(self.mode).map(str::to_owned) else {
                    log::warn!("primary reachable but no {:?} document bundled", self.mode);
                    return StyleTransition::None;
                };
                log::info!("primary reachable (HTTP {}), leaving offline mode", status);
                self.offline = false;
                self.style_is_ready = false;
                self.load(surface, url);
                StyleTransition::Loading
            }
            ProbeOutcome::Unreachable { reason } => {
                log::debug!("primary still unreachable: {}", reason);
                self.schedule_retry();
                StyleTransition::None
            }
        }
    }

    pub fn on_probe_retry(&mut self) {
        self.retry_pending = false;
        if self.offline && !self.failed {
            self.start_probe();
        }
    }

    fn load<S: MapSurface + ?Sized>(&mut self, surface: &mut S, url: String) {
        log::debug!("loading style {}", url);
        self.style_is_ready = false;
        surface.load_style(&url);
        self.current_url = Some(url);
        self.load_requests += 1;
    }

    fn fail(&mut self) -> StyleTransition {
        self.failed = true;
        self.style_is_ready = false;
        if self.failure_reported {
            return StyleTransition::None;
        }
        self.failure_reported = true;
        StyleTransition::Failed
    }

    fn start_probe(&mut self) {
        if self.probe_in_flight || self.retry_pending || !self.offline {
            return;
        }
        let Some(template) = self.config.primary_tile_template.as_deref() else {
            log::warn!("no primary tile template, staying offline");
            return;
        };
        let url = self.config.probe_tile.fill_template(template);
        let timeout = self.config.probe_timeout();
        let probe = self.probe.clone();
        let sender = self.sender.clone();

        self.probe_in_flight = true;
        log::debug!("probing {}", url);
        self.scheduler.spawn_boxed(Box::pin(async move {
            let outcome = probe.probe(&url, timeout).await;
            sender.post(UiTask::ProbeCompleted(outcome));
        }));
    }

    fn schedule_retry(&mut self) {
        if self.retry_pending {
            return;
        }
        self.retry_pending = true;
        let sender = self.sender.clone();
        self.scheduler.post_after(
            self.config.probe_retry(),
            Box::new(move || {
                sender.post(UiTask::ProbeRetry);
            }),
        );
    }
}
