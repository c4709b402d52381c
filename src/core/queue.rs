//! The UI-owning execution context
//!
//! All surface mutation happens while [`MapCore::pump`](crate::core::map::MapCore::pump)
//! drains the queue on the thread that owns the surface. Other threads and
//! background work only ever post [`UiTask`] values, which run in FIFO
//! order per sender.

use crate::core::annotation::Annotation;
use crate::core::camera::Camera;
use crate::core::settings::{HeatmapPoint, LayerSettings, StyleMode};
use crate::input::events::SurfaceEvent;
use crate::style::probe::ProbeOutcome;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// A unit of work for the UI-owning context
#[derive(Debug, Clone, PartialEq)]
pub enum UiTask {
    /// Replace the annotation list
    SetAnnotations(Vec<Annotation>),
    /// Run the annotation rebuild scheduled under `generation`; stale
    /// generations are skipped
    Rebuild { generation: u64 },
    ApplySettings(LayerSettings),
    SetCamera { camera: Option<Camera>, animated: bool },
    SetStyleMode(StyleMode),
    SetHeatmap { points: Vec<HeatmapPoint>, show: bool },
    SetTerrain { enabled: bool, exaggeration: f64 },
    BounceMarkers(Vec<String>),
    CancelAnimations,
    ProbeCompleted(ProbeOutcome),
    ProbeRetry,
    /// One tick of the animation frame clock
    Frame,
    Surface(SurfaceEvent),
}

/// Sending half of the UI queue
#[derive(Debug, Clone)]
pub struct UiSender {
    tx: Sender<UiTask>,
}

impl UiSender {
    /// Posts a task. Returns `false` when the owning `MapCore` is gone.
    pub fn post(&self, task: UiTask) -> bool {
        if self.tx.send(task).is_err() {
            log::debug!("ui queue closed, task dropped");
            return false;
        }
        true
    }
}

#[derive(Debug)]
pub struct UiQueue {
    tx: Sender<UiTask>,
    rx: Receiver<UiTask>,
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UiQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> UiSender {
        UiSender {
            tx: self.tx.clone(),
        }
    }

    /// Next queued task, if any
    pub fn try_next(&self) -> Option<UiTask> {
        match self.rx.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Cross-thread entry point for the host.
///
/// Every setter posts a task; nothing here touches the surface.
#[derive(Debug, Clone)]
pub struct MapHandle {
    sender: UiSender,
}

impl MapHandle {
    pub(crate) fn new(sender: UiSender) -> Self {
        Self { sender }
    }

    pub fn set_annotations(&self, annotations: Vec<Annotation>) -> bool {
        self.sender.post(UiTask::SetAnnotations(annotations))
    }

    pub fn set_layer_settings(&self, settings: LayerSettings) -> bool {
        self.sender.post(UiTask::ApplySettings(settings))
    }

    pub fn set_camera(&self, camera: Option<Camera>, animated: bool) -> bool {
        self.sender.post(UiTask::SetCamera { camera, animated })
    }

    pub fn set_style_mode(&self, mode: StyleMode) -> bool {
        self.sender.post(UiTask::SetStyleMode(mode))
    }

    pub fn set_heatmap(&self, points: Vec<HeatmapPoint>, show: bool) -> bool {
        self.sender.post(UiTask::SetHeatmap { points, show })
    }

    pub fn set_terrain(&self, enabled: bool, exaggeration: f64) -> bool {
        self.sender.post(UiTask::SetTerrain {
            enabled,
            exaggeration,
        })
    }

    pub fn bounce_markers(&self, site_ids: Vec<String>) -> bool {
        self.sender.post(UiTask::BounceMarkers(site_ids))
    }

    pub fn cancel_animations(&self) -> bool {
        self.sender.post(UiTask::CancelAnimations)
    }

    /// Forwards a surface event raised on another thread
    pub fn dispatch(&self, event: SurfaceEvent) -> bool {
        self.sender.post(UiTask::Surface(event))
    }
}
