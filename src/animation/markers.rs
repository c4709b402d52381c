//! Procedural marker animations.
//!
//! Two independent animations can run at once: a selection pulse on one
//! marker and a staggered bounce across several. Both are sampled on frame
//! ticks and emit per-marker transforms; the surface's own animation
//! primitives are not used.

use crate::animation::clock::FrameClock;
use crate::core::config::AnimationConfig;
use crate::prelude::{Duration, Instant};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Transform for one marker on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerFrame {
    pub site_id: String,
    pub scale: f64,
    /// Vertical offset in screen points, positive is up
    pub offset: f64,
}

impl MarkerFrame {
    fn new(site_id: &str, scale: f64, offset: f64) -> Self {
        Self {
            site_id: site_id.to_string(),
            scale,
            offset,
        }
    }
}

/// Scale of the selection pulse at `progress` in `[0, 1]`.
///
/// A decaying sine around a linear ramp: 1 at the start, exactly
/// `final_scale` at the end.
pub fn selection_scale(progress: f64, pulse_scale: f64, final_scale: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 + (pulse_scale - 1.0) * (TAU * p).sin() * (1.0 - p) + (final_scale - 1.0) * p
}

/// Vertical bounce offset at local `progress` in `[0, 1]`: a damped
/// oscillation that settles at zero.
pub fn bounce_offset(progress: f64, peak_offset: f64, decay: f64, frequency: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    peak_offset * (1.0 - (1.0 - decay * (TAU * frequency * p).cos() * (1.0 - p)))
}

#[derive(Debug, Clone)]
struct SelectionPulse {
    site_id: String,
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Clone)]
struct Bounce {
    site_ids: Vec<String>,
    started: Instant,
    duration: Duration,
    stagger: Duration,
    finished: Vec<bool>,
    completed: usize,
}

pub struct MarkerAnimationEngine {
    config: AnimationConfig,
    clock: Box<dyn FrameClock>,
    selection: Option<SelectionPulse>,
    bounce: Option<Bounce>,
    bounce_completed: usize,
}

impl MarkerAnimationEngine {
    pub fn new(config: AnimationConfig, clock: Box<dyn FrameClock>) -> Self {
        Self {
            config,
            clock,
            selection: None,
            bounce: None,
            bounce_completed: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.selection.is_some() || self.bounce.is_some()
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn selection_target(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.site_id.as_str())
    }

    /// Markers of the current (or last) bounce that have settled
    pub fn bounce_completed(&self) -> usize {
        self.bounce
            .as_ref()
            .map(|b| b.completed)
            .unwrap_or(self.bounce_completed)
    }

    /// Starts a pulse on `site_id`, replacing any running pulse. Returns
    /// whether a haptic tap should fire.
    pub fn start_selection(&mut self, site_id: &str, now: Instant) -> bool {
        self.selection = Some(SelectionPulse {
            site_id: site_id.to_string(),
            started: now,
            duration: self.config.selection_duration(),
        });
        self.clock.start();
        self.config.haptics
    }

    /// Starts a staggered bounce over `site_ids`, replacing any running
    /// bounce. Returns whether a haptic tap should fire.
    pub fn start_bounce(&mut self, site_ids: Vec<String>, now: Instant) -> bool {
        if site_ids.is_empty() {
            return false;
        }
        let count = site_ids.len();
        self.bounce = Some(Bounce {
            site_ids,
            started: now,
            duration: self.config.bounce_duration(),
            stagger: self.config.stagger_delay(),
            finished: vec![false; count],
            completed: 0,
        });
        self.bounce_completed = 0;
        self.clock.start();
        self.config.haptics
    }

    /// Samples both animations at `now`. Stops the clock once neither is
    /// running.
    pub fn tick(&mut self, now: Instant) -> Vec<MarkerFrame> {
        let mut frames = Vec::new();

        if let Some(pulse) = &self.selection {
            let elapsed = now.saturating_duration_since(pulse.started);
            if elapsed >= pulse.duration {
                frames.push(MarkerFrame::new(&pulse.site_id, self.config.final_scale, 0.0));
                self.selection = None;
            } else {
                let progress = elapsed.as_secs_f64() / pulse.duration.as_secs_f64();
                let scale =
                    selection_scale(progress, self.config.pulse_scale, self.config.final_scale);
                frames.push(MarkerFrame::new(&pulse.site_id, scale, 0.0));
            }
        }

        if let Some(bounce) = &mut self.bounce {
            let elapsed = now.saturating_duration_since(bounce.started);
            for (index, site_id) in bounce.site_ids.iter().enumerate() {
                if bounce.finished[index] {
                    continue;
                }
                let Some(local) = elapsed.checked_sub(bounce.stagger * index as u32) else {
                    // not started yet
                    continue;
                };
                if local >= bounce.duration {
                    bounce.finished[index] = true;
                    bounce.completed += 1;
                    frames.push(MarkerFrame::new(site_id, 1.0, 0.0));
                    continue;
                }
                let progress = local.as_secs_f64() / bounce.duration.as_secs_f64();
                let offset = bounce_offset(
                    progress,
                    self.config.peak_offset,
                    self.config.decay,
                    self.config.frequency,
                );
                frames.push(MarkerFrame::new(site_id, 1.0, offset));
            }
            if bounce.completed == bounce.site_ids.len() {
                self.bounce_completed = bounce.completed;
                self.bounce = None;
            }
        }

        if !self.is_active() {
            self.clock.stop();
        }
        frames
    }

    /// Drops both animations and stops the clock immediately
    pub fn cancel(&mut self) {
        if let Some(bounce) = self.bounce.take() {
            self.bounce_completed = bounce.completed;
        }
        self.selection = None;
        self.clock.stop();
    }
}
