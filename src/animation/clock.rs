use crate::core::queue::{UiSender, UiTask};
use crate::prelude::{Arc, Duration};
use crate::runtime::{AsyncHandle, Scheduler};

/// Fixed-rate tick source for animations. Ticks arrive as
/// [`UiTask::Frame`] on the UI queue.
pub trait FrameClock: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Frame clock built on [`Scheduler::repeat`]
pub struct ScheduledFrameClock {
    scheduler: Arc<dyn Scheduler>,
    sender: UiSender,
    interval: Duration,
    ticker: Option<Box<dyn AsyncHandle>>,
}

impl ScheduledFrameClock {
    pub fn new(scheduler: Arc<dyn Scheduler>, sender: UiSender, interval: Duration) -> Self {
        Self {
            scheduler,
            sender,
            interval,
            ticker: None,
        }
    }
}

impl FrameClock for ScheduledFrameClock {
    fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let sender = self.sender.clone();
        log::trace!("frame clock started at {:?}", self.interval);
        self.ticker = Some(self.scheduler.repeat(
            self.interval,
            Arc::new(move || {
                sender.post(UiTask::Frame);
            }),
        ));
    }

    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            log::trace!("frame clock stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.ticker.is_some()
    }
}

impl Drop for ScheduledFrameClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue::UiQueue;
    use crate::runtime::ManualScheduler;

    #[test]
    fn test_clock_posts_frames_until_stopped() {
        let scheduler = Arc::new(ManualScheduler::new());
        let queue = UiQueue::new();
        let mut clock = ScheduledFrameClock::new(
            scheduler.clone(),
            queue.sender(),
            Duration::from_millis(16),
        );

        clock.start();
        clock.start();
        assert!(clock.is_running());
        assert_eq!(scheduler.active_tickers(), 1);

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(queue.len(), 3);

        clock.stop();
        assert!(!clock.is_running());
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(queue.len(), 3);
        assert_eq!(scheduler.active_tickers(), 0);
    }
}
