//! Runtime abstraction layer for deferred and background work
//!
//! The core never blocks and never spawns threads of its own. Everything
//! that has to happen later (a probe request, a retry after a delay, a frame
//! tick) goes through a [`Scheduler`], and the work it schedules only ever
//! posts a task back onto the UI queue. Two implementations ship:
//! [`TokioScheduler`] for real use and [`ManualScheduler`], which runs on a
//! virtual clock for deterministic tests and headless replays.

use crate::prelude::{Future, Pin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One-shot deferred job
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Repeating job
pub type RepeatingJob = Arc<dyn Fn() + Send + Sync + 'static>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to scheduled or spawned work
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task. A cancelled job never runs afterwards.
    fn cancel(&self);
}

/// Spawner with timers: everything the core defers goes through this
pub trait Scheduler: AsyncSpawner {
    /// Runs `job` once after `delay`
    fn post_after(&self, delay: Duration, job: Job) -> Box<dyn AsyncHandle>;

    /// Runs `job` every `period` until the handle is cancelled
    fn repeat(&self, period: Duration, job: RepeatingJob) -> Box<dyn AsyncHandle>;
}

#[cfg(feature = "tokio-runtime")]
mod tokio_impl {
    use super::*;
    use ::tokio::runtime::Handle;
    use ::tokio::task::JoinHandle;
    use ::tokio::time::MissedTickBehavior;

    /// Tokio-based scheduler
    #[derive(Clone)]
    pub struct TokioScheduler {
        handle: Handle,
    }

    impl TokioScheduler {
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Scheduler bound to the runtime of the calling task.
        ///
        /// Returns `None` outside a tokio runtime.
        pub fn current() -> Option<Self> {
            Handle::try_current().ok().map(Self::new)
        }
    }

    impl AsyncSpawner for TokioScheduler {
        fn spawn_boxed(
            &self,
            future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
        ) -> Box<dyn AsyncHandle> {
            Box::new(TokioHandle(self.handle.spawn(future)))
        }
    }

    impl Scheduler for TokioScheduler {
        fn post_after(&self, delay: Duration, job: Job) -> Box<dyn AsyncHandle> {
            let handle = self.handle.spawn(async move {
                ::tokio::time::sleep(delay).await;
                job();
            });
            Box::new(TokioHandle(handle))
        }

        fn repeat(&self, period: Duration, job: RepeatingJob) -> Box<dyn AsyncHandle> {
            let handle = self.handle.spawn(async move {
                let mut interval = ::tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first tick completes immediately.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    job();
                }
            });
            Box::new(TokioHandle(handle))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }
}

#[cfg(feature = "tokio-runtime")]
pub use tokio_impl::TokioScheduler;

#[derive(Debug, Clone, Default)]
struct ManualHandle {
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl AsyncHandle for ManualHandle {
    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst) || self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

struct ManualTimer {
    due: Duration,
    delay: Duration,
    job: Option<Job>,
    handle: ManualHandle,
}

struct ManualTicker {
    next_due: Duration,
    period: Duration,
    job: RepeatingJob,
    handle: ManualHandle,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    timers: Vec<ManualTimer>,
    tickers: Vec<ManualTicker>,
}

enum DueWork {
    Timer(Job, ManualHandle),
    Tick(RepeatingJob),
}

/// Deterministic scheduler on a virtual clock.
///
/// Spawned futures are driven to completion on the spot with
/// `futures::executor::block_on`, so they must not wait on a real reactor.
/// Delayed and repeating jobs run only when [`advance`](Self::advance) moves
/// the virtual clock past their due time.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Delays of one-shot jobs that are still waiting to run
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.lock()
            .timers
            .iter()
            .filter(|t| t.job.is_some() && !t.handle.is_finished())
            .map(|t| t.delay)
            .collect()
    }

    /// Number of repeating jobs that have not been cancelled
    pub fn active_tickers(&self) -> usize {
        self.lock()
            .tickers
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    /// Moves the virtual clock forward, running every job that falls due in
    /// due-time order. Jobs run without the internal lock held, so they may
    /// schedule more work.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(work) = self.next_due(target) {
            match work {
                DueWork::Timer(job, handle) => {
                    job();
                    handle.finished.store(true, Ordering::SeqCst);
                }
                DueWork::Tick(job) => job(),
            }
        }
        let mut state = self.lock();
        state.now = target;
        state.timers.retain(|t| t.job.is_some() && !t.handle.is_finished());
        state.tickers.retain(|t| !t.handle.is_finished());
    }

    fn next_due(&self, target: Duration) -> Option<DueWork> {
        let mut state = self.lock();

        let timer = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.job.is_some() && !t.handle.is_finished() && t.due <= target)
            .min_by_key(|(_, t)| t.due)
            .map(|(i, t)| (i, t.due));
        let ticker = state
            .tickers
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.handle.is_finished() && t.next_due <= target)
            .min_by_key(|(_, t)| t.next_due)
            .map(|(i, t)| (i, t.next_due));

        match (timer, ticker) {
            (Some((i, due)), Some((_, tick_due))) if due <= tick_due => {
                Self::take_timer(&mut state, i, due)
            }
            (Some((i, due)), None) => Self::take_timer(&mut state, i, due),
            (_, Some((i, due))) => {
                state.now = due;
                let ticker = &mut state.tickers[i];
                ticker.next_due = due + ticker.period;
                Some(DueWork::Tick(ticker.job.clone()))
            }
            (None, None) => None,
        }
    }

    fn take_timer(state: &mut ManualState, index: usize, due: Duration) -> Option<DueWork> {
        state.now = due;
        let timer = &mut state.timers[index];
        let handle = timer.handle.clone();
        timer.job.take().map(|job| DueWork::Timer(job, handle))
    }
}

impl AsyncSpawner for ManualScheduler {
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle> {
        futures::executor::block_on(future);
        let handle = ManualHandle::default();
        handle.finished.store(true, Ordering::SeqCst);
        Box::new(handle)
    }
}

impl Scheduler for ManualScheduler {
    fn post_after(&self, delay: Duration, job: Job) -> Box<dyn AsyncHandle> {
        let handle = ManualHandle::default();
        let mut state = self.lock();
        let due = state.now + delay;
        state.timers.push(ManualTimer {
            due,
            delay,
            job: Some(job),
            handle: handle.clone(),
        });
        Box::new(handle)
    }

    fn repeat(&self, period: Duration, job: RepeatingJob) -> Box<dyn AsyncHandle> {
        let handle = ManualHandle::default();
        let mut state = self.lock();
        let next_due = state.now + period.max(Duration::from_nanos(1));
        state.tickers.push(ManualTicker {
            next_due,
            period: period.max(Duration::from_nanos(1)),
            job,
            handle: handle.clone(),
        });
        Box::new(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_manual_post_after_runs_when_due() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        scheduler.post_after(
            Duration::from_secs(12),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(scheduler.pending_delays(), vec![Duration::from_secs(12)]);
        scheduler.advance(Duration::from_secs(11));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(scheduler.pending_delays().is_empty());
    }

    #[test]
    fn test_manual_cancelled_job_never_runs() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = scheduler.post_after(
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_manual_repeat_until_cancelled() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = scheduler.repeat(
            Duration::from_millis(10),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scheduler.advance(Duration::from_millis(35));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_tickers(), 1);

        handle.cancel();
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_tickers(), 0);
    }

    #[test]
    fn test_manual_spawn_runs_immediately() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = scheduler.spawn_boxed(Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(handle.is_finished());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_post_after() {
        let scheduler = TokioScheduler::current().expect("inside a tokio runtime");
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = scheduler.post_after(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        assert!(!handle.is_finished());
        ::tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_ok());
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_repeat_cancel() {
        let scheduler = TokioScheduler::current().expect("inside a tokio runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = scheduler.repeat(
            Duration::from_millis(5),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        ::tokio::time::sleep(Duration::from_millis(40)).await;
        handle.cancel();
        ::tokio::time::sleep(Duration::from_millis(5)).await;
        let seen = hits.load(Ordering::SeqCst);
        assert!(seen >= 1);
        ::tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(hits.load(Ordering::SeqCst), seen);
    }
}
