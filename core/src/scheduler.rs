//! Repeating-timer scheduling
//!
//! The widget never talks to a concrete runtime. It is handed a
//! [`Scheduler`] at construction and keeps at most one [`TimerHandle`]
//! alive. [`TokioScheduler`] drives callbacks from a tokio runtime;
//! [`ManualScheduler`] advances simulated time by hand so tests stay
//! deterministic.
//!
//! Cancellation is token-based: every implementation checks a shared
//! atomic flag immediately before invoking the callback, so no tick fires
//! once `cancel` has returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::MissedTickBehavior;

/// Callback invoked once per elapsed interval
pub type TickFn = Box<dyn FnMut() + Send>;

/// Errors when starting a repeating timer
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("repeating timer interval must be non-zero")]
    ZeroInterval,
}

/// Capability to run a callback at a fixed cadence
pub trait Scheduler: Send + Sync {
    /// Begin invoking `tick` once per `interval` until the returned handle
    /// is cancelled. The first invocation happens one full interval after
    /// scheduling, never immediately.
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> Box<dyn TimerHandle>;
}

/// Handle to an active repeating timer
pub trait TimerHandle: Send {
    /// Stop the timer. No tick fires after this returns.
    fn cancel(&mut self);

    /// Whether the timer is still scheduled
    fn is_active(&self) -> bool;
}

/// Shared cancellation flag checked before each invocation
#[derive(Clone, Default)]
struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokio scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Schedules ticks as a task on a tokio runtime
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Schedule onto the given runtime
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Schedule onto the ambient runtime, if one is running
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, mut tick: TickFn) -> Box<dyn TimerHandle> {
        let interval = sanitize_interval(interval);
        let token = CancelToken::default();
        let tick_token = token.clone();

        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick completes immediately; consume it so
            // the first callback lands one full interval out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tick_token.is_cancelled() {
                    break;
                }
                tick();
            }
        });

        Box::new(TokioTimerHandle { token, task })
    }
}

struct TokioTimerHandle {
    token: CancelToken,
    task: tokio::task::JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.token.cancel();
        self.task.abort();
    }

    fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic scheduler driven by explicit [`advance`](Self::advance)
/// calls. Intended for tests; no real time is involved.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    tasks: Vec<ManualTask>,
}

struct ManualTask {
    next_due: Duration,
    interval: Duration,
    tick: TickFn,
    token: CancelToken,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current simulated time
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of scheduled, uncancelled timers
    pub fn active_timers(&self) -> usize {
        let mut inner = self.lock();
        inner.tasks.retain(|task| !task.token.is_cancelled());
        inner.tasks.len()
    }

    /// Advance simulated time, firing every due tick in time order.
    ///
    /// The scheduler lock is released around each callback, so ticks may
    /// re-enter the scheduler (start, stop or replace timers).
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        loop {
            let mut inner = self.lock();
            inner.tasks.retain(|task| !task.token.is_cancelled());

            let due = inner
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, task)| task.next_due <= target)
                .min_by_key(|(_, task)| task.next_due)
                .map(|(index, _)| index);

            let Some(index) = due else {
                inner.now = target;
                return;
            };

            let mut task = inner.tasks.swap_remove(index);
            inner.now = inner.now.max(task.next_due);
            drop(inner);

            if !task.token.is_cancelled() {
                (task.tick)();
            }
            task.next_due += task.interval;
            if !task.token.is_cancelled() {
                self.lock().tasks.push(task);
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> Box<dyn TimerHandle> {
        let interval = sanitize_interval(interval);
        let token = CancelToken::default();
        let mut inner = self.lock();
        let next_due = inner.now + interval;
        inner.tasks.push(ManualTask {
            next_due,
            interval,
            tick,
            token: token.clone(),
        });
        Box::new(ManualTimerHandle { token })
    }
}

struct ManualTimerHandle {
    token: CancelToken,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&mut self) {
        self.token.cancel();
    }

    fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for ManualTimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Widgets reject zero intervals before scheduling; this backstop keeps a
/// raw scheduler call from spinning (or panicking inside tokio).
fn sanitize_interval(interval: Duration) -> Duration {
    if interval.is_zero() {
        tracing::warn!("zero timer interval clamped to 1ms");
        Duration::from_millis(1)
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counting_tick(counter: &Arc<AtomicU32>) -> TickFn {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_fires_once_per_interval() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicU32::new(0));
        let _handle = scheduler.schedule_repeating(Duration::from_millis(10), counting_tick(&counter));

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.now(), Duration::from_millis(35));
    }

    #[test]
    fn test_manual_interleaves_multiple_timers() {
        let scheduler = ManualScheduler::new();
        let fast = Arc::new(AtomicU32::new(0));
        let slow = Arc::new(AtomicU32::new(0));
        let _fast = scheduler.schedule_repeating(Duration::from_millis(10), counting_tick(&fast));
        let _slow = scheduler.schedule_repeating(Duration::from_millis(15), counting_tick(&slow));

        scheduler.advance(Duration::from_millis(30));
        assert_eq!(fast.load(Ordering::SeqCst), 3);
        assert_eq!(slow.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_timers(), 2);
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicU32::new(0));
        let mut handle = scheduler.schedule_repeating(Duration::from_millis(10), counting_tick(&counter));

        scheduler.advance(Duration::from_millis(10));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_active());

        handle.cancel();
        assert!(!handle.is_active());
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicU32::new(0));
        drop(scheduler.schedule_repeating(Duration::from_millis(10), counting_tick(&counter)));

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[test]
    fn test_tick_may_reenter_scheduler() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicU32::new(0));

        let nested = counting_tick(&counter);
        let inner_scheduler = scheduler.clone();
        let nested_slot = Arc::new(Mutex::new(Some(nested)));
        let _handle = scheduler.schedule_repeating(
            Duration::from_millis(10),
            Box::new(move || {
                if let Some(tick) = nested_slot.lock().unwrap().take() {
                    // Keep the nested handle alive for the rest of the test
                    std::mem::forget(
                        inner_scheduler.schedule_repeating(Duration::from_millis(5), tick),
                    );
                }
            }),
        );

        // First tick at 10ms schedules the nested timer, due at 15ms
        scheduler.advance(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_and_cancels() {
        let scheduler = TokioScheduler::new(tokio::runtime::Handle::current());
        let counter = Arc::new(AtomicU32::new(0));
        let mut handle =
            scheduler.schedule_repeating(Duration::from_millis(100), counting_tick(&counter));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_first_tick_is_one_interval_out() {
        let scheduler = TokioScheduler::new(tokio::runtime::Handle::current());
        let counter = Arc::new(AtomicU32::new(0));
        let _handle =
            scheduler.schedule_repeating(Duration::from_millis(100), counting_tick(&counter));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
