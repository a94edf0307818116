//! Shared widget handle for timer-driven mutation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use crate::scheduler::TimerError;

use super::ProgressBar;

/// Clonable handle to a [`ProgressBar`] shared with timer callbacks.
///
/// Scheduled ticks hold only a [`Weak`] reference to the widget, so an
/// outstanding timer never keeps it alive: once every handle is dropped
/// the widget's own `Drop` cancels the timer, and a tick already in
/// flight upgrades to nothing and returns.
#[derive(Clone)]
pub struct SharedProgressBar {
    inner: Arc<Mutex<ProgressBar>>,
}

impl SharedProgressBar {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bar)),
        }
    }

    /// Lock the underlying widget
    pub fn lock(&self) -> MutexGuard<'_, ProgressBar> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Weak reference for custom tick callbacks
    pub fn downgrade(&self) -> Weak<Mutex<ProgressBar>> {
        Arc::downgrade(&self.inner)
    }

    /// Advance the bar by `step` once per `interval`, stopping the timer
    /// when the bar is full.
    pub fn start_auto_fill(&self, interval: Duration, step: f32) -> Result<(), TimerError> {
        let weak = self.downgrade();
        self.lock().start_auto_progress(interval, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut bar = inner.lock().unwrap_or_else(PoisonError::into_inner);
            let next = bar.fraction() + step;
            bar.set_fraction(next);
            if bar.fraction() >= 1.0 {
                bar.stop_auto_progress();
            }
        })
    }

    /// Cancel any running timer
    pub fn stop(&self) {
        self.lock().stop_auto_progress();
    }
}
