//! Periodic revalidation timers.
//!
//! Arming a timer hands back a [`Disposer`]; disposing it (explicitly or by
//! dropping it) stops future ticks. Work already started by a tick is left to
//! finish on its own.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period a timer runs at. A zero interval is raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Releases an armed timer.
///
/// Disposing is idempotent and also happens on drop.
#[derive(Debug, Default)]
pub struct Disposer {
    handle: Option<JoinHandle<()>>,
}

impl Disposer {
    /// A disposer that owns nothing.
    pub fn noop() -> Self {
        Disposer { handle: None }
    }

    /// Whether this disposer still holds a running timer.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the timer. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Start a repeating timer calling `tick` every `interval`.
///
/// The first call happens one period after arming. `None` arms nothing and
/// returns an inert disposer.
///
/// # Panics
/// Panics if called outside of a Tokio runtime while `interval` is `Some`.
pub fn arm<F>(interval: Option<Duration>, tick: F) -> Disposer
where
    F: Fn() + Send + 'static,
{
    let Some(period) = interval else {
        return Disposer::noop();
    };
    let period = period.max(MIN_INTERVAL);

    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            tick();
        }
    });

    Disposer {
        handle: Some(handle),
    }
}

/// Owns the revalidation timer of one resource and re-arms it when the
/// configured interval changes.
#[derive(Debug, Default)]
pub struct RevalidationScheduler {
    seconds: Option<f64>,
    applied: bool,
    disposer: Disposer,
}

impl RevalidationScheduler {
    /// A scheduler with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently configured interval in seconds.
    pub fn seconds(&self) -> Option<f64> {
        self.seconds
    }

    pub fn is_armed(&self) -> bool {
        self.disposer.is_active()
    }

    /// Apply a revalidate setting.
    ///
    /// Returns `false` without touching the timer if `seconds` equals the
    /// current setting. Otherwise the old timer is disposed before the new one
    /// (if any) is armed.
    pub fn rearm<F>(&mut self, seconds: Option<f64>, tick: F) -> bool
    where
        F: Fn() + Send + 'static,
    {
        if self.applied && same_setting(self.seconds, seconds) {
            return false;
        }

        self.disposer.dispose();
        self.seconds = seconds;
        self.applied = true;

        let interval = crate::options::revalidate_interval(seconds);
        match interval {
            Some(interval) => {
                tracing::debug!(?seconds, ?interval, "revalidation scheduler armed")
            }
            None => tracing::debug!(?seconds, "revalidation scheduler disarmed"),
        }
        self.disposer = arm(interval, tick);
        true
    }

    /// Stop the current timer, if any.
    pub fn cancel(&mut self) {
        self.disposer.dispose();
    }
}

fn same_setting(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
        _ => false,
    }
}
