//! Session countdown and the periodic tick producers that drive it.
//!
//! [`SessionClock`] is pure state: one call to [`SessionClock::tick`] is one
//! second. Real timers feed it through a [`SecondTicker`], which turns elapsed
//! milliseconds into whole ticks and goes quiet once its [`CancelToken`] fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::CLOCK_TICK_MS;

/// What a single tick asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The batch countdown reached zero (and has already been reset).
    pub batch_due: bool,
    /// The session countdown reached zero.
    pub expired: bool,
}

/// Session countdown plus the per-batch countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    duration: u32,
    remaining: u32,
    batch_interval: u32,
    batch_remaining: u32,
}

impl SessionClock {
    pub fn new(duration_secs: u32, batch_interval_secs: u32) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            batch_interval: batch_interval_secs,
            batch_remaining: batch_interval_secs,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Seconds left in the session.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds until the next batch fires.
    pub fn batch_remaining(&self) -> u32 {
        self.batch_remaining
    }

    pub fn batch_interval(&self) -> u32 {
        self.batch_interval
    }

    pub fn elapsed(&self) -> u32 {
        self.duration - self.remaining
    }

    /// Advance one second.
    ///
    /// Both countdowns floor at zero. The batch countdown resets to the
    /// interval every time it hits zero, whether or not anything is left to
    /// release.
    pub fn tick(&mut self) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(1);
        self.batch_remaining = self.batch_remaining.saturating_sub(1);

        let batch_due = self.batch_remaining == 0;
        if batch_due {
            self.batch_remaining = self.batch_interval;
        }

        TickOutcome {
            batch_due,
            expired: self.remaining == 0,
        }
    }

    /// Fraction of the current batch interval that has elapsed, in `[0, 1]`.
    pub fn batch_progress(&self) -> f32 {
        if self.batch_interval == 0 {
            return 1.0;
        }
        let left = self.batch_remaining.min(self.batch_interval) as f32;
        1.0 - left / self.batch_interval as f32
    }
}

/// Shared cancellation flag for a periodic producer.
///
/// Clones observe the same flag. Cancellation is permanent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Converts elapsed wall-clock milliseconds into whole clock ticks.
#[derive(Debug, Clone)]
pub struct SecondTicker {
    period_ms: u32,
    accumulated_ms: u32,
    token: CancelToken,
}

impl SecondTicker {
    /// A 1 Hz ticker bound to `token`.
    pub fn new(token: CancelToken) -> Self {
        Self::with_period(CLOCK_TICK_MS, token)
    }

    pub fn with_period(period_ms: u32, token: CancelToken) -> Self {
        Self {
            period_ms: period_ms.max(1),
            accumulated_ms: 0,
            token,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Feed `elapsed_ms` and return how many whole ticks are now due.
    ///
    /// Returns 0 forever once the token is cancelled.
    pub fn advance(&mut self, elapsed_ms: u32) -> u32 {
        if self.token.is_cancelled() {
            self.accumulated_ms = 0;
            return 0;
        }
        self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed_ms);
        let ticks = self.accumulated_ms / self.period_ms;
        self.accumulated_ms %= self.period_ms;
        ticks
    }

    /// Milliseconds until the next tick is due.
    pub fn until_next_ms(&self) -> u32 {
        self.period_ms - self.accumulated_ms
    }
}
