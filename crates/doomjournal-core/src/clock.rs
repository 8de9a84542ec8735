//! Wall-clock sources.
//!
//! Everything in the core takes `now` as epoch milliseconds; a [`Clock`] is
//! only needed by code that drives timers in real time.

use chrono::{DateTime, Utc};

pub trait Clock {
    /// Current time, epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that follows tokio's time source, so paused test runtimes can
/// auto-advance it.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    base_ms: i64,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base_ms: i64) -> Self {
        Self {
            base_ms,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        let elapsed = tokio::time::Instant::now().duration_since(self.started);
        self.base_ms + elapsed.as_millis() as i64
    }
}

/// Epoch milliseconds as a UTC timestamp; out-of-range values clamp to the epoch.
pub fn to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
