//! Deterministic timer handles.
//!
//! A handle has no thread behind it. It only records when its callback is
//! next due; the owner compares that against the wall clock and fires the
//! callback itself. Dropping or clearing a handle cancels the timer.

/// A periodic (or one-shot) timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    period_ms: i64,
    next_due_ms: i64,
    repeating: bool,
}

impl TimerHandle {
    /// Fires every `period_ms`, first at `armed_at + period_ms`.
    pub fn every(period_ms: i64, armed_at: i64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: armed_at + period_ms.max(1),
            repeating: true,
        }
    }

    /// Fires once, `delay_ms` after `armed_at`.
    pub fn once(delay_ms: i64, armed_at: i64) -> Self {
        Self {
            period_ms: delay_ms.max(0),
            next_due_ms: armed_at + delay_ms.max(0),
            repeating: false,
        }
    }

    pub fn next_due(&self) -> i64 {
        self.next_due_ms
    }

    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_due_ms <= now
    }

    /// Consume one firing. Returns the scheduled time of the firing and
    /// whether the handle stays armed.
    pub fn fire(&mut self) -> (i64, bool) {
        let at = self.next_due_ms;
        self.next_due_ms += self.period_ms;
        (at, self.repeating)
    }
}
