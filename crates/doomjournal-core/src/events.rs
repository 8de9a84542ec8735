use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every session state change produces an Event.
/// The host renders them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WritingStarted {
        duration_secs: u64,
        continuing_entry_id: Option<String>,
        at: DateTime<Utc>,
    },
    /// No activity for the inactivity threshold; the countdown is frozen.
    Paused {
        nudge: String,
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    Completed {
        message: String,
        /// `None` when the entry could not be persisted.
        entry_id: Option<String>,
        word_count: usize,
        pass_expires_at: Option<i64>,
        redirect_in_secs: u32,
        at: DateTime<Utc>,
    },
    RedirectCountdown {
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    Redirecting {
        url: String,
        at: DateTime<Utc>,
    },
}
