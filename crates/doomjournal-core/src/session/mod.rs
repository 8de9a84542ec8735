//! Timed journaling session.
//!
//! ## State Transitions
//!
//! ```text
//! Selecting -> Writing <-> Paused
//!                 |
//!                 v
//!             Completed -> Redirecting
//! ```
//!
//! The session owns its timer handles and is driven by the caller through
//! [`JournalSession::advance_to`]; [`driver::run`] does that in real time.

pub mod driver;
mod machine;
mod messages;

pub use machine::{
    JournalSession, SessionSnapshot, COUNTDOWN_PERIOD_MS, INACTIVITY_THRESHOLD_MS,
    PAUSE_CHECK_PERIOD_MS, REDIRECT_COUNTDOWN_SECS, TICK_PERIOD_MS,
};
pub use messages::{FixedPicker, MessagePicker, RandomPicker, COMPLETE_MESSAGES, NUDGE_MESSAGES};

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where a finished session goes when the page carried no usable return URL.
pub const DEFAULT_RETURN_URL: &str = "https://twitter.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Waiting for a duration to be picked.
    Selecting,
    Writing,
    /// Inactive; the countdown is frozen until the next keystroke.
    Paused,
    Completed,
    Redirecting,
}

impl SessionState {
    /// True while the tick and pause-check timers are armed.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Writing | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Selecting => "selecting",
            SessionState::Writing => "writing",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
            SessionState::Redirecting => "redirecting",
        };
        f.write_str(s)
    }
}

/// Extract `returnUrl` from the journaling page's own URL.
///
/// Falls back to `fallback` when the page URL, the parameter, or the
/// decoded target is missing or not an absolute URL.
pub fn return_url_from_page(page_url: &str, fallback: &str) -> String {
    Url::parse(page_url)
        .ok()
        .and_then(|page| {
            page.query_pairs()
                .find(|(key, _)| key == "returnUrl")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|target| Url::parse(target).is_ok())
        .unwrap_or_else(|| fallback.to_string())
}

/// Split seconds into display minutes and zero-padded seconds.
pub fn format_clock(seconds: f64) -> (String, String) {
    let total = seconds.max(0.0).floor() as u64;
    (format!("{}", total / 60), format!("{:02}", total % 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_url_round_trips_through_blocked_page() {
        let original = "https://x.com/home?tab=following";
        let page = crate::gate::blocked_page_url("chrome-extension://id/blocked.html", original);
        assert_eq!(return_url_from_page(&page, DEFAULT_RETURN_URL), original);
    }

    #[test]
    fn missing_or_malformed_return_url_falls_back() {
        let fallback = DEFAULT_RETURN_URL;
        assert_eq!(return_url_from_page("chrome-extension://id/blocked.html", fallback), fallback);
        assert_eq!(
            return_url_from_page("chrome-extension://id/blocked.html?returnUrl=", fallback),
            fallback
        );
        assert_eq!(
            return_url_from_page(
                "chrome-extension://id/blocked.html?returnUrl=not%20a%20url",
                fallback
            ),
            fallback
        );
        assert_eq!(return_url_from_page("garbage", fallback), fallback);
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), ("0".into(), "00".into()));
        assert_eq!(format_clock(59.9), ("0".into(), "59".into()));
        assert_eq!(format_clock(600.0), ("10".into(), "00".into()));
        assert_eq!(format_clock(-3.0), ("0".into(), "00".into()));
    }

    #[test]
    fn state_display_is_lowercase() {
        assert_eq!(SessionState::Paused.to_string(), "paused");
        assert!(SessionState::Paused.is_active());
        assert!(!SessionState::Completed.is_active());
    }
}
