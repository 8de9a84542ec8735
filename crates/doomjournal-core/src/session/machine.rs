use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::messages::{MessagePicker, COMPLETE_MESSAGES, NUDGE_MESSAGES};
use super::SessionState;
use crate::clock::to_datetime;
use crate::entry::count_words;
use crate::error::SessionError;
use crate::events::Event;
use crate::store::{KeyValueStore, PassStore};
use crate::timer::TimerHandle;

pub const TICK_PERIOD_MS: i64 = 100;
pub const PAUSE_CHECK_PERIOD_MS: i64 = 500;
/// Time without keystrokes after which the countdown freezes.
pub const INACTIVITY_THRESHOLD_MS: i64 = 10_000;
pub const COUNTDOWN_PERIOD_MS: i64 = 1_000;
pub const REDIRECT_COUNTDOWN_SECS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Tick,
    PauseCheck,
    Countdown,
}

/// Timers owned by one session. Tick and pause check are only ever armed
/// and cancelled together.
#[derive(Debug, Clone, Default)]
struct SessionTimers {
    tick: Option<TimerHandle>,
    pause_check: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
}

impl SessionTimers {
    fn arm_writing(&mut self, now: i64) {
        self.tick = Some(TimerHandle::every(TICK_PERIOD_MS, now));
        self.pause_check = Some(TimerHandle::every(PAUSE_CHECK_PERIOD_MS, now));
        debug!(at = now, "writing timers armed");
    }

    fn cancel_writing(&mut self) {
        self.tick = None;
        self.pause_check = None;
        debug!("writing timers cancelled");
    }

    /// Earliest due timer; ties resolve in arming order.
    fn next(&self) -> Option<(TimerKind, i64)> {
        [
            (TimerKind::Tick, self.tick),
            (TimerKind::PauseCheck, self.pause_check),
            (TimerKind::Countdown, self.countdown),
        ]
        .into_iter()
        .filter_map(|(kind, handle)| handle.map(|h| (kind, h.next_due())))
        .min_by_key(|(_, due)| *due)
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Tick => &mut self.tick,
            TimerKind::PauseCheck => &mut self.pause_check,
            TimerKind::Countdown => &mut self.countdown,
        }
    }

    fn fire(&mut self, kind: TimerKind) -> Option<i64> {
        let slot = self.slot(kind);
        let (at, keep) = slot.as_mut()?.fire();
        if !keep {
            *slot = None;
        }
        Some(at)
    }
}

/// Serializable view of a session for hosts and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub selected_duration_secs: u64,
    pub remaining_ms: i64,
    pub word_count: usize,
    pub continuing_entry_id: Option<String>,
    pub nudge: Option<String>,
    pub redirect_in_secs: Option<u32>,
    pub return_url: String,
}

/// One journaling page.
///
/// Time only moves when the caller says so: input handlers take the
/// current time and [`advance_to`](Self::advance_to) fires due timers.
#[derive(Debug)]
pub struct JournalSession<S, P> {
    store: PassStore<S>,
    picker: P,
    state: SessionState,
    selected_duration_secs: u64,
    remaining_ms: i64,
    last_activity_ms: i64,
    content: String,
    continuing_entry_id: Option<String>,
    return_url: String,
    nudge: Option<String>,
    countdown: u32,
    timers: SessionTimers,
}

impl<S: KeyValueStore, P: MessagePicker> JournalSession<S, P> {
    /// Open a session, offering the most recent entry for continuation.
    ///
    /// A store that cannot be read yields a session that starts a new entry.
    pub fn load(store: PassStore<S>, picker: P, return_url: impl Into<String>) -> Self {
        let latest = store.latest_entry().unwrap_or_else(|e| {
            warn!(error = %e, "could not load previous entry; starting fresh");
            None
        });
        let (content, continuing_entry_id) = match latest {
            Some(entry) => (entry.content, Some(entry.id)),
            None => (String::new(), None),
        };

        Self {
            store,
            picker,
            state: SessionState::Selecting,
            selected_duration_secs: 0,
            remaining_ms: 0,
            last_activity_ms: 0,
            content,
            continuing_entry_id,
            return_url: return_url.into(),
            nudge: None,
            countdown: 0,
            timers: SessionTimers::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }

    pub fn continuing_entry_id(&self) -> Option<&str> {
        self.continuing_entry_id.as_deref()
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining_ms as f64 / 1000.0
    }

    pub fn selected_duration_secs(&self) -> u64 {
        self.selected_duration_secs
    }

    pub fn nudge(&self) -> Option<&str> {
        self.nudge.as_deref()
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    pub fn store(&self) -> &PassStore<S> {
        &self.store
    }

    /// When the next timer callback is due, if any timer is armed.
    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.next().map(|(_, due)| due)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            selected_duration_secs: self.selected_duration_secs,
            remaining_ms: self.remaining_ms,
            word_count: self.word_count(),
            continuing_entry_id: self.continuing_entry_id.clone(),
            nudge: self.nudge.clone(),
            redirect_in_secs: (self.state == SessionState::Completed).then_some(self.countdown),
            return_url: self.return_url.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Drop the pre-filled entry so the next completion creates a new one.
    pub fn start_new_entry(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Selecting {
            return Err(SessionError::InvalidTransition {
                action: "start a new entry",
                state: self.state,
            });
        }
        self.content.clear();
        self.continuing_entry_id = None;
        Ok(())
    }

    /// Begin writing for `duration_secs` seconds of active time.
    pub fn select_duration(&mut self, duration_secs: u64, now: i64) -> Result<Event, SessionError> {
        if self.state != SessionState::Selecting {
            return Err(SessionError::InvalidTransition {
                action: "select a duration",
                state: self.state,
            });
        }
        if duration_secs == 0 {
            return Err(SessionError::ZeroDuration);
        }
        let remaining_ms = i64::try_from(duration_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or(SessionError::DurationTooLong(duration_secs))?;

        self.selected_duration_secs = duration_secs;
        self.remaining_ms = remaining_ms;
        self.last_activity_ms = now;
        self.state = SessionState::Writing;
        self.timers.arm_writing(now);
        info!(duration_secs, continuing = self.continuing_entry_id.is_some(), "writing started");

        Ok(Event::WritingStarted {
            duration_secs,
            continuing_entry_id: self.continuing_entry_id.clone(),
            at: to_datetime(now),
        })
    }

    /// Text changed. Records activity and resumes a paused session.
    pub fn on_input(&mut self, content: impl Into<String>, now: i64) -> Option<Event> {
        if !self.accepts_input() {
            return None;
        }
        self.content = content.into();
        self.touch(now)
    }

    /// Key pressed. Records activity and resumes a paused session.
    pub fn on_keydown(&mut self, now: i64) -> Option<Event> {
        if !self.accepts_input() {
            return None;
        }
        self.touch(now)
    }

    /// Fire every timer callback due by `now`, in due order.
    pub fn advance_to(&mut self, now: i64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((kind, due)) = self.timers.next() {
            if due > now {
                break;
            }
            let Some(at) = self.timers.fire(kind) else {
                break;
            };
            match kind {
                TimerKind::Tick => self.on_tick(at, &mut events),
                TimerKind::PauseCheck => self.on_pause_check(at, &mut events),
                TimerKind::Countdown => self.on_countdown(at, &mut events),
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn accepts_input(&self) -> bool {
        !matches!(self.state, SessionState::Completed | SessionState::Redirecting)
    }

    fn touch(&mut self, now: i64) -> Option<Event> {
        self.last_activity_ms = now;
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = SessionState::Writing;
        self.nudge = None;
        debug!(remaining_ms = self.remaining_ms, "resumed");
        Some(Event::Resumed {
            remaining_ms: self.remaining_ms,
            at: to_datetime(now),
        })
    }

    fn inactive_for(&self, at: i64) -> i64 {
        at - self.last_activity_ms
    }

    fn on_tick(&mut self, at: i64, events: &mut Vec<Event>) {
        if self.state != SessionState::Writing || self.inactive_for(at) >= INACTIVITY_THRESHOLD_MS {
            return;
        }
        self.remaining_ms -= TICK_PERIOD_MS;
        if self.remaining_ms <= 0 {
            self.remaining_ms = 0;
            self.complete(at, events);
        }
    }

    fn on_pause_check(&mut self, at: i64, events: &mut Vec<Event>) {
        if self.state != SessionState::Writing || self.inactive_for(at) < INACTIVITY_THRESHOLD_MS {
            return;
        }
        self.state = SessionState::Paused;
        let nudge = self.picker.choose(&NUDGE_MESSAGES).to_string();
        self.nudge = Some(nudge.clone());
        debug!(remaining_ms = self.remaining_ms, "paused for inactivity");
        events.push(Event::Paused {
            nudge,
            remaining_ms: self.remaining_ms,
            at: to_datetime(at),
        });
    }

    fn complete(&mut self, at: i64, events: &mut Vec<Event>) {
        self.state = SessionState::Completed;
        self.timers.cancel_writing();
        self.nudge = None;

        let saved = match self.store.complete_entry(
            self.continuing_entry_id.as_deref(),
            &self.content,
            self.selected_duration_secs,
            at,
        ) {
            Ok(saved) => {
                self.continuing_entry_id = Some(saved.entry_id.clone());
                Some(saved)
            }
            Err(e) => {
                warn!(error = %e, "could not save entry; pass not granted");
                None
            }
        };

        let message = self.picker.choose(&COMPLETE_MESSAGES).to_string();
        self.countdown = REDIRECT_COUNTDOWN_SECS;
        self.timers.countdown = Some(TimerHandle::every(COUNTDOWN_PERIOD_MS, at));
        info!(
            entry_id = saved.as_ref().map(|s| s.entry_id.as_str()),
            pass_expires_at = saved.as_ref().map(|s| s.pass_expires_at),
            "session completed"
        );

        events.push(Event::Completed {
            message,
            word_count: saved
                .as_ref()
                .map(|s| s.word_count)
                .unwrap_or_else(|| count_words(&self.content)),
            entry_id: saved.as_ref().map(|s| s.entry_id.clone()),
            pass_expires_at: saved.map(|s| s.pass_expires_at),
            redirect_in_secs: self.countdown,
            at: to_datetime(at),
        });
    }

    fn on_countdown(&mut self, at: i64, events: &mut Vec<Event>) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            events.push(Event::RedirectCountdown {
                seconds_left: self.countdown,
                at: to_datetime(at),
            });
            return;
        }

        self.timers.countdown = None;
        self.state = SessionState::Redirecting;
        info!(url = %self.return_url, "redirecting");
        events.push(Event::Redirecting {
            url: self.return_url.clone(),
            at: to_datetime(at),
        });
    }
}
