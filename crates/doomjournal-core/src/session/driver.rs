//! Real-time driver for a [`JournalSession`].
//!
//! Sleeps until the session's next timer is due, applies host input as it
//! arrives, and stops once the session redirects or the host goes away.

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use super::{JournalSession, MessagePicker, SessionState};
use crate::clock::Clock;
use crate::events::Event;
use crate::store::KeyValueStore;

/// Host input delivered to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// Duration picked on the selection screen, in seconds.
    SelectDuration(u64),
    /// Clear the pre-filled entry.
    NewEntry,
    /// Full replacement text of the journal.
    Content(String),
    Keydown,
}

/// How a driven session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    /// The session finished and the page should load `url`.
    Redirected(String),
    /// The input channel closed first; timers are dropped with the session.
    Abandoned(SessionState),
}

pub async fn run<S, P, C, F>(
    session: &mut JournalSession<S, P>,
    clock: &C,
    inputs: &mut mpsc::Receiver<SessionInput>,
    mut on_event: F,
) -> DriverOutcome
where
    S: KeyValueStore,
    P: MessagePicker,
    C: Clock,
    F: FnMut(&Event),
{
    loop {
        let now = clock.now_ms();
        for event in session.advance_to(now) {
            on_event(&event);
            if let Event::Redirecting { url, .. } = event {
                return DriverOutcome::Redirected(url);
            }
        }

        let deadline = session.next_deadline();
        let wait = Duration::from_millis(deadline.map_or(0, |d| (d - now).max(0)) as u64);

        tokio::select! {
            _ = sleep(wait), if deadline.is_some() => {}
            input = inputs.recv() => {
                let Some(input) = input else {
                    debug!(state = %session.state(), "input closed; abandoning session");
                    return DriverOutcome::Abandoned(session.state());
                };
                if let Some(event) = apply(session, input, clock.now_ms()) {
                    on_event(&event);
                }
            }
        }
    }
}

fn apply<S, P>(session: &mut JournalSession<S, P>, input: SessionInput, now: i64) -> Option<Event>
where
    S: KeyValueStore,
    P: MessagePicker,
{
    match input {
        SessionInput::SelectDuration(secs) => match session.select_duration(secs, now) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "ignoring duration selection");
                None
            }
        },
        SessionInput::NewEntry => {
            if let Err(e) = session.start_new_entry() {
                warn!(error = %e, "ignoring new entry request");
            }
            None
        }
        SessionInput::Content(text) => session.on_input(text, now),
        SessionInput::Keydown => session.on_keydown(now),
    }
}
