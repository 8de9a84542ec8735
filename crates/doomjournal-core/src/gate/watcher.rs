//! Periodic pass check for a blocked page that is already open.
//!
//! A pass can expire while the user keeps a tab open. The watcher runs one
//! check shortly after the page loads and then one every 30 seconds; the first
//! failing check sends the page to the journal.

use tracing::{debug, info, warn};

use super::{blocked_page_url, has_valid_pass};
use crate::store::{KeyValueStore, PassStore};
use crate::timer::TimerHandle;

pub const INITIAL_CHECK_DELAY_MS: i64 = 2_000;
pub const PASS_CHECK_INTERVAL_MS: i64 = 30_000;

#[derive(Debug)]
pub struct PassWatcher<S> {
    store: PassStore<S>,
    blocked_page: String,
    page_url: String,
    initial: Option<TimerHandle>,
    interval: Option<TimerHandle>,
}

impl<S: KeyValueStore> PassWatcher<S> {
    /// Start watching a page that finished loading at `loaded_at`.
    pub fn new(
        store: PassStore<S>,
        blocked_page: impl Into<String>,
        page_url: impl Into<String>,
        loaded_at: i64,
    ) -> Self {
        Self {
            store,
            blocked_page: blocked_page.into(),
            page_url: page_url.into(),
            initial: Some(TimerHandle::once(INITIAL_CHECK_DELAY_MS, loaded_at)),
            interval: Some(TimerHandle::every(PASS_CHECK_INTERVAL_MS, loaded_at)),
        }
    }

    /// False once the watcher has redirected the page.
    pub fn is_active(&self) -> bool {
        self.initial.is_some() || self.interval.is_some()
    }

    pub fn next_deadline(&self) -> Option<i64> {
        [self.initial, self.interval]
            .into_iter()
            .flatten()
            .map(|t| t.next_due())
            .min()
    }

    /// One check against the store. Returns the redirect target when the
    /// page must leave. Store failures never redirect.
    pub fn check(&self, now_ms: i64) -> Option<String> {
        let state = self
            .store
            .settings()
            .and_then(|settings| Ok((settings, self.store.pass_state()?)));
        match state {
            Ok((settings, pass)) if !has_valid_pass(&settings, &pass, now_ms) => {
                Some(blocked_page_url(&self.blocked_page, &self.page_url))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "pass check skipped; store unavailable");
                None
            }
        }
    }

    /// Run every check due by `now`. On the first failure all timers are
    /// cancelled and the redirect target is returned.
    pub fn advance_to(&mut self, now_ms: i64) -> Option<String> {
        loop {
            let initial_due = self.initial.filter(|t| t.is_due(now_ms)).map(|t| t.next_due());
            let interval_due = self.interval.filter(|t| t.is_due(now_ms)).map(|t| t.next_due());

            let at = match (initial_due, interval_due) {
                (None, None) => return None,
                (Some(a), Some(b)) if b < a => self.fire_interval(),
                (Some(_), _) => {
                    let at = self.initial.take().map(|mut t| t.fire().0);
                    at.unwrap_or(now_ms)
                }
                (None, Some(_)) => self.fire_interval(),
            };

            debug!(at, page = %self.page_url, "checking pass");
            if let Some(target) = self.check(at) {
                info!(page = %self.page_url, "pass expired; leaving page");
                self.initial = None;
                self.interval = None;
                return Some(target);
            }
        }
    }

    fn fire_interval(&mut self) -> i64 {
        match self.interval.as_mut() {
            Some(t) => t.fire().0,
            None => 0,
        }
    }
}
