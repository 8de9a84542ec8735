use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{blocked_page_url, has_valid_pass, should_block};
use crate::store::{KeyValueStore, PassStore};

/// A navigation the host is about to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDetails {
    pub url: String,
    /// `0` is the top-level frame.
    pub frame_id: u32,
    pub tab_id: u32,
}

impl NavigationDetails {
    pub fn main_frame(url: impl Into<String>, tab_id: u32) -> Self {
        Self {
            url: url.into(),
            frame_id: 0,
            tab_id,
        }
    }
}

/// Why a navigation was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    SubFrame,
    NotBlocked,
    Disabled,
    ValidPass,
    /// Settings could not be read; the gate fails open.
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    Allow { reason: AllowReason },
    Redirect { tab_id: u32, target: String },
}

impl NavigationDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, NavigationDecision::Redirect { .. })
    }
}

/// Host hook that carries out redirects decided by the gate.
pub trait NavigationObserver {
    fn redirect(&mut self, tab_id: u32, target: &str);
}

/// Intercepts top-level navigations to blocked domains.
#[derive(Debug, Clone)]
pub struct Gatekeeper<S> {
    store: PassStore<S>,
    blocked_page: String,
}

impl<S: KeyValueStore> Gatekeeper<S> {
    pub fn new(store: PassStore<S>, blocked_page: impl Into<String>) -> Self {
        Self {
            store,
            blocked_page: blocked_page.into(),
        }
    }

    pub fn store(&self) -> &PassStore<S> {
        &self.store
    }

    pub fn blocked_page(&self) -> &str {
        &self.blocked_page
    }

    /// Decide without side effects.
    pub fn evaluate(&self, details: &NavigationDetails, now_ms: i64) -> NavigationDecision {
        if details.frame_id != 0 {
            return NavigationDecision::Allow {
                reason: AllowReason::SubFrame,
            };
        }
        if !should_block(&details.url) {
            return NavigationDecision::Allow {
                reason: AllowReason::NotBlocked,
            };
        }

        let state = self
            .store
            .settings()
            .and_then(|settings| Ok((settings, self.store.pass_state()?)));
        let (settings, pass) = match state {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, url = %details.url, "pass lookup failed; allowing navigation");
                return NavigationDecision::Allow {
                    reason: AllowReason::StoreUnavailable,
                };
            }
        };

        if has_valid_pass(&settings, &pass, now_ms) {
            let reason = if settings.enabled {
                AllowReason::ValidPass
            } else {
                AllowReason::Disabled
            };
            return NavigationDecision::Allow { reason };
        }

        NavigationDecision::Redirect {
            tab_id: details.tab_id,
            target: blocked_page_url(&self.blocked_page, &details.url),
        }
    }

    /// Evaluate a navigation and, when blocked, tell the host to redirect.
    pub fn on_before_navigate(
        &self,
        details: &NavigationDetails,
        now_ms: i64,
        observer: &mut dyn NavigationObserver,
    ) -> NavigationDecision {
        let decision = self.evaluate(details, now_ms);
        match &decision {
            NavigationDecision::Redirect { tab_id, target } => {
                info!(tab_id, url = %details.url, "blocked navigation; redirecting to journal");
                observer.redirect(*tab_id, target);
            }
            NavigationDecision::Allow { reason } => {
                debug!(?reason, url = %details.url, "navigation allowed");
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct RecordingObserver {
        redirects: Vec<(u32, String)>,
    }

    impl NavigationObserver for RecordingObserver {
        fn redirect(&mut self, tab_id: u32, target: &str) {
            self.redirects.push((tab_id, target.to_string()));
        }
    }

    fn gatekeeper() -> (Gatekeeper<MemoryStore>, MemoryStore) {
        let kv = MemoryStore::new();
        let store = PassStore::new(kv.clone());
        store.install_defaults().unwrap();
        (Gatekeeper::new(store, "ext://blocked.html"), kv)
    }

    #[test]
    fn redirects_blocked_main_frame_without_pass() {
        let (gate, _) = gatekeeper();
        let mut observer = RecordingObserver::default();
        let decision =
            gate.on_before_navigate(
                &NavigationDetails::main_frame("https://x.com/home", 7),
                0,
                &mut observer,
            );
        assert!(decision.is_redirect());
        assert_eq!(
            observer.redirects,
            vec![(7, "ext://blocked.html?returnUrl=https%3A%2F%2Fx.com%2Fhome".to_string())]
        );
    }

    #[test]
    fn ignores_sub_frames() {
        let (gate, _) = gatekeeper();
        let mut observer = RecordingObserver::default();
        let details = NavigationDetails {
            url: "https://x.com/embed".into(),
            frame_id: 3,
            tab_id: 1,
        };
        let decision = gate.on_before_navigate(&details, 0, &mut observer);
        assert_eq!(
            decision,
            NavigationDecision::Allow {
                reason: AllowReason::SubFrame
            }
        );
        assert!(observer.redirects.is_empty());
    }

    #[test]
    fn allows_unblocked_hosts() {
        let (gate, _) = gatekeeper();
        let decision = gate.evaluate(&NavigationDetails::main_frame("https://example.com", 1), 0);
        assert_eq!(
            decision,
            NavigationDecision::Allow {
                reason: AllowReason::NotBlocked
            }
        );
    }

    #[test]
    fn pass_lets_navigation_through_until_expiry() {
        let (gate, _) = gatekeeper();
        let done = gate
            .store()
            .complete_entry(None, "words", 60, 1_000)
            .unwrap();
        let details = NavigationDetails::main_frame("https://twitter.com", 1);
        assert_eq!(
            gate.evaluate(&details, done.pass_expires_at - 1),
            NavigationDecision::Allow {
                reason: AllowReason::ValidPass
            }
        );
        assert!(gate.evaluate(&details, done.pass_expires_at).is_redirect());
    }

    #[test]
    fn disabled_never_blocks() {
        let (gate, _) = gatekeeper();
        gate.store().set_enabled(false).unwrap();
        assert_eq!(
            gate.evaluate(&NavigationDetails::main_frame("https://x.com", 1), 0),
            NavigationDecision::Allow {
                reason: AllowReason::Disabled
            }
        );
    }
}
