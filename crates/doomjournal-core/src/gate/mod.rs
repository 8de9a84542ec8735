//! Navigation gatekeeping.
//!
//! Decides whether a navigation to a blocked domain may proceed, and builds
//! the redirect to the journaling page when it may not.

mod gatekeeper;
mod watcher;

pub use gatekeeper::{
    AllowReason, Gatekeeper, NavigationDecision, NavigationDetails, NavigationObserver,
};
pub use watcher::{PassWatcher, INITIAL_CHECK_DELAY_MS, PASS_CHECK_INTERVAL_MS};

use url::Url;

use crate::store::{PassState, Settings};

/// Domains gated behind a journaling session. Subdomains are included.
pub const BLOCKED_DOMAINS: [&str; 2] = ["twitter.com", "x.com"];

/// True iff the URL's host is a blocked domain or a subdomain of one.
///
/// Unparseable URLs and URLs without a host are never blocked.
pub fn should_block(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    is_blocked_host(host)
}

/// Host check behind [`should_block`]. Host must already be lowercase, as
/// `url` normalizes it.
pub fn is_blocked_host(host: &str) -> bool {
    BLOCKED_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// True when blocking is disabled or an unexpired pass exists.
///
/// A pass is valid strictly before its expiry: `now == expires_at` is blocked.
pub fn has_valid_pass(settings: &Settings, pass: &PassState, now_ms: i64) -> bool {
    if !settings.enabled {
        return true;
    }
    pass.pass_expires_at.is_some_and(|expires_at| now_ms < expires_at)
}

/// `blocked_page?returnUrl=<percent-encoded original>`.
pub fn blocked_page_url(blocked_page: &str, original_url: &str) -> String {
    format!(
        "{blocked_page}?returnUrl={}",
        urlencoding::encode(original_url)
    )
}
