use doomjournal_core::gate::{blocked_page_url, is_blocked_host, BLOCKED_DOMAINS};
use doomjournal_core::session::return_url_from_page;
use doomjournal_core::{
    has_valid_pass, should_block, MemoryStore, PassState, PassStore, PassWatcher, Settings,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn subdomains_of_blocked_domains_are_blocked(
        label in "[a-z][a-z0-9]{0,10}",
        domain in prop::sample::select(BLOCKED_DOMAINS.to_vec()),
    ) {
        let sub = format!("https://{label}.{domain}/path");
        prop_assert!(should_block(&sub));
        let bare = format!("https://{domain}");
        prop_assert!(should_block(&bare));
    }

    #[test]
    fn glued_prefixes_are_not_blocked(
        label in "[a-z0-9]{1,10}",
        domain in prop::sample::select(BLOCKED_DOMAINS.to_vec()),
    ) {
        let host = format!("{label}{domain}");
        prop_assert!(!is_blocked_host(&host));
    }

    #[test]
    fn unrelated_hosts_are_not_blocked(host in "[a-z]{1,12}\\.(org|net|io|dev)") {
        let url = format!("https://{host}/");
        prop_assert!(!should_block(&url));
    }

    #[test]
    fn disabled_settings_always_pass(
        expires in prop::option::of(any::<i64>()),
        now in any::<i64>(),
    ) {
        let settings = Settings { enabled: false, ..Settings::default() };
        let pass = PassState { pass_expires_at: expires };
        prop_assert!(has_valid_pass(&settings, &pass, now));
    }

    #[test]
    fn pass_valid_iff_before_expiry(
        expires in -1_000_000i64..1_000_000,
        now in -1_000_000i64..1_000_000,
    ) {
        let pass = PassState { pass_expires_at: Some(expires) };
        prop_assert_eq!(has_valid_pass(&Settings::default(), &pass, now), now < expires);
    }

    #[test]
    fn return_url_survives_redirect(path in "[a-zA-Z0-9/?=&%#._ -]{0,40}") {
        let original = format!("https://x.com/{path}");
        let target = blocked_page_url("chrome-extension://abc/blocked.html", &original);
        let recovered = return_url_from_page(&target, "https://twitter.com");
        prop_assert_eq!(recovered, original);
    }
}

#[test]
fn watcher_redirects_open_tab_when_pass_runs_out() {
    let kv = MemoryStore::new();
    let store = PassStore::new(kv.clone());
    let granted = store.complete_entry(None, "entry", 60, 0).unwrap();

    let mut watcher =
        PassWatcher::new(PassStore::new(kv), "ext://blocked.html", "https://x.com/home", 0);
    let mut redirected_at = None;
    while let Some(deadline) = watcher.next_deadline() {
        if watcher.advance_to(deadline).is_some() {
            redirected_at = Some(deadline);
            break;
        }
    }
    let redirected_at = redirected_at.expect("watcher should redirect");
    assert!(redirected_at >= granted.pass_expires_at);
    assert!(redirected_at < granted.pass_expires_at + 30_000);
    assert!(!watcher.is_active());
}
