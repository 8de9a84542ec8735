use clap::Args;
use doomjournal_core::{
    Config, Gatekeeper, KeyValueStore, NavigationDetails, NavigationObserver, PassWatcher,
};
use serde_json::json;
use tokio::time::{sleep, Duration};

use super::{current_thread_runtime, now_ms, open_store, print_json, CommandResult};

#[derive(Args)]
pub struct CheckArgs {
    /// URL being navigated to
    pub url: String,
    /// Frame id; anything but 0 is a sub-frame
    #[arg(long, default_value_t = 0)]
    pub frame_id: u32,
    #[arg(long, default_value_t = 0)]
    pub tab_id: u32,
}

#[derive(Args)]
pub struct WatchArgs {
    /// URL of the page that is already open
    pub url: String,
    /// Keep checking on schedule until the page has to leave
    #[arg(long)]
    pub follow: bool,
}

/// Prints redirects to stderr the way a browser shell would perform them.
struct TabRedirector;

impl NavigationObserver for TabRedirector {
    fn redirect(&mut self, tab_id: u32, target: &str) {
        eprintln!("tab {tab_id} -> {target}");
    }
}

pub fn check(args: CheckArgs) -> CommandResult {
    // a broken config file must not stop the gate
    let config = Config::load_or_default();
    let gate = Gatekeeper::new(open_store()?, config.gate.blocked_page);
    let details = NavigationDetails {
        url: args.url,
        frame_id: args.frame_id,
        tab_id: args.tab_id,
    };
    let decision = gate.on_before_navigate(&details, now_ms(), &mut TabRedirector);
    print_json(&decision)
}

pub fn watch(args: WatchArgs) -> CommandResult {
    let config = Config::load_or_default();
    let now = now_ms();
    let mut watcher = PassWatcher::new(open_store()?, config.gate.blocked_page, &args.url, now);

    let redirect = if args.follow {
        current_thread_runtime()?.block_on(follow(&mut watcher))
    } else {
        watcher.check(now)
    };
    print_json(&json!({ "url": args.url, "redirect": redirect }))
}

/// Run scheduled checks until one fails.
async fn follow<S: KeyValueStore>(watcher: &mut PassWatcher<S>) -> Option<String> {
    while let Some(deadline) = watcher.next_deadline() {
        sleep(Duration::from_millis((deadline - now_ms()).max(0) as u64)).await;
        if let Some(target) = watcher.advance_to(now_ms()) {
            return Some(target);
        }
    }
    None
}
