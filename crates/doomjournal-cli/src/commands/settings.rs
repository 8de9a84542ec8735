use clap::Subcommand;
use doomjournal_core::confirm::{is_close_enough, CHALLENGE_PHRASE};
use doomjournal_core::stats::format_pass_countdown;
use serde_json::json;

use super::{now_ms, open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show blocking settings
    Show,
    /// Turn blocking on
    Enable,
    /// Turn blocking off
    Disable {
        /// Type the confirmation phrase
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Set the pass length granted by the next session
    Duration {
        /// Minutes
        minutes: u32,
    },
}

pub fn run(action: SettingsAction) -> CommandResult {
    let store = open_store()?;
    match action {
        SettingsAction::Show => print_json(&store.settings()?)?,
        SettingsAction::Enable => {
            store.set_enabled(true)?;
            println!("blocking enabled");
        }
        SettingsAction::Disable { confirm } => {
            let typed = confirm.unwrap_or_default();
            if !is_close_enough(&typed) {
                return Err(format!("type \"{CHALLENGE_PHRASE}\" with --confirm to disable").into());
            }
            store.set_enabled(false)?;
            println!("blocking disabled");
        }
        SettingsAction::Duration { minutes } => {
            store.set_pass_duration_minutes(minutes)?;
            println!("pass duration set to {minutes} min");
        }
    }
    Ok(())
}

pub fn install() -> CommandResult {
    let written = open_store()?.install_defaults()?;
    let keys: Vec<&str> = written.iter().map(|k| k.as_str()).collect();
    print_json(&json!({ "initialized": keys }))
}

pub fn pass() -> CommandResult {
    let store = open_store()?;
    let settings = store.settings()?;
    let pass = store.pass_state()?;
    let remaining = pass.remaining_ms(now_ms());
    print_json(&json!({
        "enabled": settings.enabled,
        "active": remaining > 0,
        "passExpiresAt": pass.pass_expires_at,
        "remainingMs": remaining,
        "countdown": format_pass_countdown(remaining),
    }))
}
