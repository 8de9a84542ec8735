use clap::Args;
use doomjournal_core::gate::blocked_page_url;
use doomjournal_core::session::driver::{self, DriverOutcome, SessionInput};
use doomjournal_core::session::return_url_from_page;
use doomjournal_core::{Config, Event, JournalSession, KeyValueStore, RandomPicker, SystemClock};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use super::{current_thread_runtime, now_ms, open_store, CommandResult};

#[derive(Args)]
pub struct WriteArgs {
    /// Writing time in minutes (defaults to the first configured duration)
    #[arg(long)]
    pub duration: Option<u64>,
    /// Page to return to once the session completes
    #[arg(long)]
    pub return_url: Option<String>,
    /// Start a fresh entry instead of continuing the latest one
    #[arg(long)]
    pub new: bool,
}

pub fn run(args: WriteArgs) -> CommandResult {
    let config = Config::load()?;
    let offered = &config.session.durations_secs;
    let duration_secs = match args.duration {
        Some(0) => return Err("--duration must be at least one minute".into()),
        Some(minutes) => minutes
            .checked_mul(60)
            .ok_or("--duration is too long")?,
        None => *offered.first().ok_or("no session durations configured")?,
    };
    if !offered.contains(&duration_secs) {
        warn!(duration_secs, ?offered, "duration is not one of the configured choices");
    }

    let fallback = &config.gate.fallback_return_url;
    let return_url = match &args.return_url {
        Some(url) => {
            return_url_from_page(&blocked_page_url(&config.gate.blocked_page, url), fallback)
        }
        None => fallback.clone(),
    };

    let mut session = JournalSession::load(open_store()?, RandomPicker::new(), return_url);
    if args.new {
        session.start_new_entry()?;
    } else if let Some(id) = session.continuing_entry_id() {
        eprintln!(
            "continuing entry {id} ({} words); use --new to start fresh",
            session.word_count()
        );
    }
    let started = session.select_duration(duration_secs, now_ms())?;
    print_event(&started);
    eprintln!(
        "writing for {} min; type and press enter, keep going until time is up",
        duration_secs / 60
    );

    let runtime = current_thread_runtime()?;
    let outcome = runtime.block_on(drive(&mut session));
    // stdin may still be blocked on a read
    runtime.shutdown_background();

    match outcome {
        DriverOutcome::Redirected(url) => {
            println!("{}", json!({ "redirect": url }));
            Ok(())
        }
        DriverOutcome::Abandoned(state) => Err(format!("session abandoned while {state}").into()),
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "could not print event"),
    }
}

async fn drive<S: KeyValueStore>(session: &mut JournalSession<S, RandomPicker>) -> DriverOutcome {
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(feed_stdin(tx, session.content().to_string()));
    driver::run(session, &SystemClock, &mut rx, print_event).await
}

/// Each line typed is a keystroke plus the full journal text so far.
async fn feed_stdin(tx: mpsc::Sender<SessionInput>, mut content: String) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&line);
        if tx.send(SessionInput::Keydown).await.is_err()
            || tx.send(SessionInput::Content(content.clone())).await.is_err()
        {
            return;
        }
    }
}
