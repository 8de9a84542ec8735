use chrono::Local;
use clap::Subcommand;
use doomjournal_core::clock::to_datetime;
use doomjournal_core::stats::{format_duration, preview, recent, summarize};
use serde_json::json;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum EntriesAction {
    /// Recent entries, newest first
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print full entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals and current streak
    Stats,
}

pub fn run(action: EntriesAction) -> CommandResult {
    let entries = open_store()?.entries()?;
    match action {
        EntriesAction::List { limit, json } => {
            let shown = recent(&entries, limit);
            if json {
                return print_json(&shown);
            }
            if shown.is_empty() {
                println!("no entries yet");
            }
            for entry in shown {
                let at = to_datetime(entry.timestamp).with_timezone(&Local);
                println!(
                    "{}  {}  {} words  {}",
                    at.format("%Y-%m-%d %H:%M"),
                    format_duration(entry.duration),
                    entry.word_count,
                    preview(&entry.content, 50).replace('\n', " ")
                );
            }
        }
        EntriesAction::Stats => {
            let summary = summarize(&entries, &Local::now());
            print_json(&json!({
                "totalEntries": summary.total_entries,
                "totalTime": format_duration(summary.total_duration_secs),
                "totalWords": summary.total_words,
                "currentStreak": summary.current_streak,
            }))?;
        }
    }
    Ok(())
}
