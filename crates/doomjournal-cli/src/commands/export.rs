use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use clap::Subcommand;
use doomjournal_core::export::{
    from_json, merge_entries, to_json, to_markdown, JSON_FILE_NAME, MARKDOWN_FILE_NAME,
};
use serde_json::json;
use tracing::info;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum ExportAction {
    /// Entries grouped by day as Markdown
    Markdown {
        /// Output file; "-" for stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Entries as a JSON document
    Json {
        /// Output file; "-" for stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(action: ExportAction) -> CommandResult {
    let entries = open_store()?.entries()?;
    let (text, out, default_name) = match action {
        ExportAction::Markdown { out } => (
            to_markdown(&entries, &Local::now())?,
            out,
            MARKDOWN_FILE_NAME,
        ),
        ExportAction::Json { out } => (to_json(&entries, Utc::now())?, out, JSON_FILE_NAME),
    };

    let path = out.unwrap_or_else(|| PathBuf::from(default_name));
    if path.as_os_str() == "-" {
        print!("{text}");
        return Ok(());
    }
    std::fs::write(&path, text)?;
    info!(path = %path.display(), entries = entries.len(), "export written");
    println!("exported {} entries to {}", entries.len(), path.display());
    Ok(())
}

pub fn import(file: &Path) -> CommandResult {
    let text = std::fs::read_to_string(file)?;
    let incoming = from_json(&text)?;
    let store = open_store()?;
    let mut entries = store.entries()?;
    let added = merge_entries(&mut entries, incoming);
    if added > 0 {
        store.save_entries(&entries)?;
    }
    print_json(&json!({ "imported": added, "totalEntries": entries.len() }))
}
