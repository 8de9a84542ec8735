//! Markdown and JSON export of journal entries, plus JSON import.

use std::collections::HashSet;
use std::fmt::{Display, Write as _};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::ExportError;

pub const MARKDOWN_FILE_NAME: &str = "doom-journal-export.md";
pub const JSON_FILE_NAME: &str = "doom-journal-export.json";

/// JSON export layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub total_entries: usize,
    pub entries: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportShape {
    Document(ExportDocument),
    Bare(Vec<Entry>),
}

fn sorted_ascending(entries: &[Entry]) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.timestamp);
    sorted
}

/// Entries oldest first, grouped under one heading per calendar day in the
/// timezone of `now`.
pub fn to_markdown<Tz>(entries: &[Entry], now: &DateTime<Tz>) -> Result<String, ExportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let tz = now.timezone();

    let mut md = String::from("# Doom Journal Export\n\n");
    let _ = writeln!(md, "> Exported on {}\n", now.format("%-m/%-d/%Y"));

    let mut current_day = None;
    for entry in sorted_ascending(entries) {
        let Some(at) = tz.timestamp_millis_opt(entry.timestamp).single() else {
            continue;
        };
        let day = at.date_naive();
        if current_day != Some(day) {
            let _ = writeln!(md, "## {}\n", at.format("%A, %B %-d, %Y"));
            current_day = Some(day);
        }
        let _ = writeln!(
            md,
            "### {} ({} min, {} words)\n",
            at.format("%-I:%M %p"),
            entry.duration / 60,
            entry.word_count
        );
        let _ = writeln!(md, "{}\n", entry.content);
        md.push_str("---\n\n");
    }
    Ok(md)
}

/// Pretty-printed [`ExportDocument`], entries oldest first.
pub fn to_json(entries: &[Entry], now: DateTime<Utc>) -> Result<String, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let doc = ExportDocument {
        export_date: now,
        total_entries: entries.len(),
        entries: sorted_ascending(entries),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a JSON export. A bare array of entries is accepted too.
pub fn from_json(json: &str) -> Result<Vec<Entry>, ExportError> {
    Ok(match serde_json::from_str(json)? {
        ImportShape::Document(doc) => doc.entries,
        ImportShape::Bare(entries) => entries,
    })
}

/// Append imported entries whose ids are not already present.
/// Returns how many were added.
pub fn merge_entries(existing: &mut Vec<Entry>, imported: Vec<Entry>) -> usize {
    let mut known: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();
    let before = existing.len();
    for entry in imported {
        if known.insert(entry.id.clone()) {
            existing.push(entry);
        }
    }
    existing.len() - before
}
