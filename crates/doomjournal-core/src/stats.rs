//! Journal statistics shown on the settings surface.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_entries: usize,
    pub total_duration_secs: u64,
    pub total_words: usize,
    pub current_streak: u32,
}

pub fn summarize<Tz: TimeZone>(entries: &[Entry], now: &DateTime<Tz>) -> Summary {
    Summary {
        total_entries: entries.len(),
        total_duration_secs: entries.iter().map(|e| e.duration).sum(),
        total_words: entries.iter().map(|e| e.word_count).sum(),
        current_streak: current_streak(entries, now),
    }
}

/// Calendar day of an entry in `tz`.
pub fn entry_day<Tz: TimeZone>(entry: &Entry, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(entry.timestamp)
        .single()
        .map(|dt| dt.date_naive())
}

/// Consecutive days with at least one entry, counting back from the most
/// recent entry day. The streak is broken (0) when that day is before
/// yesterday.
pub fn current_streak<Tz: TimeZone>(entries: &[Entry], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: BTreeSet<NaiveDate> = entries.iter().filter_map(|e| entry_day(e, &tz)).collect();

    let mut newest_first = days.iter().rev();
    let Some(&latest) = newest_first.next() else {
        return 0;
    };

    let today = now.date_naive();
    let yesterday = today.pred_opt().unwrap_or(today);
    if latest < yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut current = latest;
    for &day in newest_first {
        if current.pred_opt() != Some(day) {
            break;
        }
        streak += 1;
        current = day;
    }
    streak
}

/// `"25m"`, `"2h"`, `"1h 5m"`. Seconds below a minute are dropped.
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours}h"),
        rest => format!("{hours}h {rest}m"),
    }
}

/// Remaining pass time as `m:ss`.
pub fn format_pass_countdown(ms: i64) -> String {
    if ms <= 0 {
        return "0:00".into();
    }
    let total = ms / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Up to `limit` entries, newest first.
pub fn recent(entries: &[Entry], limit: usize) -> Vec<&Entry> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

/// First `max_chars` characters, with `...` when truncated.
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
