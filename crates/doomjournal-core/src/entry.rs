//! Journal entry model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted journaling record, possibly extended across several sessions.
///
/// Field names are camelCase on the wire so stored data and JSON exports stay
/// compatible with the browser extension's `entries` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    pub content: String,
    /// Cumulative seconds spent writing.
    pub duration: u64,
    pub word_count: usize,
}

impl Entry {
    /// Create a fresh entry with a random id.
    pub fn new(timestamp: i64, content: impl Into<String>, duration: u64) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            word_count: count_words(&content),
            content,
            duration,
        }
    }

    /// Replace the content and add another writing stint.
    ///
    /// `id` and `timestamp` never change.
    pub fn extend(&mut self, content: impl Into<String>, extra_secs: u64) {
        self.content = content.into();
        self.word_count = count_words(&self.content);
        self.duration = self.duration.saturating_add(extra_secs);
    }
}

/// Number of whitespace-separated tokens. Blank text counts as zero.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Most recent entry by timestamp.
pub fn latest(entries: &[Entry]) -> Option<&Entry> {
    entries.iter().max_by_key(|e| e.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_across_whitespace_runs() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  one   two\nthree\t four "), 4);
    }

    #[test]
    fn extend_accumulates_duration_and_recounts() {
        let mut entry = Entry::new(1_000, "first draft", 300);
        let id = entry.id.clone();
        entry.extend("first draft and then some", 600);
        assert_eq!(entry.id, id);
        assert_eq!(entry.timestamp, 1_000);
        assert_eq!(entry.duration, 900);
        assert_eq!(entry.word_count, 5);
    }

    #[test]
    fn extend_saturates_duration() {
        let mut entry = Entry::new(0, "x", u64::MAX - 10);
        entry.extend("x y", 60);
        assert_eq!(entry.duration, u64::MAX);
    }

    #[test]
    fn serializes_camel_case() {
        let entry = Entry::new(42, "hi there", 60);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["wordCount"], 2);
        assert_eq!(json["timestamp"], 42);
        assert!(json.get("word_count").is_none());
    }

    #[test]
    fn latest_picks_highest_timestamp() {
        let entries = vec![
            Entry::new(5, "b", 1),
            Entry::new(9, "c", 1),
            Entry::new(1, "a", 1),
        ];
        assert_eq!(latest(&entries).map(|e| e.timestamp), Some(9));
        assert!(latest(&[]).is_none());
    }
}
