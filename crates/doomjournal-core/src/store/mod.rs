//! Pass/entry store.
//!
//! The host persists four named fields in a key-value store. [`KeyValueStore`]
//! is the seam to that host storage; [`PassStore`] layers typed access and the
//! completion write on top of it.
//!
//! There is no concurrency control beyond last-writer-wins: at most one writing
//! session is expected to touch the store at a time.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entry::{self, Entry};
use crate::error::StoreError;

/// Default pass length granted by a completed session.
pub const DEFAULT_PASS_DURATION_MINUTES: u32 = 45;

/// Named fields of the persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreKey {
    Enabled,
    Entries,
    PassDurationMinutes,
    PassExpiresAt,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Enabled,
        StoreKey::Entries,
        StoreKey::PassDurationMinutes,
        StoreKey::PassExpiresAt,
    ];

    /// Key name as stored by the host.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Enabled => "enabled",
            StoreKey::Entries => "entries",
            StoreKey::PassDurationMinutes => "passDurationMinutes",
            StoreKey::PassExpiresAt => "passExpiresAt",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host key-value storage. Each call is atomic; `set` writes all pairs or none.
pub trait KeyValueStore {
    fn get(&self, key: StoreKey) -> Result<Option<Value>, StoreError>;

    fn set(&self, values: &[(StoreKey, Value)]) -> Result<(), StoreError>;

    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: StoreKey) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, values: &[(StoreKey, Value)]) -> Result<(), StoreError> {
        (**self).set(values)
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// User settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// When false the gatekeeper never blocks.
    pub enabled: bool,
    /// Applies to the next completed session only.
    pub pass_duration_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            pass_duration_minutes: DEFAULT_PASS_DURATION_MINUTES,
        }
    }
}

impl Settings {
    pub fn pass_duration_ms(&self) -> i64 {
        i64::from(self.pass_duration_minutes) * 60_000
    }
}

/// Current access pass. `None` means no pass has been granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassState {
    pub pass_expires_at: Option<i64>,
}

impl PassState {
    /// Milliseconds left on the pass, clamped at zero.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.pass_expires_at
            .map(|at| (at - now_ms).max(0))
            .unwrap_or(0)
    }
}

/// Outcome of persisting a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedEntry {
    pub entry_id: String,
    pub word_count: usize,
    /// Cumulative duration of the entry after this session.
    pub duration: u64,
    pub pass_expires_at: i64,
    /// True when an existing entry was extended rather than created.
    pub continued: bool,
}

/// Typed access to the persisted fields.
#[derive(Debug, Clone)]
pub struct PassStore<S> {
    kv: S,
}

impl<S: KeyValueStore> PassStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Stored settings. Only an explicit `false` disables blocking; a missing
    /// or zero pass duration falls back to the default.
    pub fn settings(&self) -> Result<Settings, StoreError> {
        let enabled = !matches!(self.kv.get(StoreKey::Enabled)?, Some(Value::Bool(false)));
        let pass_duration_minutes = self
            .kv
            .get(StoreKey::PassDurationMinutes)?
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
            .filter(|m| *m > 0)
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or(DEFAULT_PASS_DURATION_MINUTES);
        Ok(Settings {
            enabled,
            pass_duration_minutes,
        })
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.kv.set(&[(StoreKey::Enabled, Value::Bool(enabled))])
    }

    pub fn set_pass_duration_minutes(&self, minutes: u32) -> Result<(), StoreError> {
        if minutes == 0 {
            return Err(StoreError::InvalidValue {
                key: StoreKey::PassDurationMinutes.to_string(),
                message: "pass duration must be at least one minute".into(),
            });
        }
        self.kv
            .set(&[(StoreKey::PassDurationMinutes, Value::from(minutes))])
    }

    pub fn pass_state(&self) -> Result<PassState, StoreError> {
        let pass_expires_at = self
            .kv
            .get(StoreKey::PassExpiresAt)?
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));
        Ok(PassState { pass_expires_at })
    }

    /// Start a fresh pass of the configured length. Returns the new expiry.
    pub fn grant_pass(&self, now_ms: i64) -> Result<i64, StoreError> {
        let expires_at = now_ms + self.settings()?.pass_duration_ms();
        self.kv
            .set(&[(StoreKey::PassExpiresAt, Value::from(expires_at))])?;
        Ok(expires_at)
    }

    /// All entries that decode, in stored order. Records that no longer
    /// decode are skipped here and kept as-is on every write.
    pub fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        Ok(self.load_entries()?.0)
    }

    /// Decoded entries plus the raw records that failed to decode.
    fn load_entries(&self) -> Result<(Vec<Entry>, Vec<Value>), StoreError> {
        let items = match self.kv.get(StoreKey::Entries)? {
            None | Some(Value::Null) => return Ok((Vec::new(), Vec::new())),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(StoreError::InvalidValue {
                    key: StoreKey::Entries.to_string(),
                    message: format!("expected a list, found {other}"),
                })
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut unreadable = Vec::new();
        for item in items {
            match Entry::deserialize(&item) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable entry; it is kept in storage");
                    unreadable.push(item);
                }
            }
        }
        Ok((entries, unreadable))
    }

    pub fn latest_entry(&self) -> Result<Option<Entry>, StoreError> {
        Ok(entry::latest(&self.entries()?).cloned())
    }

    /// Replace the decodable entries. Undecodable records already in the
    /// store are written back after them.
    pub fn save_entries(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let (_, unreadable) = self.load_entries()?;
        self.kv
            .set(&[(StoreKey::Entries, encode_entries(entries, unreadable)?)])
    }

    /// Persist a finished writing session and grant a fresh pass.
    ///
    /// Extends the entry named by `continuing_id` when it still exists,
    /// otherwise appends a new entry. Entries and the pass are written in one
    /// call so a failure leaves both untouched.
    pub fn complete_entry(
        &self,
        continuing_id: Option<&str>,
        content: &str,
        duration_secs: u64,
        now_ms: i64,
    ) -> Result<CompletedEntry, StoreError> {
        let (mut entries, unreadable) = self.load_entries()?;
        let settings = self.settings()?;

        let existing = continuing_id.and_then(|id| entries.iter_mut().find(|e| e.id == id));
        let continued = existing.is_some();
        let (entry_id, word_count, duration) = match existing {
            Some(entry) => {
                entry.extend(content, duration_secs);
                (entry.id.clone(), entry.word_count, entry.duration)
            }
            None => {
                if let Some(id) = continuing_id {
                    warn!(entry_id = id, "continuing entry vanished; creating a new one");
                }
                let entry = Entry::new(now_ms, content, duration_secs);
                let out = (entry.id.clone(), entry.word_count, entry.duration);
                entries.push(entry);
                out
            }
        };

        let pass_expires_at = now_ms + settings.pass_duration_ms();
        self.kv.set(&[
            (StoreKey::Entries, encode_entries(&entries, unreadable)?),
            (StoreKey::PassExpiresAt, Value::from(pass_expires_at)),
        ])?;
        debug!(entry_id = %entry_id, continued, pass_expires_at, "session persisted");

        Ok(CompletedEntry {
            entry_id,
            word_count,
            duration,
            pass_expires_at,
            continued,
        })
    }

    /// Write defaults for keys that are not yet present. Existing values are
    /// never overwritten. Returns the keys that were written.
    pub fn install_defaults(&self) -> Result<Vec<StoreKey>, StoreError> {
        let mut defaults = Vec::new();
        if self.kv.get(StoreKey::Enabled)?.is_none() {
            defaults.push((StoreKey::Enabled, Value::Bool(true)));
        }
        if self.kv.get(StoreKey::Entries)?.is_none() {
            defaults.push((StoreKey::Entries, Value::Array(Vec::new())));
        }
        if self.kv.get(StoreKey::PassDurationMinutes)?.is_none() {
            defaults.push((
                StoreKey::PassDurationMinutes,
                Value::from(DEFAULT_PASS_DURATION_MINUTES),
            ));
        }
        if !defaults.is_empty() {
            self.kv.set(&defaults)?;
        }
        Ok(defaults.into_iter().map(|(k, _)| k).collect())
    }
}

fn encode<T: Serialize + ?Sized>(key: StoreKey, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode_entries(entries: &[Entry], unreadable: Vec<Value>) -> Result<Value, StoreError> {
    let mut items = entries
        .iter()
        .map(|entry| encode(StoreKey::Entries, entry))
        .collect::<Result<Vec<_>, _>>()?;
    items.extend(unreadable);
    Ok(Value::Array(items))
}
