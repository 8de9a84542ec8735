pub mod config;
pub mod entries;
pub mod export;
pub mod gate;
pub mod settings;
pub mod write;

use doomjournal_core::{Clock, PassStore, SqliteStore, SystemClock};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The pass store in the data directory.
pub fn open_store() -> Result<PassStore<SqliteStore>, doomjournal_core::CoreError> {
    Ok(PassStore::new(SqliteStore::open()?))
}

pub fn now_ms() -> i64 {
    SystemClock.now_ms()
}

/// Runtime for commands that wait on timers or stdin.
pub fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
