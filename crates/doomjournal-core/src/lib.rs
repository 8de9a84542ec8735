//! # Doom Journal Core Library
//!
//! Business logic for Doom Journal: social-media domains stay blocked until
//! the user completes a timed journaling session, which grants a temporary
//! access pass. Hosts (a browser extension shell, the `doomjournal` CLI) own
//! rendering, navigation and storage; this crate owns the rules.
//!
//! ## Architecture
//!
//! - **Gatekeeper**: decides whether a navigation is redirected to the journal,
//!   and re-checks open pages for pass expiry
//! - **Session**: wall-clock state machine for one writing exercise; the
//!   caller advances time with `advance_to()`
//! - **Store**: typed access to the four persisted fields over a pluggable
//!   key-value backend (in-memory or SQLite)
//! - **Settings surface**: stats, export/import, and the typed confirmation
//!   gating "disable"
//!
//! ## Key Components
//!
//! - [`Gatekeeper`]: navigation interception
//! - [`JournalSession`]: writing session state machine
//! - [`PassStore`]: pass, settings and entry persistence
//! - [`Config`]: host configuration

pub mod clock;
pub mod confirm;
pub mod entry;
pub mod error;
pub mod events;
pub mod export;
pub mod gate;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, SystemClock, TokioClock};
pub use entry::{count_words, Entry};
pub use error::{ConfigError, CoreError, ExportError, SessionError, StoreError};
pub use events::Event;
pub use gate::{
    has_valid_pass, should_block, AllowReason, Gatekeeper, NavigationDecision, NavigationDetails,
    NavigationObserver, PassWatcher,
};
pub use session::{JournalSession, MessagePicker, RandomPicker, SessionState};
pub use storage::Config;
pub use store::{KeyValueStore, MemoryStore, PassState, PassStore, Settings, SqliteStore, StoreKey};
