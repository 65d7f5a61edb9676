//! Core note/category data layer for character-sheet plugins.
//! This crate is the single source of truth for business invariants.

pub mod host;
pub mod logging;
pub mod manager;
pub mod migrate;
pub mod model;
pub mod store;

/// Flag scope under which all of this crate's per-parent data lives.
pub const FLAG_SCOPE: &str = "sheetnotes";

pub use host::{HostError, JournalCollection, JournalPage, NewJournalPage};
pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::category_manager::{CategoryError, CategoryManager};
pub use manager::note_manager::{NoteError, NoteManager};
pub use migrate::{apply_parent_migrations, latest_parent_version, MigrateError};
pub use model::category::{
    Category, CategoryKey, CategoryPatch, NoteOrdering, DEFAULT_CATEGORY_NAME,
};
pub use model::note::{Note, NoteKey, NotePatch, NoteStats, NoteText, TextFormat};
pub use model::ValidationError;
pub use store::{
    open_store, open_store_in_memory, FlagStore, MemoryFlagStore, SqliteFlagStore, StoreError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
