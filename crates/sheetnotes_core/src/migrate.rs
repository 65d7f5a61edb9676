//! Per-parent data migration runner.
//!
//! # Responsibility
//! - Register parent-data migrations in strictly increasing order.
//! - Bring one parent's flag data up to the latest version exactly once.
//!
//! # Invariants
//! - Each migration procedure is idempotent.
//! - Re-running after completion is a no-op thanks to the version stamp.
//! - A brand-new parent (no notes, no categories, no version) is stamped
//!   directly to the latest version without replaying history.
//!
//! This version tracks the per-parent data shape; the SQLite layout version
//! lives in `store::schema`.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::manager::parent_is_blank;
use crate::model::category::{Category, CategoryPatch, DEFAULT_CATEGORY_NAME};
use crate::model::note::Note;
use crate::model::ValidationError;
use crate::store::{
    read_flag, write_flag, FlagStore, StoreError, CATEGORIES_KEY, NOTES_KEY, VERSION_KEY,
};

pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors from the parent migration runner.
#[derive(Debug)]
pub enum MigrateError {
    /// A required identifier argument is missing or malformed.
    InvalidArgument(&'static str),
    /// Migrated data failed entity validation.
    Validation(ValidationError),
    /// Storage-layer failure.
    Store(StoreError),
}

impl Display for MigrateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(argument) => {
                write!(f, "argument `{argument}` is missing or malformed")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MigrateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidArgument(_) => None,
        }
    }
}

impl From<ValidationError> for MigrateError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for MigrateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

struct ParentMigration {
    version: u32,
    apply: fn(&mut dyn FlagStore, &str) -> MigrateResult<()>,
}

const PARENT_MIGRATIONS: &[ParentMigration] = &[ParentMigration {
    version: 1,
    apply: adopt_uncategorized_notes,
}];

/// Returns the latest parent-data version known by this binary.
pub fn latest_parent_version() -> u32 {
    PARENT_MIGRATIONS
        .last()
        .map_or(0, |migration| migration.version)
}

/// Brings one parent's flag data up to the latest version.
///
/// Returns the version the parent is at afterward. Safe to call before
/// every manager session; completed parents short-circuit on the stamp.
pub fn apply_parent_migrations(
    store: &mut dyn FlagStore,
    parent: &str,
) -> MigrateResult<u32> {
    if parent_is_blank(parent) {
        return Err(MigrateError::InvalidArgument("parent"));
    }

    let current: Option<u32> = read_flag(&*store, parent, VERSION_KEY)?;
    let latest = latest_parent_version();
    if let Some(version) = current {
        if version >= latest {
            return Ok(version);
        }
    }

    // Brand-new parents carry no data worth replaying upgrade history over.
    if current.is_none() && has_no_data(store, parent)? {
        write_flag(&mut *store, parent, VERSION_KEY, &latest)?;
        info!(
            "event=parent_migration module=migrate status=ok parent={parent} from=none to={latest} fast_path=true"
        );
        return Ok(latest);
    }

    let from = current.unwrap_or(0);
    for migration in PARENT_MIGRATIONS {
        if migration.version <= from {
            continue;
        }
        (migration.apply)(&mut *store, parent)?;
    }
    write_flag(&mut *store, parent, VERSION_KEY, &latest)?;
    info!(
        "event=parent_migration module=migrate status=ok parent={parent} from={from} to={latest} fast_path=false"
    );
    Ok(latest)
}

fn has_no_data(store: &dyn FlagStore, parent: &str) -> MigrateResult<bool> {
    let categories: Option<Vec<serde_json::Value>> = read_flag(&*store, parent, CATEGORIES_KEY)?;
    let notes: Option<Vec<serde_json::Value>> = read_flag(&*store, parent, NOTES_KEY)?;
    let empty = categories.map_or(true, |list| list.is_empty())
        && notes.map_or(true, |list| list.is_empty());
    Ok(empty)
}

/// Version 1: gather uncategorized notes under a synthesized default
/// category.
///
/// No-op when a "Notes" category already exists or no uncategorized note is
/// present.
fn adopt_uncategorized_notes(store: &mut dyn FlagStore, parent: &str) -> MigrateResult<()> {
    let mut categories: Vec<Category> =
        read_flag(&*store, parent, CATEGORIES_KEY)?.unwrap_or_default();
    if Category::name_exists(&categories, DEFAULT_CATEGORY_NAME, None) {
        return Ok(());
    }

    let mut notes: Vec<Note> = read_flag(&*store, parent, NOTES_KEY)?.unwrap_or_default();
    if !notes.iter().any(|note| note.category.is_none()) {
        return Ok(());
    }

    let category = Category::new(CategoryPatch::named(DEFAULT_CATEGORY_NAME))?;
    categories.insert(0, category.clone());
    write_flag(&mut *store, parent, CATEGORIES_KEY, &categories)?;

    for note in notes.iter_mut() {
        if note.category.is_none() {
            note.category = Some(category.key);
        }
    }
    write_flag(&mut *store, parent, NOTES_KEY, &notes)?;
    Ok(())
}
