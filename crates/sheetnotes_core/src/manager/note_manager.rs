//! Note manager service.
//!
//! # Responsibility
//! - CRUD, reordering and journal import/export over a parent's persisted
//!   note list.
//! - Repair dangling note→category references on demand.
//!
//! # Invariants
//! - Every write restamps the affected note's audit fields with this
//!   manager's acting user.
//! - A create without an explicit sort appends after the current maximum.
//! - Reorder rewrites every note's sort value, not just the named ones.
//! - Reconciliation corrects dangling references instead of reporting them.

use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::host::{HostError, JournalCollection, JournalPage};
use crate::manager::parent_is_blank;
use crate::model::category::{Category, CategoryKey};
use crate::model::note::{Note, NoteKey, NotePatch};
use crate::model::ValidationError;
use crate::store::{read_flag, write_flag, FlagStore, StoreError, CATEGORIES_KEY, NOTES_KEY};

/// Errors from note manager operations.
#[derive(Debug)]
pub enum NoteError {
    /// A required identifier argument is missing or malformed.
    InvalidArgument(&'static str),
    /// Referenced key does not exist in the parent's note list.
    NotFound(NoteKey),
    /// Entity-level invariant violation.
    Validation(ValidationError),
    /// Storage-layer failure.
    Store(StoreError),
    /// The host document collection refused an export.
    Host(HostError),
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(argument) => {
                write!(f, "argument `{argument}` is missing or malformed")
            }
            Self::NotFound(key) => write!(f, "note not found: {key}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for NoteError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for NoteError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<HostError> for NoteError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}

/// Note manager over one flag store, acting as one user.
pub struct NoteManager<'s, S: FlagStore> {
    store: &'s mut S,
    user: String,
}

impl<'s, S: FlagStore> NoteManager<'s, S> {
    /// Creates a manager stamping audit fields with `user`.
    pub fn new(store: &'s mut S, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
        }
    }

    /// Creates one note from partial data and persists it.
    ///
    /// Without an explicit sort the note is appended after the current
    /// maximum; on an empty list the entity default applies.
    pub fn create(&mut self, parent: &str, patch: NotePatch) -> Result<Note, NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;

        let mut patch = patch;
        if patch.sort.is_none() {
            patch.sort = notes.iter().map(|note| note.sort).max().map(|max| max + 1);
        }

        let note = Note::new(patch, &self.user)?;
        notes.push(note.clone());
        self.save_notes(parent, &notes)?;
        Ok(note)
    }

    /// Gets one note by key, `None` when absent.
    pub fn get(&self, parent: &str, key: NoteKey) -> Result<Option<Note>, NoteError> {
        self.require_parent(parent)?;
        if key.is_nil() {
            return Err(NoteError::InvalidArgument("key"));
        }
        let notes = self.load_notes(parent)?;
        Ok(notes.into_iter().find(|note| note.key == key))
    }

    /// Returns the raw persisted note records in stored order.
    pub fn get_all(&self, parent: &str) -> Result<Vec<Note>, NoteError> {
        self.require_parent(parent)?;
        self.load_notes(parent)
    }

    /// Number of persisted notes.
    pub fn count(&self, parent: &str) -> Result<usize, NoteError> {
        Ok(self.get_all(parent)?.len())
    }

    /// Applies a partial update to one note and persists the list.
    pub fn update(
        &mut self,
        parent: &str,
        key: NoteKey,
        patch: NotePatch,
    ) -> Result<Note, NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;
        let index = notes
            .iter()
            .position(|note| note.key == key)
            .ok_or(NoteError::NotFound(key))?;

        notes[index].update(patch, &self.user)?;
        let updated = notes[index].clone();
        self.save_notes(parent, &notes)?;
        Ok(updated)
    }

    /// Deletes one note by key.
    pub fn delete(&mut self, parent: &str, key: NoteKey) -> Result<(), NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;
        let index = notes
            .iter()
            .position(|note| note.key == key)
            .ok_or(NoteError::NotFound(key))?;
        notes.remove(index);
        self.save_notes(parent, &notes)?;
        Ok(())
    }

    /// Unconditionally clears the parent's note list.
    pub fn delete_all(&mut self, parent: &str) -> Result<(), NoteError> {
        self.require_parent(parent)?;
        self.save_notes(parent, &[])?;
        Ok(())
    }

    /// Converts one host journal page into a note and persists it.
    pub fn import_from_journal(
        &mut self,
        parent: &str,
        page: &JournalPage,
    ) -> Result<Note, NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;
        let note = Note::from_journal_page(page, &self.user)?;
        notes.push(note.clone());
        self.save_notes(parent, &notes)?;
        Ok(note)
    }

    /// Exports one note as a new journal page inside `container`.
    ///
    /// This is the only manager operation that side-effects into the host
    /// collaborator instead of flag storage.
    pub fn export_to_journal(
        &self,
        parent: &str,
        key: NoteKey,
        collection: &mut dyn JournalCollection,
        container: &str,
    ) -> Result<JournalPage, NoteError> {
        self.require_parent(parent)?;
        if container.trim().is_empty() {
            return Err(NoteError::InvalidArgument("container"));
        }
        let notes = self.load_notes(parent)?;
        let note = notes
            .iter()
            .find(|note| note.key == key)
            .ok_or(NoteError::NotFound(key))?;

        let page = collection.create_page(container, note.to_journal_page())?;
        Ok(page)
    }

    /// Rewrites every note's sort value from an explicit key sequence.
    ///
    /// Named keys get sort 1, 2, 3, … in the given order; unnamed notes are
    /// appended afterward preserving their stored relative order.
    pub fn reorder(&mut self, parent: &str, keys: &[NoteKey]) -> Result<(), NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;
        for key in keys {
            if !notes.iter().any(|note| note.key == *key) {
                return Err(NoteError::NotFound(*key));
            }
        }

        let mut assigned: HashSet<NoteKey> = HashSet::new();
        let mut next: i64 = 1;
        for key in keys {
            if !assigned.insert(*key) {
                continue;
            }
            if let Some(note) = notes.iter_mut().find(|note| note.key == *key) {
                note.sort = next;
                next += 1;
            }
        }
        for note in notes.iter_mut() {
            if !assigned.contains(&note.key) {
                note.sort = next;
                next += 1;
            }
        }

        self.save_notes(parent, &notes)?;
        Ok(())
    }

    /// Clears note→category references that point at no existing category.
    ///
    /// Persists only when something changed; returns the number of notes
    /// cleaned. This is the explicit repair pass for the reference
    /// invariant, which writes do not enforce transactionally.
    pub fn reconcile_category_references(&mut self, parent: &str) -> Result<usize, NoteError> {
        self.require_parent(parent)?;
        let mut notes = self.load_notes(parent)?;
        let categories: Vec<Category> =
            read_flag(&*self.store, parent, CATEGORIES_KEY)?.unwrap_or_default();
        let valid: HashSet<CategoryKey> =
            categories.iter().map(|category| category.key).collect();

        let mut cleaned = 0;
        for note in notes.iter_mut() {
            if let Some(reference) = note.category {
                if !valid.contains(&reference) {
                    note.category = None;
                    cleaned += 1;
                }
            }
        }

        if cleaned > 0 {
            self.save_notes(parent, &notes)?;
        }
        Ok(cleaned)
    }

    fn require_parent(&self, parent: &str) -> Result<(), NoteError> {
        if parent_is_blank(parent) {
            return Err(NoteError::InvalidArgument("parent"));
        }
        Ok(())
    }

    fn load_notes(&self, parent: &str) -> Result<Vec<Note>, NoteError> {
        Ok(read_flag(&*self.store, parent, NOTES_KEY)?.unwrap_or_default())
    }

    fn save_notes(&mut self, parent: &str, notes: &[Note]) -> Result<(), NoteError> {
        write_flag(&mut *self.store, parent, NOTES_KEY, &notes)?;
        Ok(())
    }
}
