//! Note domain model.
//!
//! # Responsibility
//! - Represent one note's content, sort position, category association and
//!   audit stats.
//! - Own the pure halves of journal import/export (shape checks and field
//!   mapping).
//!
//! # Invariants
//! - `key` and `stats.created_time` are never altered by updates.
//! - Every update restamps `modified_time` and `last_modified_by`.
//! - Raw markdown is carried only for markdown-formatted text.
//! - `category` may reference a missing key; the manager's reconciliation
//!   pass repairs that instead of failing writes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::host::{JournalPage, NewJournalPage, TEXT_PAGE_KIND};
use crate::model::category::CategoryKey;
use crate::model::{now_ms, ValidationError};
use crate::FLAG_SCOPE;

/// Stable identifier for a note within one parent's flag scope.
pub type NoteKey = Uuid;

/// Sort value assigned when a parent has no notes yet.
pub const DEFAULT_NOTE_SORT: i64 = 100_000;

const NEW_NOTE_NAME: &str = "New Note";

/// Markup flavor of a note body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Rendered HTML markup.
    #[default]
    Html,
    /// HTML rendered from a raw markdown source.
    Markdown,
}

/// Structured note body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteText {
    /// Rendered markup; may be blank.
    pub content: String,
    pub format: TextFormat,
    /// Raw markdown source, present only for markdown-formatted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

/// Audit stats stamped at creation and refreshed on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    /// Epoch milliseconds, set once at creation.
    pub created_time: i64,
    /// Epoch milliseconds, refreshed on every update.
    pub modified_time: i64,
    /// Identifier of the last modifying user.
    pub last_modified_by: String,
}

impl NoteStats {
    fn fresh(user: &str) -> Self {
        let now = now_ms();
        Self {
            created_time: now,
            modified_time: now,
            last_modified_by: user.to_string(),
        }
    }
}

/// Partial note fields merged over defaults (construction) or over current
/// state (update).
///
/// `text` uses whole-object replacement: supplying it replaces content,
/// format and markdown together. `category` distinguishes "leave unchanged"
/// (outer `None`) from "clear to uncategorized" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub name: Option<String>,
    pub sort: Option<i64>,
    pub text: Option<NoteText>,
    pub category: Option<Option<CategoryKey>>,
    pub flags: Option<Map<String, Value>>,
}

impl NotePatch {
    /// Convenience patch carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Validated note record. The serde shape is exactly the persisted
/// flag-storage shape; `markdown` and `flags` are omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub key: NoteKey,
    pub name: String,
    pub sort: i64,
    pub text: NoteText,
    /// Referenced category key, or `None` for uncategorized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryKey>,
    /// Carried host metadata, keyed by namespace.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub flags: Map<String, Value>,
    pub stats: NoteStats,
}

impl Note {
    /// Builds a note by merging `patch` over defaults: fresh random key,
    /// name "New Note", sort [`DEFAULT_NOTE_SORT`], empty HTML text, no
    /// category, fresh audit stats for `user`.
    pub fn new(patch: NotePatch, user: &str) -> Result<Self, ValidationError> {
        let note = Self {
            key: Uuid::new_v4(),
            name: patch.name.unwrap_or_else(|| NEW_NOTE_NAME.to_string()),
            sort: patch.sort.unwrap_or(DEFAULT_NOTE_SORT),
            text: patch.text.unwrap_or_default(),
            category: patch.category.unwrap_or(None),
            flags: patch.flags.unwrap_or_default(),
            stats: NoteStats::fresh(user),
        };
        note.validate()?;
        Ok(note)
    }

    /// Merges `patch` over the current state, restamps the audit fields and
    /// re-validates.
    ///
    /// `key` and `stats.created_time` are never altered. On validation
    /// failure the note is left untouched.
    pub fn update(&mut self, patch: NotePatch, user: &str) -> Result<(), ValidationError> {
        let mut candidate = self.clone();
        if let Some(name) = patch.name {
            candidate.name = name;
        }
        if let Some(sort) = patch.sort {
            candidate.sort = sort;
        }
        if let Some(text) = patch.text {
            candidate.text = text;
        }
        if let Some(category) = patch.category {
            candidate.category = category;
        }
        if let Some(flags) = patch.flags {
            candidate.flags = flags;
        }
        candidate.stats.modified_time = now_ms();
        candidate.stats.last_modified_by = user.to_string();
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Returns an independent copy under a fresh key with stats reset to
    /// just-created for `user`.
    pub fn duplicate(&self, user: &str) -> Self {
        Self {
            key: Uuid::new_v4(),
            stats: NoteStats::fresh(user),
            ..self.clone()
        }
    }

    /// Builds a note from one host journal page.
    ///
    /// The page must be a text page with an identifier. Page metadata is
    /// carried over, with a back-reference to the source page id merged
    /// under this crate's own flag namespace.
    pub fn from_journal_page(page: &JournalPage, user: &str) -> Result<Self, ValidationError> {
        if page.kind != TEXT_PAGE_KIND {
            return Err(ValidationError::UnexpectedPageKind(page.kind.clone()));
        }
        if page.id.trim().is_empty() {
            return Err(ValidationError::BlankPageId);
        }

        let mut flags = page.metadata.clone();
        let mut own = Map::new();
        own.insert("sourceId".to_string(), Value::String(page.id.clone()));
        flags.insert(FLAG_SCOPE.to_string(), Value::Object(own));

        let note = Self {
            key: Uuid::new_v4(),
            name: page.name.clone(),
            sort: page.sort,
            text: page.text.clone(),
            category: None,
            flags,
            stats: NoteStats::fresh(user),
        };
        note.validate()?;
        Ok(note)
    }

    /// Pure projection of this note as a journal page creation payload.
    pub fn to_journal_page(&self) -> NewJournalPage {
        NewJournalPage {
            name: self.name.clone(),
            kind: TEXT_PAGE_KIND.to_string(),
            sort: self.sort,
            text: self.text.clone(),
            metadata: self.flags.clone(),
        }
    }

    /// Checks all field-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.is_nil() {
            return Err(ValidationError::NilKey("note"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName("note"));
        }
        if self.text.format == TextFormat::Html && self.text.markdown.is_some() {
            return Err(ValidationError::MarkdownOnHtmlText);
        }
        if self.stats.last_modified_by.trim().is_empty() {
            return Err(ValidationError::BlankUser);
        }
        Ok(())
    }
}
