//! Domain models for character-sheet notes and their categories.
//!
//! # Responsibility
//! - Define the validated value objects persisted in a parent's flag scope.
//! - Keep field-level invariants in one place, enforced before persistence.
//!
//! # Invariants
//! - Every entity is identified by a stable non-nil key.
//! - Write paths must validate before anything reaches storage.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod category;
pub mod note;

/// Field-level invariant violation raised at construction or update time.
///
/// Nothing is persisted when validation fails; managers surface this to the
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Entity key is the nil UUID.
    NilKey(&'static str),
    /// Name is empty after trimming.
    BlankName(&'static str),
    /// Category name exceeds the allowed length.
    NameTooLong { actual: usize, max: usize },
    /// Audit stats carry a blank user identifier.
    BlankUser,
    /// Raw markdown is only meaningful for markdown-formatted text.
    MarkdownOnHtmlText,
    /// External journal page is not a text page.
    UnexpectedPageKind(String),
    /// External journal page carries no identifier.
    BlankPageId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilKey(entity) => write!(f, "{entity} key must not be nil"),
            Self::BlankName(entity) => write!(f, "{entity} name must not be blank"),
            Self::NameTooLong { actual, max } => {
                write!(f, "name length {actual} exceeds maximum of {max}")
            }
            Self::BlankUser => write!(f, "last-modifying user must not be blank"),
            Self::MarkdownOnHtmlText => {
                write!(f, "markdown source is only allowed when text format is markdown")
            }
            Self::UnexpectedPageKind(kind) => {
                write!(f, "journal page kind `{kind}` is not importable")
            }
            Self::BlankPageId => write!(f, "journal page id must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock time in epoch milliseconds, the unit used by audit
/// stats throughout the crate.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
