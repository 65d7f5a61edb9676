//! Contracts consumed from the host application.
//!
//! # Responsibility
//! - Type the external journal-page shape used by note import/export.
//! - Define the document-creation primitive the export path calls into.
//!
//! # Invariants
//! - Only `text` pages participate in import.
//! - Page creation is the single side-effecting call into the host; all
//!   other core operations are pure flag-storage transformations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::note::NoteText;

/// Journal page kind accepted by the import path.
pub const TEXT_PAGE_KIND: &str = "text";

/// An existing journal page as exposed by the host document collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPage {
    /// Host-assigned document identifier.
    pub id: String,
    pub name: String,
    /// Serialized as `type` to match the host schema.
    #[serde(rename = "type")]
    pub kind: String,
    pub sort: i64,
    pub text: NoteText,
    /// Arbitrary host metadata carried alongside the page.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Payload for one journal page to be created by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJournalPage {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sort: i64,
    pub text: NoteText,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Failure reported by the host document collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Target container does not exist or is not writable.
    ContainerNotFound(String),
    /// Host refused the creation request.
    Rejected(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContainerNotFound(container) => {
                write!(f, "journal container not found: {container}")
            }
            Self::Rejected(reason) => write!(f, "journal page creation rejected: {reason}"),
        }
    }
}

impl Error for HostError {}

/// Document-creation primitive over a host journal collection.
///
/// Implemented by the embedding host glue; tests use an in-memory mock.
pub trait JournalCollection {
    /// Creates one child page inside `container` and returns the created
    /// document.
    fn create_page(&mut self, container: &str, page: NewJournalPage)
        -> Result<JournalPage, HostError>;
}
