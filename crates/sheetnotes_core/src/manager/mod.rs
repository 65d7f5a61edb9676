//! Manager services over a parent's flag storage.
//!
//! # Responsibility
//! - Orchestrate load-mutate-store sequences for note/category collections.
//! - Keep UI collaborators decoupled from storage layout and entity
//!   validation details.
//!
//! # Invariants
//! - Collections are loaded whole, mutated locally, and written back whole.
//! - Failed operations leave previously persisted state untouched.

pub mod category_manager;
pub mod note_manager;

pub(crate) fn parent_is_blank(parent: &str) -> bool {
    parent.trim().is_empty()
}
