//! Category domain model.
//!
//! # Responsibility
//! - Represent a named, ordered grouping for notes on one parent entity.
//! - Enforce name invariants before a category ever reaches storage.
//!
//! # Invariants
//! - `key` is stable and never altered after construction.
//! - `name` is non-blank and at most [`CATEGORY_NAME_MAX_CHARS`] characters.
//! - At most one category per parent carries [`DEFAULT_CATEGORY_NAME`]; that
//!   category is the fallback for uncategorized notes and is protected from
//!   rename/delete by the manager layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ValidationError;

/// Stable identifier for a category within one parent's flag scope.
pub type CategoryKey = Uuid;

/// Name of the distinguished default/fallback category.
pub const DEFAULT_CATEGORY_NAME: &str = "Notes";

/// Maximum category name length, counted in characters.
pub const CATEGORY_NAME_MAX_CHARS: usize = 50;

const NEW_CATEGORY_NAME: &str = "New Category";

/// How notes inside one category are displayed.
///
/// This governs note display only; the category list itself is always
/// presented alphabetically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOrdering {
    /// Notes sorted by name.
    #[default]
    Alphabetical,
    /// Notes sorted by their numeric `sort` value.
    Manual,
}

/// Partial category fields merged over defaults (construction) or over
/// current state (update).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub ordering: Option<NoteOrdering>,
    pub collapsed: Option<bool>,
}

impl CategoryPatch {
    /// Convenience patch carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Validated category record. The serde shape is exactly the persisted
/// flag-storage shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub name: String,
    pub ordering: NoteOrdering,
    pub collapsed: bool,
}

impl Category {
    /// Builds a category by merging `patch` over defaults: fresh random key,
    /// name "New Category", alphabetical ordering, not collapsed.
    pub fn new(patch: CategoryPatch) -> Result<Self, ValidationError> {
        let category = Self {
            key: Uuid::new_v4(),
            name: patch.name.unwrap_or_else(|| NEW_CATEGORY_NAME.to_string()),
            ordering: patch.ordering.unwrap_or_default(),
            collapsed: patch.collapsed.unwrap_or(false),
        };
        category.validate()?;
        Ok(category)
    }

    /// Merges `patch` over the current state and re-validates.
    ///
    /// The key is never altered. On validation failure the category is left
    /// untouched.
    pub fn update(&mut self, patch: CategoryPatch) -> Result<(), ValidationError> {
        let mut candidate = self.clone();
        if let Some(name) = patch.name {
            candidate.name = name;
        }
        if let Some(ordering) = patch.ordering {
            candidate.ordering = ordering;
        }
        if let Some(collapsed) = patch.collapsed {
            candidate.collapsed = collapsed;
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Returns an independent copy under a freshly generated key.
    pub fn duplicate(&self) -> Self {
        Self {
            key: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// Whether this is the protected default/fallback category.
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_CATEGORY_NAME
    }

    /// Checks all field-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.is_nil() {
            return Err(ValidationError::NilKey("category"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName("category"));
        }
        let chars = self.name.chars().count();
        if chars > CATEGORY_NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong {
                actual: chars,
                max: CATEGORY_NAME_MAX_CHARS,
            });
        }
        Ok(())
    }

    /// Case-insensitive name membership test across `categories`.
    ///
    /// `exclude_key` skips one record, so a category can update to its own
    /// current name without reporting itself as a collision.
    pub fn name_exists(
        categories: &[Category],
        name: &str,
        exclude_key: Option<CategoryKey>,
    ) -> bool {
        let needle = name.trim().to_lowercase();
        categories.iter().any(|category| {
            exclude_key != Some(category.key) && category.name.to_lowercase() == needle
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Category, CategoryPatch, NoteOrdering, CATEGORY_NAME_MAX_CHARS, DEFAULT_CATEGORY_NAME,
    };
    use crate::model::ValidationError;
    use uuid::Uuid;

    fn combat() -> Category {
        Category::new(CategoryPatch::named("Combat")).expect("category should build")
    }

    #[test]
    fn new_merges_patch_over_defaults() {
        let category = Category::new(CategoryPatch::default()).unwrap();
        assert!(!category.key.is_nil());
        assert_eq!(category.name, "New Category");
        assert_eq!(category.ordering, NoteOrdering::Alphabetical);
        assert!(!category.collapsed);

        let manual = Category::new(CategoryPatch {
            name: Some("Loot".to_string()),
            ordering: Some(NoteOrdering::Manual),
            collapsed: Some(true),
        })
        .unwrap();
        assert_eq!(manual.name, "Loot");
        assert_eq!(manual.ordering, NoteOrdering::Manual);
        assert!(manual.collapsed);
    }

    #[test]
    fn new_rejects_blank_and_overlong_names() {
        let blank = Category::new(CategoryPatch::named("   "));
        assert!(matches!(blank, Err(ValidationError::BlankName(_))));

        let long_name = "x".repeat(CATEGORY_NAME_MAX_CHARS + 1);
        let too_long = Category::new(CategoryPatch::named(long_name));
        assert!(matches!(too_long, Err(ValidationError::NameTooLong { .. })));
    }

    #[test]
    fn update_preserves_key_and_rolls_back_on_invalid_patch() {
        let mut category = combat();
        let key = category.key;

        category
            .update(CategoryPatch {
                ordering: Some(NoteOrdering::Manual),
                ..CategoryPatch::default()
            })
            .unwrap();
        assert_eq!(category.key, key);
        assert_eq!(category.name, "Combat");
        assert_eq!(category.ordering, NoteOrdering::Manual);

        let err = category.update(CategoryPatch::named("")).unwrap_err();
        assert!(matches!(err, ValidationError::BlankName(_)));
        assert_eq!(category.name, "Combat");
    }

    #[test]
    fn duplicate_gets_fresh_key_and_equal_fields() {
        let category = combat();
        let copy = category.duplicate();
        assert_ne!(copy.key, category.key);
        assert_eq!(copy.name, category.name);
        assert_eq!(copy.ordering, category.ordering);
        assert_eq!(copy.collapsed, category.collapsed);
    }

    #[test]
    fn serde_shape_round_trips() {
        let category = combat();
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["ordering"], "alphabetical");
        let back: Category = serde_json::from_value(value).unwrap();
        assert_eq!(back, category);
    }

    #[test]
    fn name_exists_is_case_insensitive_and_honors_exclude_key() {
        let category = combat();
        let list = vec![category.clone()];
        assert!(Category::name_exists(&list, "COMBAT", None));
        assert!(Category::name_exists(&list, "combat", None));
        assert!(!Category::name_exists(&list, "COMBAT", Some(category.key)));
        assert!(!Category::name_exists(&list, "Lore", None));
        assert!(Category::name_exists(&list, "COMBAT", Some(Uuid::new_v4())));
    }

    #[test]
    fn is_default_matches_distinguished_name_only() {
        let default = Category::new(CategoryPatch::named(DEFAULT_CATEGORY_NAME)).unwrap();
        assert!(default.is_default());
        assert!(!combat().is_default());
    }
}
