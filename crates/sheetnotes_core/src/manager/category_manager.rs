//! Category manager service.
//!
//! # Responsibility
//! - CRUD over a parent's persisted category list.
//! - Enforce case-insensitive name uniqueness and default-category
//!   protection above the entity layer.
//! - Cascade category deletion into referencing notes.
//!
//! # Invariants
//! - `get_all` is always sorted alphabetically by name; per-category
//!   `ordering` governs note display only.
//! - The sole remaining category and the default category cannot be
//!   deleted; the default category cannot be renamed.
//! - On delete, every referencing note is uncategorized before the
//!   category-list removal is persisted.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::manager::parent_is_blank;
use crate::model::category::{Category, CategoryKey, CategoryPatch, DEFAULT_CATEGORY_NAME};
use crate::model::note::Note;
use crate::model::ValidationError;
use crate::store::{
    read_flag, write_flag, FlagStore, StoreError, CATEGORIES_KEY, CATEGORY_ORDER_KEY, NOTES_KEY,
};

/// Errors from category manager operations.
#[derive(Debug)]
pub enum CategoryError {
    /// A required identifier argument is missing or malformed.
    InvalidArgument(&'static str),
    /// Name collides case-insensitively with an existing sibling.
    DuplicateName(String),
    /// Referenced key does not exist in the parent's category list.
    NotFound(CategoryKey),
    /// The sole remaining category cannot be deleted.
    LastCategory,
    /// The default category cannot be renamed.
    DefaultCategoryRename,
    /// The default category cannot be deleted.
    DefaultCategoryDelete,
    /// Entity-level invariant violation.
    Validation(ValidationError),
    /// Storage-layer failure.
    Store(StoreError),
}

impl Display for CategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(argument) => {
                write!(f, "argument `{argument}` is missing or malformed")
            }
            Self::DuplicateName(name) => write!(f, "category name already exists: {name}"),
            Self::NotFound(key) => write!(f, "category not found: {key}"),
            Self::LastCategory => write!(f, "the last remaining category cannot be deleted"),
            Self::DefaultCategoryRename => write!(
                f,
                "the default category `{DEFAULT_CATEGORY_NAME}` cannot be renamed"
            ),
            Self::DefaultCategoryDelete => write!(
                f,
                "the default category `{DEFAULT_CATEGORY_NAME}` cannot be deleted"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CategoryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CategoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Category manager over one flag store.
pub struct CategoryManager<'s, S: FlagStore> {
    store: &'s mut S,
}

impl<'s, S: FlagStore> CategoryManager<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Creates one category from partial data and persists it.
    pub fn create(&mut self, parent: &str, patch: CategoryPatch) -> Result<Category, CategoryError> {
        self.require_parent(parent)?;
        let mut categories = self.load_categories(parent)?;
        let category = Category::new(patch)?;
        if Category::name_exists(&categories, &category.name, None) {
            return Err(CategoryError::DuplicateName(category.name));
        }

        categories.push(category.clone());
        self.save_categories(parent, &categories)?;
        Ok(category)
    }

    /// Gets one category by key, `None` when absent.
    pub fn get(&self, parent: &str, key: CategoryKey) -> Result<Option<Category>, CategoryError> {
        self.require_parent(parent)?;
        if key.is_nil() {
            return Err(CategoryError::InvalidArgument("key"));
        }
        let categories = self.load_categories(parent)?;
        Ok(categories.into_iter().find(|category| category.key == key))
    }

    /// Lists all categories sorted alphabetically by name.
    pub fn get_all(&self, parent: &str) -> Result<Vec<Category>, CategoryError> {
        self.require_parent(parent)?;
        let mut categories = self.load_categories(parent)?;
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }

    /// Case-insensitive lookup by name, `None` when absent.
    pub fn get_by_name(&self, parent: &str, name: &str) -> Result<Option<Category>, CategoryError> {
        self.require_parent(parent)?;
        if name.trim().is_empty() {
            return Err(CategoryError::InvalidArgument("name"));
        }
        let needle = name.to_lowercase();
        let categories = self.load_categories(parent)?;
        Ok(categories
            .into_iter()
            .find(|category| category.name.to_lowercase() == needle))
    }

    /// Number of persisted categories.
    pub fn count(&self, parent: &str) -> Result<usize, CategoryError> {
        self.require_parent(parent)?;
        Ok(self.load_categories(parent)?.len())
    }

    /// Applies a partial update to one category and persists the list.
    pub fn update(
        &mut self,
        parent: &str,
        key: CategoryKey,
        patch: CategoryPatch,
    ) -> Result<Category, CategoryError> {
        self.require_parent(parent)?;
        let mut categories = self.load_categories(parent)?;
        let index = categories
            .iter()
            .position(|category| category.key == key)
            .ok_or(CategoryError::NotFound(key))?;

        if let Some(name) = patch.name.as_deref() {
            if categories[index].is_default() && name != DEFAULT_CATEGORY_NAME {
                return Err(CategoryError::DefaultCategoryRename);
            }
            if Category::name_exists(&categories, name, Some(key)) {
                return Err(CategoryError::DuplicateName(name.to_string()));
            }
        }

        categories[index].update(patch)?;
        let updated = categories[index].clone();
        self.save_categories(parent, &categories)?;
        Ok(updated)
    }

    /// Deletes one category, uncategorizing every referencing note first.
    pub fn delete(&mut self, parent: &str, key: CategoryKey) -> Result<(), CategoryError> {
        self.require_parent(parent)?;
        let mut categories = self.load_categories(parent)?;
        let index = categories
            .iter()
            .position(|category| category.key == key)
            .ok_or(CategoryError::NotFound(key))?;
        if categories[index].is_default() {
            return Err(CategoryError::DefaultCategoryDelete);
        }
        if categories.len() == 1 {
            return Err(CategoryError::LastCategory);
        }

        let mut notes: Vec<Note> = read_flag(&*self.store, parent, NOTES_KEY)?.unwrap_or_default();
        let mut cascaded = false;
        for note in notes.iter_mut() {
            if note.category == Some(key) {
                note.category = None;
                cascaded = true;
            }
        }
        if cascaded {
            write_flag(&mut *self.store, parent, NOTES_KEY, &notes)?;
        }

        categories.remove(index);
        self.save_categories(parent, &categories)?;
        Ok(())
    }

    /// Persists a manual category ordering hint.
    ///
    /// Display order stays alphabetical; the hint is kept for collaborators
    /// that want to honor it later.
    pub fn reorder(&mut self, parent: &str, keys: &[CategoryKey]) -> Result<(), CategoryError> {
        self.require_parent(parent)?;
        let categories = self.load_categories(parent)?;
        for key in keys {
            if !categories.iter().any(|category| category.key == *key) {
                return Err(CategoryError::NotFound(*key));
            }
        }
        write_flag(&mut *self.store, parent, CATEGORY_ORDER_KEY, &keys)?;
        Ok(())
    }

    /// Creates the default "Notes" category when it is missing and at least
    /// one uncategorized note exists. Idempotent, safe on every render.
    ///
    /// Returns the created category, or `None` when nothing was done.
    pub fn ensure_default(&mut self, parent: &str) -> Result<Option<Category>, CategoryError> {
        self.require_parent(parent)?;
        let mut categories = self.load_categories(parent)?;
        if Category::name_exists(&categories, DEFAULT_CATEGORY_NAME, None) {
            return Ok(None);
        }

        let notes: Vec<Note> = read_flag(&*self.store, parent, NOTES_KEY)?.unwrap_or_default();
        if !notes.iter().any(|note| note.category.is_none()) {
            return Ok(None);
        }

        let category = Category::new(CategoryPatch::named(DEFAULT_CATEGORY_NAME))?;
        categories.insert(0, category.clone());
        self.save_categories(parent, &categories)?;
        Ok(Some(category))
    }

    fn require_parent(&self, parent: &str) -> Result<(), CategoryError> {
        if parent_is_blank(parent) {
            return Err(CategoryError::InvalidArgument("parent"));
        }
        Ok(())
    }

    fn load_categories(&self, parent: &str) -> Result<Vec<Category>, CategoryError> {
        Ok(read_flag(&*self.store, parent, CATEGORIES_KEY)?.unwrap_or_default())
    }

    fn save_categories(
        &mut self,
        parent: &str,
        categories: &[Category],
    ) -> Result<(), CategoryError> {
        write_flag(&mut *self.store, parent, CATEGORIES_KEY, &categories)?;
        Ok(())
    }
}
