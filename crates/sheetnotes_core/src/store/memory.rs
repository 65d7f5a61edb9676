//! In-memory flag store.
//!
//! Used by tests and by embedding hosts that own their persistence and only
//! need the manager semantics.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::store::{FlagStore, StoreResult};

/// BTreeMap-backed flag store with the same whole-value semantics as the
/// SQLite implementation.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: BTreeMap<(String, String, String), Value>,
    writes: u64,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_field` calls observed, for write-avoidance assertions.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl FlagStore for MemoryFlagStore {
    fn get_field(&self, parent: &str, scope: &str, key: &str) -> StoreResult<Option<Value>> {
        let entry = (parent.to_string(), scope.to_string(), key.to_string());
        Ok(self.values.get(&entry).cloned())
    }

    fn set_field(
        &mut self,
        parent: &str,
        scope: &str,
        key: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let entry = (parent.to_string(), scope.to_string(), key.to_string());
        self.values.insert(entry, value.clone());
        self.writes += 1;
        Ok(())
    }
}
