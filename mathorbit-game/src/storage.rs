//! In-memory [`KeyValueStore`] for tests and simulations.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::KeyValueStore;

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("write to `{0}` rejected")]
    WriteRejected(String),
}

/// Shared map of records. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    /// Seed a raw record, bypassing write rejection.
    pub fn insert(&self, key: &str, value: &str) {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    /// Make every subsequent `set` fail, as a full quota would.
    pub fn fail_writes(&self, fail: bool) {
        self.reject_writes.set(fail);
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.reject_writes.get() {
            return Err(MemoryStoreError::WriteRejected(key.to_string()));
        }
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_records() {
        let store = MemoryStore::default();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        assert!(other.get("missing").unwrap().is_none());
    }

    #[test]
    fn rejected_writes_leave_record_untouched() {
        let store = MemoryStore::default();
        store.insert("k", "old");
        store.fail_writes(true);
        assert!(store.set("k", "new").is_err());
        assert_eq!(store.raw("k").as_deref(), Some("old"));
    }
}
