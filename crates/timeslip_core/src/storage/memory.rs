//! In-memory slot store with an optional byte quota.

use super::{KeyValueStore, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// Process-local slot store.
///
/// With a quota set, writes fail the way browser local storage does once the
/// combined size of keys and payloads would exceed it.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|(slot_key, _)| slot_key.as_str() != key)
            .map(|(slot_key, payload)| slot_key.len() + payload.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota_bytes {
            let requested = self.used_bytes_excluding(key) + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested,
                    quota,
                });
            }
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
