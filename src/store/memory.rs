//! In-memory store, used by tests and as the backing map of the file store

use std::{collections::HashMap, sync::RwLock};

use super::{KeyValueStore, StoreError, StoreValue};

/// Key-value store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoreValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with entries
    pub fn with_entries(entries: HashMap<String, StoreValue>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Copy of every entry currently held
    pub fn entries(&self) -> HashMap<String, StoreValue> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: StoreValue) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value);
            }
            Err(e) => tracing::error!("Failed to lock store for write of {}: {}", key, e),
        }
    }

    fn remove(&self, key: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.remove(key);
            }
            Err(e) => tracing::error!("Failed to lock store for removal of {}: {}", key, e),
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("sleepIsRunning", StoreValue::Flag(true));
        assert_eq!(store.get_flag("sleepIsRunning"), Some(true));

        store.remove("sleepIsRunning");
        assert!(store.get("sleepIsRunning").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn typed_getters_ignore_mismatched_values() {
        let store = MemoryStore::new();
        store.set("sleepElapsed", StoreValue::Flag(true));
        assert_eq!(store.get_duration("sleepElapsed"), None);
        assert_eq!(store.get_timestamp("sleepElapsed"), None);
    }

    #[test]
    fn negative_durations_read_as_zero() {
        let store = MemoryStore::new();
        store.set("sleepElapsed", StoreValue::Duration(-4.0));
        assert_eq!(store.get_duration("sleepElapsed"), Some(0.0));
    }
}
