//! Durable key-value store
//!
//! The timer subsystem mirrors every state transition into a process-wide
//! string-keyed store so that sessions can be rebuilt after a restart. The
//! store is injected as a trait object; tests use [`MemoryStore`], the daemon
//! uses [`FileStore`].

pub mod file;
pub mod keys;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use keys::SlotKeys;
pub use memory::MemoryStore;

/// A primitive value held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoreValue {
    Timestamp(DateTime<Utc>),
    /// Seconds
    Duration(f64),
    Flag(bool),
}

/// Errors raised while persisting the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Process-wide string-keyed store with synchronous writes
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<StoreValue>;

    fn set(&self, key: &str, value: StoreValue);

    fn remove(&self, key: &str);

    /// Force buffered writes to durable storage before returning
    fn flush(&self) -> Result<(), StoreError>;

    fn get_flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(StoreValue::Flag(flag)) => Some(flag),
            _ => None,
        }
    }

    fn get_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(StoreValue::Timestamp(at)) => Some(at),
            _ => None,
        }
    }

    fn get_duration(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(StoreValue::Duration(seconds)) if seconds.is_finite() => Some(seconds.max(0.0)),
            _ => None,
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
