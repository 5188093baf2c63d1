//! JSON-file backed store with lazy flush
//!
//! Reads and writes hit an in-memory map; the map is written to disk only on
//! [`KeyValueStore::flush`], either from the periodic flush task or when a
//! caller needs durability before the process may be suspended.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
};

use tracing::{debug, info, warn};

use super::{KeyValueStore, MemoryStore, StoreError, StoreValue};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: MemoryStore,
    dirty: AtomicBool,
    /// Held for a whole flush; every flush shares one temp file
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`; a missing or unreadable file yields an empty store
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => {
                info!("Loaded {} store entries from {:?}", entries.len(), path);
                entries
            }
            Err(e) => {
                warn!("Starting with an empty store: {}", e);
                HashMap::new()
            }
        };

        Self {
            path,
            entries: MemoryStore::with_entries(entries),
            dirty: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    /// Whether there are writes not yet flushed to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn write_file(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.entries.entries())?;
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, StoreValue>, String> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read store file {:?}: {}", path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse store file {:?}: {}", path, e))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.entries.get(key)
    }

    fn set(&self, key: &str, value: StoreValue) {
        self.entries.set(key, value);
        self.dirty.store(true, Ordering::Release);
    }

    fn remove(&self, key: &str) {
        if self.entries.contains(key) {
            self.entries.remove(key);
            self.dirty.store(true, Ordering::Release);
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        // A flush that finds the store clean must not return while another is mid-write
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("Flushing store to {:?}", self.path);
        self.write_file().inspect_err(|_| {
            self.dirty.store(true, Ordering::Release);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::{sync::Arc, thread};

    #[test]
    fn flush_then_reopen_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        let started = Utc.with_ymd_and_hms(2024, 5, 2, 3, 4, 5).unwrap();

        let store = FileStore::open(&path);
        store.set("sleepIsRunning", StoreValue::Flag(true));
        store.set("sleepStartTime", StoreValue::Timestamp(started));
        store.set("sleepElapsed", StoreValue::Duration(61.5));
        assert!(store.is_dirty());
        store.flush().unwrap();
        assert!(!store.is_dirty());

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_flag("sleepIsRunning"), Some(true));
        assert_eq!(reopened.get_timestamp("sleepStartTime"), Some(started));
        assert_eq!(reopened.get_duration("sleepElapsed"), Some(61.5));
    }

    #[test]
    fn unflushed_writes_are_not_durable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");

        let store = FileStore::open(&path);
        store.set("breastfeedingIsRunning", StoreValue::Flag(true));
        drop(store);

        let reopened = FileStore::open(&path);
        assert!(reopened.get("breastfeedingIsRunning").is_none());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get("sleepIsRunning").is_none());
    }

    #[test]
    fn concurrent_flushes_do_not_race_on_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        let store = Arc::new(FileStore::open(&path));

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..200 {
                        store.set(
                            &format!("worker{worker}Elapsed"),
                            StoreValue::Duration(i as f64),
                        );
                        store.flush().unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let reopened = FileStore::open(&path);
        for worker in 0..8 {
            assert_eq!(
                reopened.get_duration(&format!("worker{worker}Elapsed")),
                Some(199.0)
            );
        }
    }

    #[test]
    fn removing_missing_key_keeps_store_clean() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("timers.json"));
        store.remove("sleepElapsed");
        assert!(!store.is_dirty());
    }
}
