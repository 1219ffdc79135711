use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Connection, Database, KvRepository};
use crate::{Error, Result};

/// A durable key/value slot store.
///
/// Implementations are moved onto the persistence worker thread, so they
/// only need to be `Send`.
pub trait KeyValueStorage: Send {
    /// Read the value stored under `key`; `Ok(None)` if nothing was stored.
    fn read(&mut self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed slots in the `kv_store` table
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Database::new(path).get_or_create()?;
        Ok(Self::new(conn))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn read(&mut self, key: &str) -> Result<Option<String>> {
        Ok(KvRepository::get(&self.conn, key)?.map(|record| record.value))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        KvRepository::put(&self.conn, key, value)
    }
}

/// In-memory slots. Clones share the same slots, which lets a test hand one
/// clone to a store and inspect or reuse the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw value of a slot
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Seed a slot directly, bypassing `write`
    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Make subsequent writes fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db");

        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            assert_eq!(storage.read("slot").unwrap(), None);
            storage.write("slot", "value").unwrap();
        }

        let mut reopened = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(reopened.read("slot").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_memory_storage_clones_share_slots() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer.write("slot", "value").unwrap();
        assert_eq!(storage.get("slot").as_deref(), Some("value"));
    }

    #[test]
    fn test_memory_storage_write_failure() {
        let mut storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        assert!(storage.write("slot", "value").is_err());
        assert_eq!(storage.get("slot"), None);

        storage.set_fail_writes(false);
        storage.write("slot", "value").unwrap();
        assert_eq!(storage.get("slot").as_deref(), Some("value"));
    }
}
