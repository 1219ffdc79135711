use crate::models::{datetime_to_timestamp, timestamp_to_datetime};
use crate::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// A stored key/value slot
#[derive(Debug, Clone, PartialEq)]
pub struct KvRecord {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct KvRepository;

impl KvRepository {
    /// Insert or replace the value stored under `key`
    pub fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, datetime_to_timestamp(&Utc::now())],
        )?;

        Ok(())
    }

    /// Get the record stored under `key`, if any
    pub fn get(conn: &Connection, key: &str) -> Result<Option<KvRecord>> {
        let record = conn
            .query_row(
                "SELECT key, value, updated_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| {
                    Ok(KvRecord {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: timestamp_to_datetime(row.get(2)?),
                    })
                },
            )
            .optional()?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use tempfile::tempdir;

    fn setup_test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(&db_path);
        let conn = db.create().unwrap();
        (dir, conn)
    }

    #[test]
    fn test_put_and_get() {
        let (_dir, conn) = setup_test_db();

        KvRepository::put(&conn, "favorites", "{}").unwrap();

        let record = KvRepository::get(&conn, "favorites").unwrap().unwrap();
        assert_eq!(record.key, "favorites");
        assert_eq!(record.value, "{}");
    }

    #[test]
    fn test_put_overwrites() {
        let (_dir, conn) = setup_test_db();

        KvRepository::put(&conn, "favorites", "first").unwrap();
        KvRepository::put(&conn, "favorites", "second").unwrap();

        let record = KvRepository::get(&conn, "favorites").unwrap().unwrap();
        assert_eq!(record.value, "second");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_missing() {
        let (_dir, conn) = setup_test_db();
        assert!(KvRepository::get(&conn, "nothing").unwrap().is_none());
    }
}
