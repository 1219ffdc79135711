use crate::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};

pub type Connection = SqliteConnection;

const SCHEMA_VERSION: i32 = 1;

/// Database manager for the local rickdex state
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    /// Create a new database manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Get a connection to an existing database
    pub fn connect(&self) -> Result<Connection> {
        let conn = SqliteConnection::open(&self.db_path)?;
        self.check_schema_version(&conn)?;
        Ok(conn)
    }

    /// Create a new database and initialize it with the schema
    pub fn create(&self) -> Result<Connection> {
        // Ensure parent directory exists
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = SqliteConnection::open(&self.db_path)?;
        self.initialize_schema(&conn)?;

        Ok(conn)
    }

    /// Initialize the database schema
    fn initialize_schema(&self, conn: &Connection) -> Result<()> {
        let schema = include_str!("../../schema.sql");
        conn.execute_batch(schema)?;
        Ok(())
    }

    /// Check if the database exists
    pub fn exists(&self) -> bool {
        self.db_path.exists()
    }

    /// Get or create a database connection
    pub fn get_or_create(&self) -> Result<Connection> {
        if self.exists() {
            let conn = self.connect()?;
            // Idempotent; picks up tables added since the file was created
            self.initialize_schema(&conn)?;
            Ok(conn)
        } else {
            self.create()
        }
    }

    /// Get the current schema version
    pub fn get_schema_version(&self, conn: &Connection) -> Result<i32> {
        let version: String = conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;

        version
            .parse::<i32>()
            .map_err(|_| Error::InvalidInput("Invalid schema version".to_string()))
    }

    fn check_schema_version(&self, conn: &Connection) -> Result<()> {
        let has_metadata: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'metadata'",
            [],
            |row| row.get(0),
        )?;
        if has_metadata == 0 {
            return Ok(());
        }
        let version = self.get_schema_version(conn)?;
        if version > SCHEMA_VERSION {
            return Err(Error::InvalidInput(format!(
                "Database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creation() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path);
        assert!(!db.exists());

        let conn = db.create().unwrap();
        assert!(db.exists());

        let version = db.get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_database_connect() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path);
        db.create().unwrap();

        let _conn = db.connect().unwrap();
    }

    #[test]
    fn test_get_or_create() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");

        let db = Database::new(&db_path);

        // First call should create
        let _conn1 = db.get_or_create().unwrap();
        assert!(db.exists());

        // Second call should connect
        let _conn2 = db.get_or_create().unwrap();
    }

    #[test]
    fn test_rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path);
        let conn = db.create().unwrap();
        conn.execute("UPDATE metadata SET value = '99' WHERE key = 'schema_version'", [])
            .unwrap();
        drop(conn);

        assert!(matches!(db.connect(), Err(Error::InvalidInput(_))));
    }
}
