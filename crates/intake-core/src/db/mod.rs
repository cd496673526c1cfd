//! Database layer for patient intake.

mod appointments;
mod files;
mod patients;
mod schema;

pub use files::StoredFile;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` in a transaction, committed only when it returns `Ok`.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(DbError::from)?;
        let value = f(self)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::open_in_memory().unwrap();
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in ["appointments", "patient_identities", "patients", "stored_files"] {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
    }

    fn count_files(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM stored_files", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        use crate::models::{FileAttachment, IdentificationUpload};

        let db = Database::open_in_memory().unwrap();
        let upload = IdentificationUpload::package(FileAttachment::new("id.png", "image/png", vec![1]));

        let result: DbResult<()> = db.transaction(|db| {
            db.insert_file(&upload)?;
            Err(DbError::Constraint("rejected".into()))
        });
        assert!(result.is_err());
        assert_eq!(count_files(&db), 0);

        db.transaction(|db| db.insert_file(&upload).map(|_| ())).unwrap();
        assert_eq!(count_files(&db), 1);
    }

    #[test]
    fn test_open_on_disk_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.db");
        Database::open(&path).unwrap();
        // Schema creation is idempotent
        assert!(Database::open(&path).is_ok());
    }
}
