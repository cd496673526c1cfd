//! Stored file operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::IdentificationUpload;

/// A stored file row without its content.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub checksum: String,
    pub size: usize,
    pub created_at: String,
}

impl Database {
    /// Store an uploaded file under a fresh ID.
    pub fn insert_file(&self, upload: &IdentificationUpload) -> DbResult<StoredFile> {
        let stored = StoredFile {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            checksum: upload.checksum(),
            size: upload.size(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.conn.execute(
            r#"
            INSERT INTO stored_files (id, file_name, content_type, checksum, size, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stored.id,
                stored.file_name,
                stored.content_type,
                stored.checksum,
                stored.size as i64,
                upload.blob,
                stored.created_at,
            ],
        )?;
        Ok(stored)
    }}
