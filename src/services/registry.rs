use sqlx::SqlitePool;

use super::chunk_store::StoreError;
use crate::models::FileDescriptor;

/// Lookup over committed descriptors, one logical view per bucket. Response
/// headers (content type, total length) come from here, so they can be sent
/// before any chunk is read.
pub struct ObjectRegistry {
    db: SqlitePool,
}

impl ObjectRegistry {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn describe(&self, bucket: &str, file_id: &str) -> Result<FileDescriptor, StoreError> {
        sqlx::query_as::<_, FileDescriptor>(
            "SELECT id, bucket, filename, content_type, length, chunk_size, chunk_count, metadata, created_at \
             FROM file_descriptors WHERE id = ? AND bucket = ?",
        )
        .bind(file_id)
        .bind(bucket)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            file_id: file_id.to_string(),
        })
    }

    pub async fn exists(&self, bucket: &str, file_id: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_descriptors WHERE id = ? AND bucket = ?",
        )
        .bind(file_id)
        .bind(bucket)
        .fetch_one(&self.db)
        .await?;

        Ok(count > 0)
    }
}
