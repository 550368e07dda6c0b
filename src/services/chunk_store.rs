use bytes::Bytes;
use chrono::Utc;
use futures::stream::Stream;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Chunk, FileDescriptor};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file {file_id} not found in bucket '{bucket}'")]
    NotFound { bucket: String, file_id: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Chunked object store over the shared pool. Objects are written as
/// fixed-size chunk rows followed by a descriptor row; the descriptor is the
/// visibility gate, so a reader either sees a complete object or none.
pub struct ChunkStore {
    db: SqlitePool,
    chunk_size: usize,
}

impl ChunkStore {
    pub fn new(db: SqlitePool, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self { db, chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Stores a whole buffer: every chunk first, the descriptor last. An
    /// interrupted write leaves only unreachable chunk rows behind — the
    /// descriptor never lands, so the object stays absent.
    pub async fn put(
        &self,
        bucket: &str,
        filename: &str,
        content_type: &str,
        metadata: serde_json::Value,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let file_id = Uuid::new_v4().to_string();
        let chunk_count = bytes.len().div_ceil(self.chunk_size);

        for (seq, payload) in bytes.chunks(self.chunk_size).enumerate() {
            sqlx::query("INSERT INTO chunks (file_id, seq, data) VALUES (?, ?, ?)")
                .bind(&file_id)
                .bind(seq as i64)
                .bind(payload)
                .execute(&self.db)
                .await?;
        }

        sqlx::query(
            "INSERT INTO file_descriptors \
             (id, bucket, filename, content_type, length, chunk_size, chunk_count, metadata, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file_id)
        .bind(bucket)
        .bind(filename)
        .bind(content_type)
        .bind(bytes.len() as i64)
        .bind(self.chunk_size as i64)
        .bind(chunk_count as i64)
        .bind(metadata.to_string())
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        tracing::debug!(
            "stored {} bytes as {} chunks in bucket '{}' (file_id={})",
            bytes.len(),
            chunk_count,
            bucket,
            file_id
        );

        Ok(file_id)
    }

    /// Full object as a lazy, ordered stream of chunk payloads.
    pub fn stream(
        &self,
        file: &FileDescriptor,
    ) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        let end = (file.length - 1).max(0) as u64;
        self.stream_range(file, 0, end)
    }

    /// Bytes in the inclusive window `[start, end]`, reconstructed in
    /// sequence-index order with the first and last chunk payloads trimmed.
    /// Bounds must already be validated against the descriptor length.
    pub fn stream_range(
        &self,
        file: &FileDescriptor,
        start: u64,
        end: u64,
    ) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        let db = self.db.clone();
        let file_id = file.id.clone();
        let length = file.length as u64;
        let chunk_size = file.chunk_size as u64;

        async_stream::try_stream! {
            if length > 0 {
                let first = start / chunk_size;
                let last = end / chunk_size;

                for seq in first..=last {
                    let chunk: Option<Chunk> = sqlx::query_as(
                        "SELECT file_id, seq, data FROM chunks WHERE file_id = ? AND seq = ?",
                    )
                    .bind(&file_id)
                    .bind(seq as i64)
                    .fetch_optional(&db)
                    .await
                    .map_err(std::io::Error::other)?;

                    let chunk = chunk.ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            format!("missing chunk {seq} for file {file_id}"),
                        )
                    })?;

                    let chunk_start = seq * chunk_size;
                    let lo = start.saturating_sub(chunk_start) as usize;
                    let hi = std::cmp::min(chunk.data.len() as u64, end - chunk_start + 1) as usize;

                    yield Bytes::from(chunk.data).slice(lo..hi);
                }
            }
        }
    }
}
