use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A submitted applicant. `resume_file_id` is assigned at creation and never
/// changes; `video_file_id` starts empty and is attached by a later upload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position_applied: String,
    pub current_position: String,
    pub experience_years: f64,
    pub resume_file_id: String,
    pub video_file_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Committed metadata for one stored object. The row is written only after
/// every chunk is durable; its presence is what makes the file visible.
#[derive(Debug, Clone, FromRow)]
pub struct FileDescriptor {
    pub id: String,
    pub bucket: String,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub chunk_size: i64,
    pub chunk_count: i64,
    /// JSON object, stored as text (e.g. `{"candidateId": "..."}`).
    pub metadata: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// One bounded fragment of an object's bytes.
#[derive(Debug, Clone, FromRow)]
pub struct Chunk {
    pub file_id: String,
    pub seq: i64,
    pub data: Vec<u8>,
}

/// Scalar fields of the submission form as received, still unvalidated.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateForm {
    pub first_name: String,
    pub last_name: String,
    pub position_applied: String,
    pub current_position: String,
    pub experience_years: String,
}

/// Candidate fields after validation, ready for persistence.
#[derive(Debug, Clone)]
pub struct CandidateFields {
    pub first_name: String,
    pub last_name: String,
    pub position_applied: String,
    pub current_position: String,
    pub experience_years: f64,
}
