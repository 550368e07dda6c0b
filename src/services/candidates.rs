use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Candidate, CandidateFields};

/// Owns the candidate collection. A row is written here exactly twice at
/// most: once at creation, carrying its resume reference, and once more to
/// attach a video reference.
pub struct CandidateStore {
    db: SqlitePool,
}

impl CandidateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_with_resume(
        &self,
        fields: &CandidateFields,
        resume_file_id: &str,
    ) -> Result<Candidate, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO candidates \
             (id, first_name, last_name, position_applied, current_position, experience_years, resume_file_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.position_applied)
        .bind(&fields.current_position)
        .bind(fields.experience_years)
        .bind(resume_file_id)
        .bind(created_at)
        .execute(&self.db)
        .await?;

        Ok(Candidate {
            id,
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            position_applied: fields.position_applied.clone(),
            current_position: fields.current_position.clone(),
            experience_years: fields.experience_years,
            resume_file_id: resume_file_id.to_string(),
            video_file_id: None,
            created_at: Some(created_at),
        })
    }

    pub async fn find(&self, id: &str) -> Result<Option<Candidate>, sqlx::Error> {
        sqlx::query_as::<_, Candidate>(
            "SELECT id, first_name, last_name, position_applied, current_position, experience_years, resume_file_id, video_file_id, created_at \
             FROM candidates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    /// Links a committed video file into the candidate row. Returns false if
    /// the row is gone. Concurrent uploads for the same id are not
    /// serialized; the last writer's reference wins.
    pub async fn attach_video(&self, id: &str, video_file_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE candidates SET video_file_id = ? WHERE id = ?")
            .bind(video_file_id)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
