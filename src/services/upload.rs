use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use thiserror::Error;

use super::candidates::CandidateStore;
use super::chunk_store::{ChunkStore, StoreError};
use crate::config::StorageConfig;
use crate::models::{Candidate, CandidateForm};
use crate::utils::validation::{ValidationError, sanitize_filename, validate_candidate_form};

pub const RESUME_BUCKET: &str = "resumes";
pub const VIDEO_BUCKET: &str = "videos";

const RESUME_CONTENT_TYPES: &[&str] = &["application/pdf"];
const VIDEO_CONTENT_TYPES: &[&str] = &["video/webm", "video/mp4", "video/x-matroska"];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("file of {size} bytes exceeds the {limit} byte limit for '{bucket}'")]
    TooLarge {
        bucket: &'static str,
        size: usize,
        limit: usize,
    },

    #[error("candidate {0} not found")]
    CandidateNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// An inbound file as received at the transport boundary: declared name and
/// content type from the multipart part, plus the fully buffered payload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub declared_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Media type with any parameters (e.g. `;codecs=vp8`) stripped.
    pub fn essence_type(&self) -> String {
        self.content_type
            .parse::<mime::Mime>()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .unwrap_or_else(|_| {
                self.content_type
                    .split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_ascii_lowercase()
            })
    }
}

/// Per-bucket acceptance rules, checked before any chunk is written.
#[derive(Debug, Clone, Copy)]
pub struct BucketPolicy {
    pub bucket: &'static str,
    pub allowed_types: &'static [&'static str],
    pub max_size: usize,
    type_error: &'static str,
}

impl BucketPolicy {
    pub fn resumes(config: &StorageConfig) -> Self {
        Self {
            bucket: RESUME_BUCKET,
            allowed_types: RESUME_CONTENT_TYPES,
            max_size: config.resume_max_size,
            type_error: "Resume must be a PDF.",
        }
    }

    pub fn videos(config: &StorageConfig) -> Self {
        Self {
            bucket: VIDEO_BUCKET,
            allowed_types: VIDEO_CONTENT_TYPES,
            max_size: config.video_max_size,
            type_error: "Unsupported video format",
        }
    }

    pub fn check(&self, file: &UploadedFile) -> Result<(), UploadError> {
        let essence = file.essence_type();
        if !self.allowed_types.contains(&essence.as_str()) {
            return Err(UploadError::Validation(ValidationError {
                code: "UNSUPPORTED_CONTENT_TYPE",
                message: self.type_error.to_string(),
            }));
        }

        if file.size_bytes() > self.max_size {
            return Err(UploadError::TooLarge {
                bucket: self.bucket,
                size: file.size_bytes(),
                limit: self.max_size,
            });
        }

        Ok(())
    }
}

/// Two-phase upload pipeline: all validation happens before any durable
/// write, and the candidate row only ever references committed files.
pub struct UploadService {
    store: Arc<ChunkStore>,
    candidates: Arc<CandidateStore>,
    resume_policy: BucketPolicy,
    video_policy: BucketPolicy,
}

impl UploadService {
    pub fn new(
        store: Arc<ChunkStore>,
        candidates: Arc<CandidateStore>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            store,
            candidates,
            resume_policy: BucketPolicy::resumes(config),
            video_policy: BucketPolicy::videos(config),
        }
    }

    /// Phase one of the submission: validate the form and the resume, write
    /// the resume through the chunk store, then create the candidate row
    /// referencing it. A candidate is never persisted without a resume.
    pub async fn upload_resume(
        &self,
        form: &CandidateForm,
        file: UploadedFile,
    ) -> Result<Candidate, UploadError> {
        let fields = validate_candidate_form(form)?;
        self.resume_policy.check(&file)?;

        let filename =
            sanitize_filename(file.declared_name.as_deref().unwrap_or(""), "resume.pdf");
        let file_id = self
            .store
            .put(
                RESUME_BUCKET,
                &filename,
                &file.content_type,
                json!({ "fieldname": "resume" }),
                &file.bytes,
            )
            .await?;

        let candidate = self.candidates.create_with_resume(&fields, &file_id).await?;
        tracing::info!(
            "candidate {} created with resume {} ({} bytes)",
            candidate.id,
            file_id,
            file.bytes.len()
        );

        Ok(candidate)
    }

    /// Phase two: requires an existing candidate before any chunk is
    /// written, then stores the video and links its id into the row.
    pub async fn upload_video(
        &self,
        candidate_id: &str,
        file: UploadedFile,
    ) -> Result<String, UploadError> {
        if self.candidates.find(candidate_id).await?.is_none() {
            return Err(UploadError::CandidateNotFound(candidate_id.to_string()));
        }

        self.video_policy.check(&file)?;

        let filename =
            sanitize_filename(file.declared_name.as_deref().unwrap_or(""), "video.webm");
        let file_id = self
            .store
            .put(
                VIDEO_BUCKET,
                &filename,
                &file.content_type,
                json!({ "candidateId": candidate_id }),
                &file.bytes,
            )
            .await?;

        if !self.candidates.attach_video(candidate_id, &file_id).await? {
            return Err(UploadError::CandidateNotFound(candidate_id.to_string()));
        }

        tracing::info!("video {} attached to candidate {}", file_id, candidate_id);
        Ok(file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            declared_name: Some("f".to_string()),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn resume_policy_requires_pdf() {
        let policy = BucketPolicy::resumes(&StorageConfig::default());
        assert!(policy.check(&file("application/pdf", 1024)).is_ok());
        assert!(matches!(
            policy.check(&file("text/plain", 1024)),
            Err(UploadError::Validation(_))
        ));
        assert!(matches!(
            policy.check(&file("application/pdf", 6 * 1024 * 1024)),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn video_policy_accepts_allowed_formats() {
        let policy = BucketPolicy::videos(&StorageConfig::default());
        for ok in ["video/webm", "video/mp4", "video/x-matroska", "VIDEO/MP4"] {
            assert!(policy.check(&file(ok, 1024)).is_ok(), "{ok}");
        }
        assert!(policy.check(&file("image/png", 1024)).is_err());
        assert!(policy.check(&file("video/quicktime", 1024)).is_err());
    }

    #[test]
    fn essence_type_strips_codec_parameters() {
        assert_eq!(
            file("video/webm;codecs=vp8,opus", 1).essence_type(),
            "video/webm"
        );
        assert_eq!(file("application/pdf", 1).essence_type(), "application/pdf");
    }
}
