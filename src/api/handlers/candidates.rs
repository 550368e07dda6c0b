use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::Field},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::api::error::AppError;
use crate::models::{Candidate, CandidateForm};
use crate::services::upload::UploadedFile;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateResponse {
    pub message: String,
    pub candidate_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadVideoResponse {
    pub message: String,
    pub video_file_id: String,
}

#[utoipa::path(
    post,
    path = "/candidate",
    request_body(content = CandidateForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Candidate created with resume attached", body = CreateCandidateResponse),
        (status = 400, description = "Missing/invalid fields, missing resume, or wrong content type"),
        (status = 413, description = "Resume exceeds the size limit"),
        (status = 500, description = "Storage failure")
    ),
    tag = "candidates"
)]
pub async fn create_candidate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateCandidateResponse>, AppError> {
    let mut form = CandidateForm::default();
    let mut resume: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "firstName" => form.first_name = read_text(field).await?,
            "lastName" => form.last_name = read_text(field).await?,
            "positionApplied" => form.position_applied = read_text(field).await?,
            "currentPosition" => form.current_position = read_text(field).await?,
            "experienceYears" => form.experience_years = read_text(field).await?,
            "resume" => resume = Some(read_file(field).await?),
            _ => {}
        }
    }

    let resume =
        resume.ok_or_else(|| AppError::BadRequest("Resume (PDF) is required.".to_string()))?;

    let candidate = state.uploads.upload_resume(&form, resume).await?;

    Ok(Json(CreateCandidateResponse {
        message: "Candidate saved".to_string(),
        candidate_id: candidate.id,
    }))
}

#[utoipa::path(
    post,
    path = "/candidate/{id}/video",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Video stored and linked", body = UploadVideoResponse),
        (status = 400, description = "Invalid id, missing file, or unsupported format"),
        (status = 404, description = "Candidate not found"),
        (status = 413, description = "Video exceeds the size limit"),
        (status = 500, description = "Storage failure")
    ),
    tag = "candidates"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadVideoResponse>, AppError> {
    if Uuid::parse_str(&id).is_err() {
        return Err(AppError::BadRequest("Invalid candidate id".to_string()));
    }

    let mut video: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name().unwrap_or_default() == "video" {
            video = Some(read_file(field).await?);
        }
    }

    let video = video.ok_or_else(|| AppError::BadRequest("Video is required".to_string()))?;

    let video_file_id = state.uploads.upload_video(&id, video).await?;

    Ok(Json(UploadVideoResponse {
        message: "Video uploaded".to_string(),
        video_file_id,
    }))
}

#[utoipa::path(
    get,
    path = "/candidate/{id}",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate record", body = Candidate),
        (status = 404, description = "Candidate not found")
    ),
    tag = "candidates"
)]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = state
        .candidates
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

    Ok(Json(candidate))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let declared_name = field.file_name().map(|s| s.to_string());
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(UploadedFile {
        declared_name,
        content_type,
        bytes,
    })
}
