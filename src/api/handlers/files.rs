use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

use crate::AppState;
use crate::api::error::AppError;
use crate::services::range::ByteRange;
use crate::services::upload::{RESUME_BUCKET, VIDEO_BUCKET};

#[utoipa::path(
    get,
    path = "/file/resume/{file_id}",
    params(
        ("file_id" = String, Path, description = "Resume file ID")
    ),
    responses(
        (status = 200, description = "Resume download stream"),
        (status = 400, description = "Invalid file id"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn download_resume(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, AppError> {
    if Uuid::parse_str(&file_id).is_err() {
        return Err(AppError::BadRequest("Invalid file id".to_string()));
    }

    let descriptor = state.registry.describe(RESUME_BUCKET, &file_id).await?;
    let body = Body::from_stream(state.store.stream(&descriptor));

    let headers = [
        (header::CONTENT_TYPE, descriptor.content_type.clone()),
        (header::CONTENT_LENGTH, descriptor.length.to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition("attachment", &descriptor.filename),
        ),
    ];

    Ok((headers, body).into_response())
}

#[utoipa::path(
    get,
    path = "/file/video/{file_id}",
    params(
        ("file_id" = String, Path, description = "Video file ID"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. bytes=0-999")
    ),
    responses(
        (status = 200, description = "Full video stream"),
        (status = 206, description = "Requested byte range"),
        (status = 400, description = "Invalid file id"),
        (status = 404, description = "File not found"),
        (status = 416, description = "Range not satisfiable")
    ),
    tag = "files"
)]
pub async fn stream_video(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if Uuid::parse_str(&file_id).is_err() {
        return Err(AppError::BadRequest("Invalid file id".to_string()));
    }

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let resolved = state
        .range
        .resolve(VIDEO_BUCKET, &file_id, range_header)
        .await?;
    let descriptor = resolved.descriptor;

    match resolved.range {
        Some(ByteRange { start, end }) => {
            let body = Body::from_stream(state.store.stream_range(&descriptor, start, end));
            let headers = [
                (
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, descriptor.length),
                ),
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::CONTENT_LENGTH, (end - start + 1).to_string()),
                (header::CONTENT_TYPE, descriptor.content_type.clone()),
            ];

            Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
        }
        None => {
            let body = Body::from_stream(state.store.stream(&descriptor));
            let headers = [
                (header::CONTENT_TYPE, descriptor.content_type.clone()),
                (header::CONTENT_LENGTH, descriptor.length.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ];

            Ok((headers, body).into_response())
        }
    }
}

/// Content-Disposition with an ASCII fallback plus an RFC 5987 encoded
/// variant for non-ASCII filenames.
fn content_disposition(disposition_type: &str, filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition_type, fallback_filename, encoded_filename
    )
}
