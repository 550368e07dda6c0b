use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use candidate_portal::config::StorageConfig;
use candidate_portal::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

async fn setup() -> (axum::Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let state = AppState::new(pool.clone(), StorageConfig::default());
    (create_app(state), pool)
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn jane_doe_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("firstName", "Jane"),
        ("lastName", "Doe"),
        ("positionApplied", "Engineer"),
        ("currentPosition", "Analyst"),
        ("experienceYears", "3"),
    ]
}

fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.extend((data.len()..len).map(|i| (i % 251) as u8));
    data
}

fn webm_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 247) as u8).collect()
}

async fn post_multipart(app: &axum::Router, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| panic!("non-JSON response: {:?}", String::from_utf8_lossy(&bytes)));
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_submission_flow() {
    let (app, _pool) = setup().await;

    // 1. Create candidate with a 2 MiB resume
    let body = multipart_body(
        &jane_doe_fields(),
        &[(
            "resume",
            "jane_doe_cv.pdf",
            "application/pdf",
            &pdf_bytes(2 * 1024 * 1024),
        )],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::OK, "create failed: {json}");
    assert_eq!(json["message"], "Candidate saved");
    let candidate_id = json["candidateId"].as_str().unwrap().to_string();
    assert!(!candidate_id.is_empty());

    // 2. Resume is linked, video is not
    let (status, json) = get_json(&app, &format!("/candidate/{candidate_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["firstName"], "Jane");
    assert_eq!(json["lastName"], "Doe");
    assert_eq!(json["experienceYears"], 3.0);
    assert!(!json["resumeFileId"].as_str().unwrap().is_empty());
    assert!(json["videoFileId"].is_null());

    // 3. Upload a 10 MiB webm video
    let body = multipart_body(
        &[],
        &[(
            "video",
            "intro.webm",
            "video/webm",
            &webm_bytes(10 * 1024 * 1024),
        )],
    );
    let (status, json) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::OK, "video upload failed: {json}");
    assert_eq!(json["message"], "Video uploaded");
    let video_file_id = json["videoFileId"].as_str().unwrap().to_string();

    // 4. Video reference now visible on the candidate
    let (status, json) = get_json(&app, &format!("/candidate/{candidate_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["videoFileId"].as_str().unwrap(), video_file_id);
}

#[tokio::test]
async fn test_resume_must_be_pdf_and_nothing_persists() {
    let (app, pool) = setup().await;

    let body = multipart_body(
        &jane_doe_fields(),
        &[("resume", "cv.txt", "text/plain", b"not a pdf".as_slice())],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Resume must be a PDF.");

    let candidates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(candidates, 0);

    let descriptors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_descriptors")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(descriptors, 0);
}

#[tokio::test]
async fn test_oversize_resume_is_rejected() {
    let (app, pool) = setup().await;

    let body = multipart_body(
        &jane_doe_fields(),
        &[(
            "resume",
            "big.pdf",
            "application/pdf",
            &pdf_bytes(6 * 1024 * 1024),
        )],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["message"], "File too large");

    let candidates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(candidates, 0);
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let (app, _pool) = setup().await;

    // No lastName
    let body = multipart_body(
        &[
            ("firstName", "Jane"),
            ("positionApplied", "Engineer"),
            ("currentPosition", "Analyst"),
            ("experienceYears", "3"),
        ],
        &[("resume", "cv.pdf", "application/pdf", &pdf_bytes(1024))],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "All fields are required.");

    // Negative experience
    let body = multipart_body(
        &[
            ("firstName", "Jane"),
            ("lastName", "Doe"),
            ("positionApplied", "Engineer"),
            ("currentPosition", "Analyst"),
            ("experienceYears", "-2"),
        ],
        &[("resume", "cv.pdf", "application/pdf", &pdf_bytes(1024))],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Experience in Years must be a non-negative number."
    );

    // No resume part at all
    let body = multipart_body(&jane_doe_fields(), &[]);
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Resume (PDF) is required.");
}

#[tokio::test]
async fn test_video_requires_existing_candidate() {
    let (app, pool) = setup().await;

    // Unknown (but well-formed) candidate id
    let body = multipart_body(
        &[],
        &[("video", "intro.webm", "video/webm", &webm_bytes(1024))],
    );
    let unknown = uuid::Uuid::new_v4();
    let (status, json) = post_multipart(&app, &format!("/candidate/{unknown}/video"), body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Candidate not found");

    // Lifecycle ordering: no file written for the failed upload
    let descriptors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_descriptors")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(descriptors, 0);

    // Malformed id
    let body = multipart_body(
        &[],
        &[("video", "intro.webm", "video/webm", &webm_bytes(1024))],
    );
    let (status, json) = post_multipart(&app, "/candidate/not-a-uuid/video", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid candidate id");
}

#[tokio::test]
async fn test_video_format_policy() {
    let (app, _pool) = setup().await;

    let body = multipart_body(
        &jane_doe_fields(),
        &[("resume", "cv.pdf", "application/pdf", &pdf_bytes(1024))],
    );
    let (status, json) = post_multipart(&app, "/candidate", body).await;
    assert_eq!(status, StatusCode::OK);
    let candidate_id = json["candidateId"].as_str().unwrap().to_string();

    // Wrong content type
    let body = multipart_body(&[], &[("video", "pic.png", "image/png", &webm_bytes(1024))]);
    let (status, json) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Unsupported video format");

    // Codec parameters on the declared type are fine
    let body = multipart_body(
        &[],
        &[(
            "video",
            "intro.webm",
            "video/webm;codecs=vp8,opus",
            &webm_bytes(1024),
        )],
    );
    let (status, _) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::OK);

    // Missing file part
    let body = multipart_body(&[], &[]);
    let (status, json) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Video is required");
}

#[tokio::test]
async fn test_second_video_upload_overwrites_reference() {
    let (app, _pool) = setup().await;

    let body = multipart_body(
        &jane_doe_fields(),
        &[("resume", "cv.pdf", "application/pdf", &pdf_bytes(1024))],
    );
    let (_, json) = post_multipart(&app, "/candidate", body).await;
    let candidate_id = json["candidateId"].as_str().unwrap().to_string();

    let body = multipart_body(&[], &[("video", "a.webm", "video/webm", &webm_bytes(512))]);
    let (status, json) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::OK);
    let first = json["videoFileId"].as_str().unwrap().to_string();

    let body = multipart_body(&[], &[("video", "b.webm", "video/webm", &webm_bytes(512))]);
    let (status, json) = post_multipart(&app, &format!("/candidate/{candidate_id}/video"), body).await;
    assert_eq!(status, StatusCode::OK);
    let second = json["videoFileId"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    // Last writer wins
    let (_, json) = get_json(&app, &format!("/candidate/{candidate_id}")).await;
    assert_eq!(json["videoFileId"].as_str().unwrap(), second);
}

#[tokio::test]
async fn test_unknown_candidate_lookup_is_404() {
    let (app, _pool) = setup().await;

    let (status, json) = get_json(&app, &format!("/candidate/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Candidate not found");
}

#[tokio::test]
async fn test_health_probe() {
    let (app, _pool) = setup().await;

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["database"], "connected");
}
