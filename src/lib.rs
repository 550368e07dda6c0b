pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::config::StorageConfig;
use crate::services::candidates::CandidateStore;
use crate::services::chunk_store::ChunkStore;
use crate::services::range::RangeRetrieval;
use crate::services::registry::ObjectRegistry;
use crate::services::upload::UploadService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::candidates::create_candidate,
        handlers::candidates::upload_video,
        handlers::candidates::get_candidate,
        handlers::files::download_resume,
        handlers::files::stream_video,
        handlers::health::health_check,
    ),
    components(
        schemas(
            handlers::candidates::CreateCandidateResponse,
            handlers::candidates::UploadVideoResponse,
            handlers::health::HealthResponse,
            models::Candidate,
            models::CandidateForm,
        )
    ),
    tags(
        (name = "candidates", description = "Candidate submission endpoints"),
        (name = "files", description = "Stored file retrieval endpoints"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: StorageConfig,
    pub store: Arc<ChunkStore>,
    pub registry: Arc<ObjectRegistry>,
    pub candidates: Arc<CandidateStore>,
    pub uploads: Arc<UploadService>,
    pub range: Arc<RangeRetrieval>,
}

impl AppState {
    /// Wires every component against one pool handle; constructed once at
    /// startup and cloned into handlers by the router.
    pub fn new(db: SqlitePool, config: StorageConfig) -> Self {
        let store = Arc::new(ChunkStore::new(db.clone(), config.chunk_size));
        let registry = Arc::new(ObjectRegistry::new(db.clone()));
        let candidates = Arc::new(CandidateStore::new(db.clone()));
        let uploads = Arc::new(UploadService::new(store.clone(), candidates.clone(), &config));
        let range = Arc::new(RangeRetrieval::new(registry.clone()));

        Self {
            db,
            config,
            store,
            registry,
            candidates,
            uploads,
            range,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_body_size();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .route("/candidate", post(handlers::candidates::create_candidate))
        .route("/candidate/:id", get(handlers::candidates::get_candidate))
        .route(
            "/candidate/:id/video",
            post(handlers::candidates::upload_video),
        )
        .route("/file/resume/:file_id", get(handlers::files::download_resume))
        .route("/file/video/:file_id", get(handlers::files::stream_video))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
