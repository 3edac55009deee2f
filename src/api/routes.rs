use crate::api::handlers::{ask, health, upload};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "DocChat API", description = "Chat with an assistant, or upload a document and ask about it"),
    paths(upload::upload, ask::ask, health::health),
    components(schemas(
        crate::types::AskRequest,
        crate::types::AskResponse,
        crate::types::UploadForm,
        crate::types::UploadResponse,
        crate::types::ErrorResponse,
        crate::types::HealthResponse,
        crate::types::SessionMode,
        crate::types::DocumentInfo
    )),
    tags(
        (name = "chat", description = "Question answering"),
        (name = "documents", description = "Document upload"),
        (name = "system", description = "Health and metadata")
    )
)]
pub struct ApiDoc;

pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/ask", post(ask::ask))
        .route("/health", get(health::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
