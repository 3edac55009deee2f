use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Health check with the current session mode
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: state.router.mode(),
        document: state.router.active_document(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
