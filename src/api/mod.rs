//! HTTP API Handlers and Routes
//!
//! # API Endpoints
//!
//! - `POST /upload` - multipart `file` field; indexes the document and switches to document mode
//! - `POST /ask` - form field `question`; returns `{question, answer}`
//! - `GET /health` - server status and the active document, if any
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Errors
//!
//! Failures are returned as `{"error": "..."}`. With `server.strict_status_codes`
//! off (the default) they carry HTTP 200, matching existing clients; with it on
//! they carry the error's own status. Oversized uploads are always 413.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{AppError, ErrorResponse};
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Render `err` according to the configured status code policy.
pub fn error_response(state: &AppState, err: AppError) -> Response {
    render_error(state.config.server.strict_status_codes, err)
}

pub fn render_error(strict: bool, err: AppError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, %status, "Request failed");
    } else {
        tracing::warn!(error = %err, %status, "Request rejected");
    }

    if strict || matches!(err, AppError::FileTooLarge { .. }) {
        return err.into_response();
    }

    (
        StatusCode::OK,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
