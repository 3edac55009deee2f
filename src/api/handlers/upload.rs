use crate::{
    api::error_response,
    ingest,
    types::{AppError, DocumentInfo, ErrorResponse, Result, UploadResponse},
    AppState,
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::Path;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Upload a document
///
/// Saves the file, extracts its text, builds a fresh index and switches the
/// session to document mode. Conversation history is kept.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = crate::types::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document indexed, or an error object when strict status codes are off", body = UploadResponse),
        (status = 413, description = "File exceeds the upload limit", body = ErrorResponse),
        (status = 422, description = "No text could be extracted", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let result = match multipart {
        Ok(multipart) => process_upload(&state, multipart).await,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::FileTooLarge {
                max_bytes: state.config.server.max_upload_bytes,
            })
        }
        Err(rejection) => Err(AppError::InvalidInput(rejection.to_string())),
    };

    match result {
        Ok((info, saved_as)) => Json(UploadResponse {
            message: format!(
                "File '{}' uploaded and saved as '{}' ({} chunks).",
                info.source, saved_as, info.chunk_count
            ),
            saved_as,
        })
        .into_response(),
        Err(e) => error_response(&state, e),
    }
}

/// Returns the indexed document and the name it was stored under.
async fn process_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(DocumentInfo, String)> {
    let max_bytes = state.config.server.max_upload_bytes;
    let too_large = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::FileTooLarge { max_bytes }
        } else {
            AppError::InvalidInput(format!("Malformed multipart body: {}", e))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(too_large)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(too_large)?;

        if bytes.len() > max_bytes {
            return Err(AppError::FileTooLarge { max_bytes });
        }
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
        }

        let path =
            ingest::save_upload(Path::new(&state.config.server.upload_dir), &file_name, &bytes)
                .await?;
        let saved_as = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = ingest::extract_text(&path).await?;

        let info = state.router.upload(&file_name, &text).await?;
        return Ok((info, saved_as));
    }

    Err(AppError::InvalidInput(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}
