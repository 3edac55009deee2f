use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

/// Multipart body of `POST /upload`, for the API documentation.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// Document contents (PDF or UTF-8 text)
    #[schema(value_type = String)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Stored file name under `server.upload_dir`, `{unix_ts}_{sanitized name}`
    pub saved_as: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub mode: SessionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentInfo>,
    pub version: String,
}

/// Which path the session router currently dispatches questions to.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    General,
    Document,
}

/// Metadata describing the active document session.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DocumentInfo {
    pub document_id: String,
    pub source: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

// ============= Conversation Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("No document content is indexed")]
    EmptyIndex,

    #[error("Agent exceeded the limit of {limit} tool invocations")]
    AgentLoopExceeded { limit: usize },

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("File too large. Max {max_bytes} bytes allowed.")]
    FileTooLarge { max_bytes: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Upload of '{file}' was superseded by a newer upload")]
    Superseded { file: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status used when errors are reported with proper status codes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidParameters(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::EmbeddingProvider(_) | AppError::ProviderUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::EmptyIndex | AppError::Superseded { .. } => StatusCode::CONFLICT,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AgentLoopExceeded { .. } | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_too_large_maps_to_413() {
        let err = AppError::FileTooLarge {
            max_bytes: 10 * 1024 * 1024,
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("10485760"));
    }

    #[test]
    fn test_provider_errors_map_to_bad_gateway() {
        assert_eq!(
            AppError::ProviderUnavailable("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::EmbeddingProvider("bad vector".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_agent_loop_exceeded_message() {
        let err = AppError::AgentLoopExceeded { limit: 5 };
        assert_eq!(
            err.to_string(),
            "Agent exceeded the limit of 5 tool invocations"
        );
    }

    #[test]
    fn test_message_role_strings() {
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Tool.as_str(), "tool");
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_session_mode_serializes_lowercase() {
        let json = serde_json::to_string(&SessionMode::Document).unwrap();
        assert_eq!(json, "\"document\"");
    }
}
