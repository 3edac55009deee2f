use crate::{
    api::error_response,
    types::{AppError, AskRequest, AskResponse, ErrorResponse},
    AppState,
};
use axum::{
    extract::{rejection::FormRejection, State},
    response::{IntoResponse, Response},
    Form, Json,
};

/// Ask a question
///
/// Answered from the uploaded document when one is active, otherwise by the
/// general chat assistant.
#[utoipa::path(
    post,
    path = "/ask",
    request_body(content = AskRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Answer, or an error object when strict status codes are off", body = AskResponse),
        (status = 400, description = "Missing or empty question", body = ErrorResponse),
        (status = 502, description = "Model or embedding provider failed", body = ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn ask(
    State(state): State<AppState>,
    form: Result<Form<AskRequest>, FormRejection>,
) -> Response {
    let question = match form {
        Ok(Form(request)) => request.question,
        Err(rejection) => {
            return error_response(
                &state,
                AppError::InvalidInput(format!("Expected form field 'question': {}", rejection)),
            )
        }
    };

    match state.router.route(&question).await {
        Ok(answer) => Json(AskResponse { question, answer }).into_response(),
        Err(e) => error_response(&state, e),
    }
}
