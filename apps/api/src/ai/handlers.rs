//! `POST /api/ai`: relays a single resume file to the model and returns its JSON verbatim.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::ai::GeminiError;
use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

impl IntoResponse for GeminiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GeminiError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Server configuration error: API key not found." }),
            ),
            GeminiError::Api { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({
                    "error": "Failed to get a response from the AI model.",
                    "details": body
                }),
            ),
            GeminiError::EmptyContent { full_response } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "No content was returned from the API.",
                    "full_response": full_response
                }),
            ),
            GeminiError::Parse { raw_text, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to parse the extracted data as JSON.",
                    "raw_text": raw_text
                }),
            ),
            GeminiError::Http(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "An unexpected error occurred on the server.",
                    "details": e.to_string()
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// POST /api/ai
///
/// Multipart field `resume`. Success returns the model's JSON as-is.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file: Option<(bytes::Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        file = Some((data, mime_type));
        break;
    }

    let Some((data, mime_type)) = file else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No resume file uploaded." })),
        )
            .into_response());
    };

    let response = match state.parser.parse(&data, &mime_type).await {
        Ok(parsed) => Json::<Value>(parsed).into_response(),
        Err(e) => {
            tracing::warn!("Resume parsing failed: {e}");
            e.into_response()
        }
    };
    Ok(response)
}
