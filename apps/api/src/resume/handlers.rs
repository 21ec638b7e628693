use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::upload::{process_upload, read_upload_form};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub resume: ResumeRow,
    pub message: &'static str,
}

/// POST /api/upload-resume
///
/// Multipart fields: `file` (required) and `userId` (optional, must be the signed-in user).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let resume = process_upload(&state, &auth, form).await?;

    Ok(Json(UploadResponse {
        success: true,
        resume,
        message: "Resume uploaded and parsed successfully!",
    }))
}
