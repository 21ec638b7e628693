//! Resume upload pipeline: validate → store raw file → parse with the model → persist.
//!
//! Parsing failures never fail the upload. The user gets a placeholder record they can
//! review instead, flagged with `parseError`.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::ResumeParser;
use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::user::User;
use crate::resume::store::{find_user, insert_resume};
use crate::state::AppState;
use crate::storage::{resume_object_key, BlobStore};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Request body limit for upload routes: the file plus multipart framing and form fields.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "application/json",
    "text/plain",
];

const FILE_TOO_LARGE: &str = "File size too large. Maximum 10MB allowed.";

pub const PARSE_ERROR_NOTICE: &str =
    "Could not automatically parse resume content. Please review and edit manually.";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Fields of an upload form. Either may be absent; validation decides what that means.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub user_id: Option<Uuid>,
}

/// Reads the `file` and `userId` fields of a multipart upload.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed upload"))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read upload"))?;
                // Browsers send an empty part when no file was chosen.
                if !data.is_empty() || !filename.is_empty() {
                    form.file = Some(UploadedFile {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            Some("userId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read userId"))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    form.user_id = Some(
                        raw.parse()
                            .map_err(|_| AppError::Validation("User ID is invalid".to_string()))?,
                    );
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// A body cut off by the route limit is an oversized file, whatever field it stopped in.
fn multipart_error(e: MultipartError, context: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(FILE_TOO_LARGE.to_string())
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

/// Checks size and content type.
pub fn validate_upload(file: &UploadedFile) -> Result<(), AppError> {
    if file.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(FILE_TOO_LARGE.to_string()));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload PDF, DOCX, DOC, JSON, or TXT files only."
                .to_string(),
        ));
    }
    Ok(())
}

/// Record stored when the model could not produce usable JSON.
pub fn fallback_parsed_data(user: &User) -> Value {
    json!({
        "name": user.name.clone().unwrap_or_else(|| "Unknown".to_string()),
        "email": user.email,
        "phone": "",
        "summary": "Please edit your profile to add a summary",
        "skills": [],
        "experience": [],
        "education": [],
        "projects": [],
        "parseError": PARSE_ERROR_NOTICE,
    })
}

/// Stores the raw file and parses it, returning the row to insert.
pub async fn store_and_parse(
    blobs: &dyn BlobStore,
    parser: &dyn ResumeParser,
    user: &User,
    file: UploadedFile,
    uploaded_at_millis: i64,
) -> Result<NewResume, AppError> {
    let key = resume_object_key(user.id, uploaded_at_millis, &file.filename);
    let original_url = blobs
        .put(&key, file.data.clone(), &file.content_type)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let parsed_data = match parser.parse(&file.data, &file.content_type).await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Resume parsing failed for user {}: {e}", user.id);
            fallback_parsed_data(user)
        }
    };

    Ok(NewResume {
        user_id: user.id,
        filename: file.filename,
        original_url,
        parsed_data,
    })
}

/// Full upload on behalf of the signed-in user.
pub async fn process_upload(
    state: &AppState,
    auth: &AuthUser,
    form: UploadForm,
) -> Result<ResumeRow, AppError> {
    let user_id = auth.ensure_owner(form.user_id)?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    validate_upload(&file)?;

    let user = find_user(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(
        "Processing upload '{}' ({} bytes, {}) for user {}",
        file.filename,
        file.data.len(),
        file.content_type,
        user.id
    );

    let new_resume = store_and_parse(
        state.blobs.as_ref(),
        state.parser.as_ref(),
        &user,
        file,
        chrono::Utc::now().timestamp_millis(),
    )
    .await?;

    Ok(insert_resume(&state.db, new_resume).await?)
}
