use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::ResumeParser;
use crate::auth::oauth::GoogleOAuth;
use crate::auth::session::SessionKeys;
use crate::auth::state_store::OAuthStateStore;
use crate::config::Config;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Where raw resume files go. Default: S3 / MinIO.
    pub blobs: Arc<dyn BlobStore>,
    /// Turns a resume file into structured JSON. Default: Gemini.
    pub parser: Arc<dyn ResumeParser>,
    pub oauth: GoogleOAuth,
    pub oauth_states: OAuthStateStore,
    pub sessions: SessionKeys,
    pub config: Config,
}
