use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::session::AuthUser;
use crate::resume::store::upsert_user;
use crate::state::AppState;
use crate::views::{render_template, AuthErrorView, SignInView};

/// Error codes carried to `/auth/error?error=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Configuration,
    AccessDenied,
    Verification,
    Default,
}

impl AuthErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthErrorKind::Configuration => "Configuration",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::Verification => "Verification",
            AuthErrorKind::Default => "Default",
        }
    }

    pub fn parse(code: Option<&str>) -> Self {
        match code {
            Some("Configuration") => AuthErrorKind::Configuration,
            Some("AccessDenied") => AuthErrorKind::AccessDenied,
            Some("Verification") => AuthErrorKind::Verification,
            _ => AuthErrorKind::Default,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AuthErrorKind::Configuration => "There is a problem with the server configuration.",
            AuthErrorKind::AccessDenied => "You cancelled the authentication process.",
            AuthErrorKind::Verification => {
                "The verification token has expired or has already been used."
            }
            AuthErrorKind::Default => "An error occurred during authentication.",
        }
    }

    fn redirect(self) -> Response {
        Redirect::to(&format!("/auth/error?error={}", self.as_str())).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthErrorQuery {
    pub error: Option<String>,
}

/// GET /auth/signin
pub async fn handle_signin_page(user: Option<AuthUser>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render_template(SignInView)
}

/// GET /auth/google
///
/// Records a one-time `state` and sends the browser to Google's consent screen.
pub async fn handle_google_start(State(state): State<AppState>) -> Response {
    let oauth_state = match state.oauth_states.issue().await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to record OAuth state: {e:?}");
            return AuthErrorKind::Configuration.redirect();
        }
    };

    match state.oauth.authorize_url(&oauth_state) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            error!("Failed to build authorization URL: {e}");
            AuthErrorKind::Configuration.redirect()
        }
    }
}

/// GET /auth/callback
pub async fn handle_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match complete_sign_in(&state, query).await {
        Ok(token) => (
            [(header::SET_COOKIE, state.sessions.cookie(&token))],
            Redirect::to("/dashboard"),
        )
            .into_response(),
        Err(kind) => kind.redirect(),
    }
}

async fn complete_sign_in(state: &AppState, query: CallbackQuery) -> Result<String, AuthErrorKind> {
    if let Some(provider_error) = query.error {
        warn!("OAuth provider returned error: {provider_error}");
        return Err(if provider_error == "access_denied" {
            AuthErrorKind::AccessDenied
        } else {
            AuthErrorKind::Default
        });
    }

    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        return Err(AuthErrorKind::Verification);
    };

    let known = state.oauth_states.consume(&oauth_state).await.map_err(|e| {
        error!("Failed to check OAuth state: {e:?}");
        AuthErrorKind::Configuration
    })?;
    if !known {
        warn!("Rejected unknown or expired OAuth state");
        return Err(AuthErrorKind::Verification);
    }

    let tokens = state.oauth.exchange_code(&code).await.map_err(|e| {
        error!("OAuth code exchange failed: {e}");
        AuthErrorKind::Configuration
    })?;
    let profile = state
        .oauth
        .fetch_profile(&tokens.access_token)
        .await
        .map_err(|e| {
            error!("Fetching Google profile failed: {e}");
            AuthErrorKind::Configuration
        })?;

    if profile.email_verified == Some(false) {
        warn!("Refusing sign-in with unverified email");
        return Err(AuthErrorKind::AccessDenied);
    }
    let email = profile
        .email
        .filter(|e| !e.is_empty())
        .ok_or(AuthErrorKind::AccessDenied)?;

    let user = upsert_user(
        &state.db,
        &email,
        profile.name.as_deref(),
        profile.picture.as_deref(),
    )
    .await
    .map_err(|e| {
        error!("Failed to upsert user on sign-in: {e}");
        AuthErrorKind::Default
    })?;

    info!("User {} signed in", user.id);
    state
        .sessions
        .issue(user.id, &user.email)
        .map_err(|_| AuthErrorKind::Configuration)
}

/// POST /auth/signout
pub async fn handle_signout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /auth/error
pub async fn handle_auth_error_page(Query(query): Query<AuthErrorQuery>) -> Response {
    let kind = AuthErrorKind::parse(query.error.as_deref());
    render_template(AuthErrorView {
        message: kind.message(),
        is_configuration: kind == AuthErrorKind::Configuration,
    })
}
