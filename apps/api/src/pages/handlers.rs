//! HTML routes: landing, dashboard and its forms, preview and the public portfolio page.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::portfolio::data::{load_bundle, PortfolioBundle};
use crate::portfolio::settings::{apply_update, find_portfolio, PortfolioUpdate};
use crate::resume::store::{find_user, latest_resume};
use crate::resume::upload::{process_upload, read_upload_form};
use crate::state::AppState;
use crate::views::render::render_error;
use crate::views::{
    render_portfolio, render_template, render_with_status, DashboardView, LandingView,
    PortfolioView, UnavailableView,
};

/// An `AppError` shown as an HTML error page instead of JSON.
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError(e)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        PageError(AppError::Database(e))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        render_error(self.0.status(), &self.0.public_message())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

fn to_signin() -> Response {
    Redirect::to("/auth/signin").into_response()
}

/// `/dashboard?{key}={message}`, form-encoded.
fn dashboard_redirect(key: &str, message: &str) -> Response {
    match Url::parse_with_params("http://folio.local/dashboard", &[(key, message)]) {
        Ok(url) => Redirect::to(&format!("{}?{}", url.path(), url.query().unwrap_or_default()))
            .into_response(),
        Err(_) => Redirect::to("/dashboard").into_response(),
    }
}

/// GET /
pub async fn handle_landing(viewer: Option<AuthUser>) -> Response {
    render_template(LandingView {
        signed_in: viewer.is_some(),
    })
}

/// GET /dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Query(banners): Query<BannerQuery>,
) -> Result<Response, PageError> {
    let Some(auth) = viewer else {
        return Ok(to_signin());
    };
    let Some(user) = find_user(&state.db, auth.id).await? else {
        warn!("Session for unknown user {}", auth.id);
        return Ok(to_signin());
    };

    let resume = latest_resume(&state.db, user.id).await?;
    let settings = find_portfolio(&state.db, user.id).await?;

    let view = DashboardView::new(
        &user,
        resume.as_ref(),
        settings.as_ref(),
        state.config.portfolio_url(user.id),
        &state.config.default_avatar_url,
    )
    .with_banners(banners.notice, banners.error);

    Ok(render_template(view))
}

/// POST /dashboard/resume
pub async fn handle_dashboard_upload(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    multipart: Multipart,
) -> Response {
    let Some(auth) = viewer else {
        return to_signin();
    };

    let result = match read_upload_form(multipart).await {
        Ok(form) => process_upload(&state, &auth, form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(resume) => {
            info!("Dashboard upload stored resume {}", resume.id);
            let notice = match resume.parse_error() {
                Some(_) => "Resume uploaded. We could not read every field, please review it.",
                None => "Resume uploaded and parsed successfully!",
            };
            dashboard_redirect("notice", notice)
        }
        Err(e) => dashboard_redirect("error", &e.public_message()),
    }
}

/// POST /dashboard/portfolio
pub async fn handle_dashboard_settings(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Form(update): Form<PortfolioUpdate>,
) -> Response {
    let Some(auth) = viewer else {
        return to_signin();
    };

    match apply_update(&state.db, auth.id, &update).await {
        Ok(portfolio) => {
            let notice = match update.is_published {
                Some(true) => "Portfolio published.".to_string(),
                Some(false) => "Portfolio unpublished.".to_string(),
                None => format!("Template set to {}.", portfolio.template_id),
            };
            dashboard_redirect("notice", &notice)
        }
        Err(e) => dashboard_redirect("error", &e.public_message()),
    }
}

/// GET /preview/:user_id
///
/// The owner's view of their portfolio, published or not.
pub async fn handle_preview(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Response, PageError> {
    let Some(auth) = viewer else {
        return Ok(to_signin());
    };
    if user_id.parse::<Uuid>().ok() != Some(auth.id) {
        return Err(AppError::Forbidden.into());
    }

    match load_bundle(&state.db, auth.id).await? {
        Some(bundle) => Ok(render_bundle(&state, &bundle)),
        None => Ok(render_error(
            StatusCode::NOT_FOUND,
            "Upload a resume to preview your portfolio.",
        )),
    }
}

/// GET /portfolio/:user_id
pub async fn handle_public_portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, PageError> {
    let Ok(user_id) = user_id.parse::<Uuid>() else {
        return Ok(render_with_status(StatusCode::NOT_FOUND, UnavailableView));
    };
    match load_bundle(&state.db, user_id).await? {
        Some(bundle) if bundle.is_published() => Ok(render_bundle(&state, &bundle)),
        _ => Ok(render_with_status(StatusCode::NOT_FOUND, UnavailableView)),
    }
}

fn render_bundle(state: &AppState, bundle: &PortfolioBundle) -> Response {
    let view = PortfolioView::from_parsed(
        &bundle.resume.parsed_data,
        bundle.image_url(&state.config.default_avatar_url),
    );
    render_portfolio(bundle.template(), &view)
}
