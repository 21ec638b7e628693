use askama::Template;

use crate::models::portfolio::PortfolioRow;
use crate::models::resume::ResumeRow;
use crate::models::user::User;
use crate::portfolio::templates::TemplateId;
use crate::resume::upload::{ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingView {
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "auth/signin.html")]
pub struct SignInView;

#[derive(Template)]
#[template(path = "auth/error.html")]
pub struct AuthErrorView {
    pub message: &'static str,
    /// Shows the OAuth setup checklist.
    pub is_configuration: bool,
}

#[derive(Template)]
#[template(path = "portfolio/unavailable.html")]
pub struct UnavailableView;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub message: String,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub struct ResumeSummary {
    pub filename: String,
    pub uploaded_at: String,
    pub original_url: String,
    pub parsed_name: String,
    pub parse_error: Option<String>,
}

impl From<&ResumeRow> for ResumeSummary {
    fn from(resume: &ResumeRow) -> Self {
        Self {
            filename: resume.filename.clone(),
            uploaded_at: resume.created_at.format("%b %-d, %Y %H:%M UTC").to_string(),
            original_url: resume.original_url.clone(),
            parsed_name: resume
                .parsed_data
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            parse_error: resume.parse_error().map(String::from),
        }
    }
}

pub struct TemplateChoice {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardView {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub image: String,
    pub resume: Option<ResumeSummary>,
    pub templates: Vec<TemplateChoice>,
    pub is_published: bool,
    pub preview_url: String,
    pub public_url: String,
    pub accept: String,
    pub max_upload_mb: usize,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn new(
        user: &User,
        resume: Option<&ResumeRow>,
        settings: Option<&PortfolioRow>,
        public_url: String,
        default_avatar: &str,
    ) -> Self {
        let current = settings.and_then(|s| s.template_id.parse::<TemplateId>().ok());
        let templates = TemplateId::ALL
            .into_iter()
            .map(|t| TemplateChoice {
                id: t.as_str(),
                name: t.display_name(),
                description: t.description(),
                selected: current == Some(t),
            })
            .collect();

        Self {
            user_id: user.id.to_string(),
            display_name: user.name.clone().unwrap_or_else(|| user.email.clone()),
            email: user.email.clone(),
            image: user
                .image
                .clone()
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| default_avatar.to_string()),
            resume: resume.map(ResumeSummary::from),
            templates,
            is_published: settings.is_some_and(|s| s.is_published),
            preview_url: format!("/preview/{}", user.id),
            public_url,
            accept: ALLOWED_CONTENT_TYPES.join(","),
            max_upload_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
            notice: None,
            error: None,
        }
    }

    pub fn with_banners(mut self, notice: Option<String>, error: Option<String>) -> Self {
        self.notice = notice.filter(|n| !n.is_empty());
        self.error = error.filter(|e| !e.is_empty());
        self
    }
}
