//! Everything needed to show one user's portfolio, loaded together.

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;
use crate::models::resume::ResumeRow;
use crate::models::user::User;
use crate::portfolio::settings::find_portfolio;
use crate::portfolio::templates::TemplateId;
use crate::resume::store::{find_user, latest_resume};

#[derive(Debug, Clone)]
pub struct PortfolioBundle {
    pub user: User,
    pub resume: ResumeRow,
    pub settings: Option<PortfolioRow>,
}

impl PortfolioBundle {
    pub fn is_published(&self) -> bool {
        self.settings.as_ref().is_some_and(|s| s.is_published)
    }

    /// The selected layout, if the stored id is one we know.
    pub fn template(&self) -> Option<TemplateId> {
        self.settings
            .as_ref()
            .and_then(|s| s.template_id.parse().ok())
    }

    pub fn image_url<'a>(&'a self, default_avatar: &'a str) -> &'a str {
        self.user
            .image
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(default_avatar)
    }

    /// Owners always see their portfolio; everyone else only once it is published.
    pub fn visible_to(&self, viewer: Option<Uuid>) -> bool {
        viewer == Some(self.user.id) || self.is_published()
    }

    /// The parsed resume merged with display settings, as served by `GET /api/resume/{id}`.
    pub fn to_api_json(&self, default_avatar: &str) -> Value {
        let mut merged = match &self.resume.parsed_data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        merged.insert(
            "image".to_string(),
            Value::String(self.image_url(default_avatar).to_string()),
        );
        merged.insert(
            "templateId".to_string(),
            self.settings
                .as_ref()
                .map(|s| Value::String(s.template_id.clone()))
                .unwrap_or(Value::Null),
        );
        merged.insert("isPublished".to_string(), Value::Bool(self.is_published()));
        Value::Object(merged)
    }
}

/// Loads the user, their latest resume and settings. `None` when either user or resume is missing.
pub async fn load_bundle(pool: &PgPool, user_id: Uuid) -> Result<Option<PortfolioBundle>, AppError> {
    let Some(resume) = latest_resume(pool, user_id).await? else {
        return Ok(None);
    };
    let Some(user) = find_user(pool, user_id).await? else {
        return Ok(None);
    };
    let settings = find_portfolio(pool, user_id).await?;

    Ok(Some(PortfolioBundle {
        user,
        resume,
        settings,
    }))
}
