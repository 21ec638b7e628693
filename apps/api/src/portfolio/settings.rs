use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;
use crate::portfolio::templates::TemplateId;

/// A partial change to portfolio settings. Omitted fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub template_id: Option<String>,
    pub is_published: Option<bool>,
}

/// A `PortfolioUpdate` whose template id has been checked.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub template_id: Option<TemplateId>,
    pub is_published: Option<bool>,
}

pub fn validate_update(update: &PortfolioUpdate) -> Result<ValidatedUpdate, AppError> {
    let template_id = match update.template_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<TemplateId>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
    };

    if template_id.is_none() && update.is_published.is_none() {
        return Err(AppError::Validation(
            "templateId or isPublished is required".to_string(),
        ));
    }

    Ok(ValidatedUpdate {
        template_id,
        is_published: update.is_published,
    })
}

pub async fn find_portfolio(pool: &PgPool, user_id: Uuid) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Values bound into the settings upsert.
///
/// The `insert_*` pair seeds a new row. The `set_*` pair feeds `COALESCE(.., existing)` on
/// conflict, so a `None` there leaves the stored column untouched.
#[derive(Debug, PartialEq, Eq)]
struct UpsertBinds {
    insert_template: &'static str,
    insert_published: bool,
    set_template: Option<&'static str>,
    set_published: Option<bool>,
}

impl UpsertBinds {
    fn from_update(update: &ValidatedUpdate) -> Self {
        Self {
            insert_template: update.template_id.unwrap_or(TemplateId::DEFAULT).as_str(),
            insert_published: update.is_published.unwrap_or(false),
            set_template: update.template_id.map(TemplateId::as_str),
            set_published: update.is_published,
        }
    }
}

/// Inserts settings with defaults for missing fields, or updates only the provided ones.
pub async fn upsert_portfolio(
    pool: &PgPool,
    user_id: Uuid,
    update: &ValidatedUpdate,
) -> Result<PortfolioRow, sqlx::Error> {
    let binds = UpsertBinds::from_update(update);

    sqlx::query_as::<_, PortfolioRow>(
        r#"
        INSERT INTO portfolios (user_id, template_id, is_published)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
            SET template_id = COALESCE($4, portfolios.template_id),
                is_published = COALESCE($5, portfolios.is_published),
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(binds.insert_template)
    .bind(binds.insert_published)
    .bind(binds.set_template)
    .bind(binds.set_published)
    .fetch_one(pool)
    .await
}

/// Validates and applies a settings change for `user_id`.
pub async fn apply_update(
    pool: &PgPool,
    user_id: Uuid,
    update: &PortfolioUpdate,
) -> Result<PortfolioRow, AppError> {
    let validated = validate_update(update)?;
    let portfolio = upsert_portfolio(pool, user_id, &validated).await?;
    info!(
        "Portfolio settings for user {user_id}: template={}, published={}",
        portfolio.template_id, portfolio.is_published
    );
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_only_update() {
        let update = PortfolioUpdate {
            template_id: Some("modern-v2".to_string()),
            is_published: None,
        };
        assert_eq!(
            validate_update(&update).unwrap(),
            ValidatedUpdate {
                template_id: Some(TemplateId::ModernV2),
                is_published: None,
            }
        );
    }

    #[test]
    fn test_publish_only_update() {
        let update = PortfolioUpdate {
            template_id: None,
            is_published: Some(false),
        };
        let validated = validate_update(&update).unwrap();
        assert_eq!(validated.template_id, None);
        assert_eq!(validated.is_published, Some(false));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let update = PortfolioUpdate {
            template_id: Some("  ".to_string()),
            is_published: None,
        };
        assert!(matches!(
            validate_update(&update),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let update = PortfolioUpdate {
            template_id: Some("brutalist-v9".to_string()),
            is_published: Some(true),
        };
        match validate_update(&update) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("brutalist-v9")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_publish_toggle_leaves_template_alone() {
        let binds = UpsertBinds::from_update(&ValidatedUpdate {
            template_id: None,
            is_published: Some(true),
        });
        assert_eq!(binds.set_template, None);
        assert_eq!(binds.set_published, Some(true));
        assert_eq!(binds.insert_template, "classic-v1");
    }

    #[test]
    fn test_template_change_leaves_publish_state_alone() {
        let binds = UpsertBinds::from_update(&ValidatedUpdate {
            template_id: Some(TemplateId::ModernV2),
            is_published: None,
        });
        assert_eq!(
            binds,
            UpsertBinds {
                insert_template: "modern-v2",
                insert_published: false,
                set_template: Some("modern-v2"),
                set_published: None,
            }
        );
    }

    #[test]
    fn test_update_deserializes_camel_case() {
        let update: PortfolioUpdate =
            serde_json::from_str(r#"{"templateId": "classic-v1", "isPublished": true}"#).unwrap();
        assert_eq!(update.template_id.as_deref(), Some("classic-v1"));
        assert_eq!(update.is_published, Some(true));
    }
}
