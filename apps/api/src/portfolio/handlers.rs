use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;
use crate::portfolio::data::load_bundle;
use crate::portfolio::settings::{apply_update, find_portfolio, PortfolioUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdateRequest {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub update: PortfolioUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TemplateUpdateResponse {
    pub success: bool,
    pub portfolio: PortfolioRow,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub portfolio: PortfolioRow,
}

/// GET /api/resume/:user_id
///
/// Parsed resume merged with `image`, `templateId` and `isPublished`.
/// Unpublished portfolios are only visible to their owner. Ids that are not UUIDs are simply unknown.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let not_found = || AppError::NotFound("Not found".to_string());
    let user_id: Uuid = user_id.parse().map_err(|_| not_found())?;
    let bundle = load_bundle(&state.db, user_id)
        .await?
        .filter(|b| b.visible_to(viewer.map(|v| v.id)))
        .ok_or_else(not_found)?;

    Ok(Json(bundle.to_api_json(&state.config.default_avatar_url)))
}

/// POST /api/portfolio/template
///
/// Body: `{ userId?, templateId?, isPublished? }`. Creates settings on first use.
pub async fn handle_update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<TemplateUpdateRequest>, JsonRejection>,
) -> Result<Json<TemplateUpdateResponse>, AppError> {
    let Json(req) = payload?;
    let user_id = auth.ensure_owner(req.user_id)?;
    let portfolio = apply_update(&state.db, user_id, &req.update).await?;

    Ok(Json(TemplateUpdateResponse {
        success: true,
        portfolio,
    }))
}

/// GET /api/portfolio/template?userId=
pub async fn handle_get_template(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<PortfolioResponse>, AppError> {
    let Query(query) = query?;
    let user_id = auth.ensure_owner(query.user_id)?;
    let portfolio = find_portfolio(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))?;

    Ok(Json(PortfolioResponse { portfolio }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_flattens_settings() {
        let req: TemplateUpdateRequest = serde_json::from_str(
            r#"{"userId": "00000000-0000-0000-0000-000000000000", "isPublished": true}"#,
        )
        .unwrap();
        assert_eq!(req.user_id, Some(Uuid::nil()));
        assert_eq!(req.update.is_published, Some(true));
        assert_eq!(req.update.template_id, None);
    }
}
