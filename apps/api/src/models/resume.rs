use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_url: String,
    /// Model output, stored verbatim.
    pub parsed_data: Value,
    pub created_at: DateTime<Utc>,
}

impl ResumeRow {
    /// The warning recorded when automatic parsing failed and a placeholder was stored.
    pub fn parse_error(&self) -> Option<&str> {
        self.parsed_data.get("parseError").and_then(Value::as_str)
    }
}

/// A resume about to be inserted.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub filename: String,
    pub original_url: String,
    pub parsed_data: Value,
}
