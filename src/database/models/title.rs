use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a title. Draft and private are owner-only-read;
/// public is world-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TitleStatus {
    Draft,
    Private,
    Public,
}

impl TitleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleStatus::Draft => "draft",
            TitleStatus::Private => "private",
            TitleStatus::Public => "public",
        }
    }
}

/// A named, owned question set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Title {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TitleStatus,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
