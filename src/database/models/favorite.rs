use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// (user, title) favorite pair. At most one per pair, enforced by the
/// store's unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TitleFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
}
