use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Private per-user annotation on a question. One per (user, question) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionNote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
