use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::QuestionNote;
use crate::database::StoreError;

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
    body: &str,
) -> Result<QuestionNote, StoreError> {
    sqlx::query_as::<_, QuestionNote>(
        "INSERT INTO question_notes (id, user_id, question_id, body)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(question_id)
    .bind(body)
    .fetch_one(pool)
    .await
    .map_err(|e| StoreError::from(e).conflict_on_unique("A note already exists for this question"))
}

pub async fn fetch_for_question(
    pool: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
) -> Result<Option<QuestionNote>, StoreError> {
    let note = sqlx::query_as::<_, QuestionNote>(
        "SELECT * FROM question_notes WHERE user_id = $1 AND question_id = $2",
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(note)
}

pub async fn update_for_question(
    pool: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
    body: &str,
) -> Result<QuestionNote, StoreError> {
    sqlx::query_as::<_, QuestionNote>(
        "UPDATE question_notes
         SET body = $3, updated_at = now()
         WHERE user_id = $1 AND question_id = $2
         RETURNING *",
    )
    .bind(user_id)
    .bind(question_id)
    .bind(body)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Note not found"))
}

pub async fn delete_for_question(
    pool: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM question_notes WHERE user_id = $1 AND question_id = $2")
        .bind(user_id)
        .bind(question_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Note not found"));
    }
    Ok(())
}

/// The caller's notes, most recently touched first.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<QuestionNote>, StoreError> {
    let rows = sqlx::query_as::<_, QuestionNote>(
        "SELECT * FROM question_notes
         WHERE user_id = $1
         ORDER BY updated_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count(pool: &PgPool, user_id: Uuid) -> Result<i64, StoreError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM question_notes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Own note by id or nothing: a foreign id reads the same as a missing one.
pub async fn fetch_own(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<QuestionNote, StoreError> {
    sqlx::query_as::<_, QuestionNote>(
        "SELECT * FROM question_notes WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Note not found"))
}

pub async fn update_own(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    body: &str,
) -> Result<QuestionNote, StoreError> {
    sqlx::query_as::<_, QuestionNote>(
        "UPDATE question_notes
         SET body = $3, updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(body)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Note not found"))
}

pub async fn delete_own(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM question_notes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Note not found"));
    }
    Ok(())
}
