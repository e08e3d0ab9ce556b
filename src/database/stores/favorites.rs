use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{QuestionFavorite, TitleFavorite};
use crate::database::StoreError;

// Title favorites

pub async fn create_title_favorite(
    pool: &PgPool,
    user_id: Uuid,
    title_id: Uuid,
) -> Result<TitleFavorite, StoreError> {
    sqlx::query_as::<_, TitleFavorite>(
        "INSERT INTO title_favorites (id, user_id, title_id)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title_id)
    .fetch_one(pool)
    .await
    .map_err(|e| StoreError::from(e).conflict_on_unique("You have already favorited this title"))
}

pub async fn list_title_favorites(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<TitleFavorite>, StoreError> {
    let rows = sqlx::query_as::<_, TitleFavorite>(
        "SELECT * FROM title_favorites
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_title_favorites(pool: &PgPool, user_id: Uuid) -> Result<i64, StoreError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM title_favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Own favorite or nothing: a foreign id reads the same as a missing one.
pub async fn fetch_title_favorite(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<TitleFavorite, StoreError> {
    sqlx::query_as::<_, TitleFavorite>(
        "SELECT * FROM title_favorites WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Favorite not found"))
}

pub async fn delete_title_favorite(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM title_favorites WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Favorite not found"));
    }
    Ok(())
}

// Question favorites

pub async fn create_question_favorite(
    pool: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
) -> Result<QuestionFavorite, StoreError> {
    sqlx::query_as::<_, QuestionFavorite>(
        "INSERT INTO question_favorites (id, user_id, question_id)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(question_id)
    .fetch_one(pool)
    .await
    .map_err(|e| StoreError::from(e).conflict_on_unique("You have already favorited this question"))
}

pub async fn list_question_favorites(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<QuestionFavorite>, StoreError> {
    let rows = sqlx::query_as::<_, QuestionFavorite>(
        "SELECT * FROM question_favorites
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_question_favorites(pool: &PgPool, user_id: Uuid) -> Result<i64, StoreError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM question_favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

pub async fn fetch_question_favorite(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<QuestionFavorite, StoreError> {
    sqlx::query_as::<_, QuestionFavorite>(
        "SELECT * FROM question_favorites WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Favorite not found"))
}

pub async fn delete_question_favorite(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM question_favorites WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Favorite not found"));
    }
    Ok(())
}
