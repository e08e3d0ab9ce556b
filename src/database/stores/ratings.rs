use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Rating;
use crate::database::StoreError;

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title_id: Uuid,
    stars: i32,
    comment: &str,
) -> Result<Rating, StoreError> {
    sqlx::query_as::<_, Rating>(
        "INSERT INTO ratings (id, user_id, title_id, stars, comment)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title_id)
    .bind(stars)
    .bind(comment)
    .fetch_one(pool)
    .await
    .map_err(|e| StoreError::from(e).conflict_on_unique("You have already rated this title"))
}

/// Ratings of currently-public titles, newest first.
pub async fn list_public(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Rating>, StoreError> {
    let rows = sqlx::query_as::<_, Rating>(
        "SELECT r.* FROM ratings r
         JOIN titles t ON t.id = r.title_id
         WHERE t.status = 'public'
         ORDER BY r.created_at DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_public(pool: &PgPool) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM ratings r
         JOIN titles t ON t.id = r.title_id
         WHERE t.status = 'public'",
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Own rating or nothing: a foreign id reads the same as a missing one.
pub async fn fetch_own(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Rating, StoreError> {
    sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Rating not found"))
}

pub async fn update_own(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    stars: i32,
    comment: &str,
) -> Result<Rating, StoreError> {
    sqlx::query_as::<_, Rating>(
        "UPDATE ratings
         SET stars = $3, comment = $4, updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(stars)
    .bind(comment)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Rating not found"))
}

pub async fn delete_own(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM ratings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Rating not found"));
    }
    Ok(())
}
