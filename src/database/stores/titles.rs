use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::{Title, TitleStatus};
use crate::database::StoreError;

/// Title joined with the aggregates the list endpoints expose.
#[derive(Debug, Clone, FromRow)]
pub struct TitleWithStats {
    #[sqlx(flatten)]
    pub title: Title,
    pub questions_count: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TitleStats {
    pub questions_count: i64,
    pub average_rating: Option<f64>,
    pub ratings_count: i64,
}

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: &str,
    status: TitleStatus,
) -> Result<Title, StoreError> {
    let title = sqlx::query_as::<_, Title>(
        "INSERT INTO titles (id, name, description, status, owner_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(status)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    Ok(title)
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Title, StoreError> {
    sqlx::query_as::<_, Title>("SELECT * FROM titles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Title not found"))
}

/// Fetch a title only if it is currently public. Used by favorite/rating
/// creation, which must not reveal whether a non-public target exists.
pub async fn fetch_public(pool: &PgPool, id: Uuid) -> Result<Option<Title>, StoreError> {
    let title = sqlx::query_as::<_, Title>(
        "SELECT * FROM titles WHERE id = $1 AND status = 'public'",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(title)
}

/// Public titles plus the viewer's own, newest first. An anonymous viewer
/// binds NULL and sees only public titles.
pub async fn list_visible(
    pool: &PgPool,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<TitleWithStats>, StoreError> {
    let rows = sqlx::query_as::<_, TitleWithStats>(
        "SELECT t.*,
                (SELECT count(*) FROM questions q WHERE q.title_id = t.id) AS questions_count,
                (SELECT avg(r.stars)::float8 FROM ratings r WHERE r.title_id = t.id) AS average_rating
         FROM titles t
         WHERE t.status = 'public' OR t.owner_id = $1
         ORDER BY t.created_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(viewer)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_visible(pool: &PgPool, viewer: Option<Uuid>) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM titles t WHERE t.status = 'public' OR t.owner_id = $1",
    )
    .bind(viewer)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Batch variant for shaping favorite listings.
pub async fn fetch_many_with_stats(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<TitleWithStats>, StoreError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query_as::<_, TitleWithStats>(
        "SELECT t.*,
                (SELECT count(*) FROM questions q WHERE q.title_id = t.id) AS questions_count,
                (SELECT avg(r.stars)::float8 FROM ratings r WHERE r.title_id = t.id) AS average_rating
         FROM titles t
         WHERE t.id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_stats(pool: &PgPool, title_id: Uuid) -> Result<TitleStats, StoreError> {
    let stats = sqlx::query_as::<_, TitleStats>(
        "SELECT (SELECT count(*) FROM questions q WHERE q.title_id = $1) AS questions_count,
                (SELECT avg(r.stars)::float8 FROM ratings r WHERE r.title_id = $1) AS average_rating,
                (SELECT count(*) FROM ratings r WHERE r.title_id = $1) AS ratings_count",
    )
    .bind(title_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    description: &str,
    status: TitleStatus,
) -> Result<Title, StoreError> {
    sqlx::query_as::<_, Title>(
        "UPDATE titles
         SET name = $2, description = $3, status = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Title not found"))
}

/// Deleting a title cascades to its questions, their choices, and every
/// favorite/rating/note hanging off them (enforced by the schema).
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM titles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Title not found"));
    }
    Ok(())
}
