use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::QuestionNote;
use crate::database::stores::notes;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pagination::{PageParams, Paginated};

#[derive(Debug, Deserialize)]
pub struct NoteUpdateRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct NotePatchRequest {
    pub body: Option<String>,
}

/// GET /api/quiz/notes - The caller's notes, most recently touched first.
/// This collection is ownership-scoped only; the per-question note action
/// is the one that re-checks title visibility.
pub async fn list(
    AuthUser(principal): AuthUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Paginated<QuestionNote>> {
    let pool = DatabaseManager::pool().await?;

    let count = notes::count(&pool, principal.id).await?;
    let results = notes::list(&pool, principal.id, params.limit(), params.offset()).await?;

    Ok(ApiResponse::success(Paginated::new(count, &params, results)))
}

/// GET /api/quiz/notes/:id - Own note; anyone else's id reads as not found
pub async fn retrieve(AuthUser(principal): AuthUser, Path(id): Path<Uuid>) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let note = notes::fetch_own(&pool, id, principal.id).await?;
    Ok(ApiResponse::success(note))
}

/// PUT /api/quiz/notes/:id
pub async fn update(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NoteUpdateRequest>,
) -> ApiResult<QuestionNote> {
    if payload.body.trim().is_empty() {
        return Err(ApiError::field_error("body", "Note text is required"));
    }

    let pool = DatabaseManager::pool().await?;
    notes::fetch_own(&pool, id, principal.id).await?;
    let note = notes::update_own(&pool, id, principal.id, &payload.body).await?;
    Ok(ApiResponse::success(note))
}

/// PATCH /api/quiz/notes/:id
pub async fn patch(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePatchRequest>,
) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let current = notes::fetch_own(&pool, id, principal.id).await?;

    let note = match payload.body {
        Some(body) if body.trim().is_empty() => {
            return Err(ApiError::field_error("body", "Note text is required"));
        }
        Some(body) => notes::update_own(&pool, id, principal.id, &body).await?,
        None => current,
    };

    Ok(ApiResponse::success(note))
}

/// DELETE /api/quiz/notes/:id
pub async fn destroy(AuthUser(principal): AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    notes::delete_own(&pool, id, principal.id).await?;
    Ok(ApiResponse::<()>::no_content())
}
