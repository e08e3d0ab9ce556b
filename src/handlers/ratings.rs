use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Rating;
use crate::database::stores::{ratings, titles};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MaybePrincipal};
use crate::pagination::{PageParams, Paginated};

#[derive(Debug, Deserialize)]
pub struct RatingCreateRequest {
    pub title_id: Uuid,
    pub stars: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingUpdateRequest {
    pub stars: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingPatchRequest {
    pub stars: Option<i32>,
    pub comment: Option<String>,
}

fn validate_stars(stars: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&stars) {
        return Err(ApiError::field_error("stars", "Stars must be between 1 and 5"));
    }
    Ok(())
}

/// GET /api/quiz/ratings - Ratings of currently-public titles
pub async fn list(Query(params): Query<PageParams>) -> ApiResult<Paginated<Rating>> {
    let pool = DatabaseManager::pool().await?;

    let count = ratings::count_public(&pool).await?;
    let results = ratings::list_public(&pool, params.limit(), params.offset()).await?;

    Ok(ApiResponse::success(Paginated::new(count, &params, results)))
}

/// POST /api/quiz/ratings - Rate a public title once; a repeat is a conflict
pub async fn create(
    AuthUser(principal): AuthUser,
    Json(payload): Json<RatingCreateRequest>,
) -> ApiResult<Rating> {
    validate_stars(payload.stars)?;

    let pool = DatabaseManager::pool().await?;
    let title = titles::fetch_public(&pool, payload.title_id)
        .await?
        .ok_or_else(|| ApiError::field_error("title_id", "Public title not found"))?;

    let rating =
        ratings::create(&pool, principal.id, title.id, payload.stars, &payload.comment).await?;
    Ok(ApiResponse::created(rating))
}

/// GET /api/quiz/ratings/:id - The caller's own rating; anyone else's id
/// reads as not found
pub async fn retrieve(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<Rating> {
    let principal = principal
        .0
        .ok_or_else(|| ApiError::not_found("Rating not found"))?;

    let pool = DatabaseManager::pool().await?;
    let rating = ratings::fetch_own(&pool, id, principal.id).await?;
    Ok(ApiResponse::success(rating))
}

/// PUT /api/quiz/ratings/:id
pub async fn update(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RatingUpdateRequest>,
) -> ApiResult<Rating> {
    let pool = DatabaseManager::pool().await?;

    ratings::fetch_own(&pool, id, principal.id).await?;
    validate_stars(payload.stars)?;

    let rating =
        ratings::update_own(&pool, id, principal.id, payload.stars, &payload.comment).await?;
    Ok(ApiResponse::success(rating))
}

/// PATCH /api/quiz/ratings/:id
pub async fn patch(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RatingPatchRequest>,
) -> ApiResult<Rating> {
    let pool = DatabaseManager::pool().await?;

    let current = ratings::fetch_own(&pool, id, principal.id).await?;
    let stars = payload.stars.unwrap_or(current.stars);
    let comment = payload.comment.unwrap_or(current.comment);
    validate_stars(stars)?;

    let rating = ratings::update_own(&pool, id, principal.id, stars, &comment).await?;
    Ok(ApiResponse::success(rating))
}

/// DELETE /api/quiz/ratings/:id
pub async fn destroy(AuthUser(principal): AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    ratings::delete_own(&pool, id, principal.id).await?;
    Ok(ApiResponse::<()>::no_content())
}
