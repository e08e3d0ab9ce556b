use axum::{
    extract::{Path, Query},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{attach_choices, QuestionOut, TitleSummary};
use crate::database::manager::DatabaseManager;
use crate::database::models::{QuestionFavorite, TitleFavorite, TitleStatus};
use crate::database::stores::{favorites, questions, titles};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pagination::{PageParams, Paginated};

#[derive(Debug, Deserialize)]
pub struct TitleFavoriteRequest {
    pub title_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct QuestionFavoriteRequest {
    pub question_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TitleFavoriteOut {
    pub id: Uuid,
    pub title: TitleSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct QuestionFavoriteOut {
    pub id: Uuid,
    pub question: QuestionOut,
    pub created_at: DateTime<Utc>,
}

async fn shape_title_favorites(
    pool: &sqlx::PgPool,
    rows: Vec<TitleFavorite>,
) -> Result<Vec<TitleFavoriteOut>, ApiError> {
    let ids: Vec<Uuid> = rows.iter().map(|f| f.title_id).collect();
    let summaries: Vec<TitleSummary> = titles::fetch_many_with_stats(pool, &ids)
        .await?
        .into_iter()
        .map(TitleSummary::from)
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|f| {
            summaries
                .iter()
                .find(|s| s.title.id == f.title_id)
                .cloned()
                .map(|title| TitleFavoriteOut {
                    id: f.id,
                    title,
                    created_at: f.created_at,
                })
        })
        .collect())
}

async fn shape_question_favorites(
    pool: &sqlx::PgPool,
    rows: Vec<QuestionFavorite>,
) -> Result<Vec<QuestionFavoriteOut>, ApiError> {
    let ids: Vec<Uuid> = rows.iter().map(|f| f.question_id).collect();
    let question_rows = questions::fetch_many(pool, &ids).await?;
    let choice_rows = questions::choices_for_questions(pool, &ids).await?;
    let shaped = attach_choices(question_rows, choice_rows);

    Ok(rows
        .into_iter()
        .filter_map(|f| {
            shaped
                .iter()
                .find(|q| q.question.id == f.question_id)
                .cloned()
                .map(|question| QuestionFavoriteOut {
                    id: f.id,
                    question,
                    created_at: f.created_at,
                })
        })
        .collect())
}

// Title favorites

/// GET /api/quiz/favorites/titles - The caller's favorited titles
pub async fn list_titles(
    AuthUser(principal): AuthUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Paginated<TitleFavoriteOut>> {
    let pool = DatabaseManager::pool().await?;

    let count = favorites::count_title_favorites(&pool, principal.id).await?;
    let rows =
        favorites::list_title_favorites(&pool, principal.id, params.limit(), params.offset())
            .await?;
    let results = shape_title_favorites(&pool, rows).await?;

    Ok(ApiResponse::success(Paginated::new(count, &params, results)))
}

/// POST /api/quiz/favorites/titles - Favorite a currently-public title.
/// A second favorite for the same pair is a conflict.
pub async fn create_title(
    AuthUser(principal): AuthUser,
    Json(payload): Json<TitleFavoriteRequest>,
) -> ApiResult<TitleFavoriteOut> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch_public(&pool, payload.title_id)
        .await?
        .ok_or_else(|| ApiError::field_error("title_id", "Public title not found"))?;

    let favorite = favorites::create_title_favorite(&pool, principal.id, title.id).await?;
    let stats = titles::fetch_stats(&pool, title.id).await?;

    Ok(ApiResponse::created(TitleFavoriteOut {
        id: favorite.id,
        title: TitleSummary::new(title, &stats),
        created_at: favorite.created_at,
    }))
}

/// GET /api/quiz/favorites/titles/:id
pub async fn retrieve_title(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<TitleFavoriteOut> {
    let pool = DatabaseManager::pool().await?;

    let favorite = favorites::fetch_title_favorite(&pool, id, principal.id).await?;
    let mut shaped = shape_title_favorites(&pool, vec![favorite]).await?;
    shaped
        .pop()
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Favorite not found"))
}

/// DELETE /api/quiz/favorites/titles/:id
pub async fn destroy_title(AuthUser(principal): AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    favorites::delete_title_favorite(&pool, id, principal.id).await?;
    Ok(ApiResponse::<()>::no_content())
}

// Question favorites

/// GET /api/quiz/favorites/questions - The caller's favorited questions
pub async fn list_questions(
    AuthUser(principal): AuthUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Paginated<QuestionFavoriteOut>> {
    let pool = DatabaseManager::pool().await?;

    let count = favorites::count_question_favorites(&pool, principal.id).await?;
    let rows =
        favorites::list_question_favorites(&pool, principal.id, params.limit(), params.offset())
            .await?;
    let results = shape_question_favorites(&pool, rows).await?;

    Ok(ApiResponse::success(Paginated::new(count, &params, results)))
}

/// POST /api/quiz/favorites/questions - Favorite a question under a
/// currently-public title
pub async fn create_question(
    AuthUser(principal): AuthUser,
    Json(payload): Json<QuestionFavoriteRequest>,
) -> ApiResult<QuestionFavoriteOut> {
    let pool = DatabaseManager::pool().await?;

    let question = match questions::fetch(&pool, payload.question_id).await {
        Ok(q) => q,
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::field_error("question_id", "Public question not found"))
        }
        Err(e) => return Err(e.into()),
    };
    let title = titles::fetch(&pool, question.title_id).await?;
    if title.status != TitleStatus::Public {
        return Err(ApiError::field_error("question_id", "Public question not found"));
    }

    let favorite = favorites::create_question_favorite(&pool, principal.id, question.id).await?;
    let choices = questions::choices_for(&pool, question.id).await?;

    Ok(ApiResponse::created(QuestionFavoriteOut {
        id: favorite.id,
        question: QuestionOut::new(question, choices),
        created_at: favorite.created_at,
    }))
}

/// GET /api/quiz/favorites/questions/:id
pub async fn retrieve_question(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<QuestionFavoriteOut> {
    let pool = DatabaseManager::pool().await?;

    let favorite = favorites::fetch_question_favorite(&pool, id, principal.id).await?;
    let mut shaped = shape_question_favorites(&pool, vec![favorite]).await?;
    shaped
        .pop()
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Favorite not found"))
}

/// DELETE /api/quiz/favorites/questions/:id
pub async fn destroy_question(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    favorites::delete_question_favorite(&pool, id, principal.id).await?;
    Ok(ApiResponse::<()>::no_content())
}
