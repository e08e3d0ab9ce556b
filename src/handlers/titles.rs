use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{attach_choices, QuestionOut, TitleDetail, TitleSummary};
use crate::database::manager::DatabaseManager;
use crate::database::models::TitleStatus;
use crate::database::stores::{questions, titles};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MaybePrincipal};
use crate::pagination::{PageParams, Paginated};
use crate::policy::{authorize_title, Operation};

pub const MAX_NAME_LENGTH: usize = 200;

#[derive(Debug, Deserialize)]
pub struct TitlePayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: TitleStatus,
}

#[derive(Debug, Deserialize)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TitleStatus>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuestionsQuery {
    pub random: Option<String>,
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::field_error("name", "Name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::field_error(
            "name",
            format!("Name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

pub(crate) fn random_requested(flag: Option<&str>) -> bool {
    flag.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// GET /api/quiz/titles - Public titles plus the caller's own
pub async fn list(
    principal: MaybePrincipal,
    Query(params): Query<PageParams>,
) -> ApiResult<Paginated<TitleSummary>> {
    let pool = DatabaseManager::pool().await?;
    let viewer = principal.as_ref().map(|p| p.id);

    let count = titles::count_visible(&pool, viewer).await?;
    let rows = titles::list_visible(&pool, viewer, params.limit(), params.offset()).await?;
    let results = rows.into_iter().map(TitleSummary::from).collect();

    Ok(ApiResponse::success(Paginated::new(count, &params, results)))
}

/// POST /api/quiz/titles - Create a title owned by the caller
pub async fn create(
    AuthUser(principal): AuthUser,
    Json(payload): Json<TitlePayload>,
) -> ApiResult<TitleSummary> {
    validate_name(&payload.name)?;

    let pool = DatabaseManager::pool().await?;
    let title = titles::create(
        &pool,
        principal.id,
        payload.name.trim(),
        &payload.description,
        payload.status,
    )
    .await?;

    let stats = titles::fetch_stats(&pool, title.id).await?;
    Ok(ApiResponse::created(TitleSummary::new(title, &stats)))
}

/// GET /api/quiz/titles/:id - Title detail with its questions embedded
pub async fn retrieve(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<TitleDetail> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Read)?;

    let question_rows = questions::list_for_title(&pool, title.id, false).await?;
    let ids: Vec<Uuid> = question_rows.iter().map(|q| q.id).collect();
    let choices = questions::choices_for_questions(&pool, &ids).await?;
    let stats = titles::fetch_stats(&pool, title.id).await?;

    Ok(ApiResponse::success(TitleDetail::new(
        title,
        attach_choices(question_rows, choices),
        &stats,
    )))
}

/// PUT /api/quiz/titles/:id - Full update, owner only
pub async fn update(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<TitlePayload>,
) -> ApiResult<TitleSummary> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;
    validate_name(&payload.name)?;

    let updated = titles::update(
        &pool,
        id,
        payload.name.trim(),
        &payload.description,
        payload.status,
    )
    .await?;

    let stats = titles::fetch_stats(&pool, updated.id).await?;
    Ok(ApiResponse::success(TitleSummary::new(updated, &stats)))
}

/// PATCH /api/quiz/titles/:id - Partial update, owner only
pub async fn patch(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<TitlePatch>,
) -> ApiResult<TitleSummary> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;

    let name = payload.name.unwrap_or_else(|| title.name.clone());
    let description = payload.description.unwrap_or_else(|| title.description.clone());
    let status = payload.status.unwrap_or(title.status);
    validate_name(&name)?;

    let updated = titles::update(&pool, id, name.trim(), &description, status).await?;
    let stats = titles::fetch_stats(&pool, updated.id).await?;
    Ok(ApiResponse::success(TitleSummary::new(updated, &stats)))
}

/// DELETE /api/quiz/titles/:id - Owner only; cascades to questions,
/// choices, favorites, ratings, and notes
pub async fn destroy(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;

    titles::delete(&pool, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// GET /api/quiz/titles/:id/questions - Questions of one title, in display
/// order or shuffled per call when random=true
pub async fn list_questions(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Query(query): Query<TitleQuestionsQuery>,
) -> ApiResult<Vec<QuestionOut>> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Read)?;

    let random = random_requested(query.random.as_deref());
    let question_rows = questions::list_for_title(&pool, title.id, random).await?;
    let ids: Vec<Uuid> = question_rows.iter().map(|q| q.id).collect();
    let choices = questions::choices_for_questions(&pool, &ids).await?;

    Ok(ApiResponse::success(attach_choices(question_rows, choices)))
}
