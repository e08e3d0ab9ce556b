use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{attach_choices, QuestionOut};
use crate::authoring::{validate_choices, ChoicePayload};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Choice, QuestionNote, QuestionType, Title};
use crate::database::stores::{notes, questions, titles};
use crate::error::ApiError;
use crate::grading::{check_answer, GradedAnswer};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MaybePrincipal, Principal};
use crate::pagination::{PageParams, Paginated};
use crate::policy::{authorize_title, Operation};

use super::titles::random_requested;

#[derive(Debug, Deserialize)]
pub struct QuestionCreateRequest {
    pub title_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub explanation: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub position: i32,
    pub choices: Vec<ChoicePayload>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionUpdateRequest {
    pub text: String,
    #[serde(default)]
    pub explanation: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub position: i32,
    pub choices: Vec<ChoicePayload>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionPatchRequest {
    pub text: Option<String>,
    pub explanation: Option<String>,
    pub question_type: Option<QuestionType>,
    pub position: Option<i32>,
    pub choices: Option<Vec<ChoicePayload>>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub random: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckAnswerRequest {
    pub selected_choice_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct NotePayload {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct NotePatchPayload {
    pub body: Option<String>,
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::field_error("text", "Question text is required"));
    }
    Ok(())
}

/// GET /api/quiz/questions - Questions of public titles plus the caller's own
pub async fn list(
    principal: MaybePrincipal,
    Query(query): Query<QuestionListQuery>,
) -> ApiResult<Paginated<QuestionOut>> {
    let pool = DatabaseManager::pool().await?;
    let viewer = principal.as_ref().map(|p| p.id);
    let params = PageParams {
        page: query.page,
        page_size: query.page_size,
    };
    let random = random_requested(query.random.as_deref());

    let count = questions::count_visible(&pool, viewer).await?;
    let rows =
        questions::list_visible(&pool, viewer, random, params.limit(), params.offset()).await?;
    let ids: Vec<Uuid> = rows.iter().map(|q| q.id).collect();
    let choices = questions::choices_for_questions(&pool, &ids).await?;

    Ok(ApiResponse::success(Paginated::new(
        count,
        &params,
        attach_choices(rows, choices),
    )))
}

/// POST /api/quiz/questions - Add a question (with choices) to an owned title
pub async fn create(
    AuthUser(principal): AuthUser,
    Json(payload): Json<QuestionCreateRequest>,
) -> ApiResult<QuestionOut> {
    let pool = DatabaseManager::pool().await?;

    let title = titles::fetch(&pool, payload.title_id).await?;
    authorize_title(Some(&principal), &title, Operation::Write)?;

    validate_text(&payload.text)?;
    validate_choices(payload.question_type, &payload.choices)?;

    let position = if payload.position == 0 {
        questions::next_position(&pool, title.id).await?
    } else {
        payload.position
    };

    let question = questions::create(
        &pool,
        title.id,
        payload.text.trim(),
        &payload.explanation,
        payload.question_type,
        position,
        &payload.choices,
    )
    .await?;

    let choices = questions::choices_for(&pool, question.id).await?;
    Ok(ApiResponse::created(QuestionOut::new(question, choices)))
}

/// GET /api/quiz/questions/:id
pub async fn retrieve(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<QuestionOut> {
    let pool = DatabaseManager::pool().await?;

    let question = questions::fetch(&pool, id).await?;
    let title = titles::fetch(&pool, question.title_id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Read)?;

    let choices = questions::choices_for(&pool, question.id).await?;
    Ok(ApiResponse::success(QuestionOut::new(question, choices)))
}

/// PUT /api/quiz/questions/:id - Full update; the submitted choice list
/// replaces every existing choice
pub async fn update(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionUpdateRequest>,
) -> ApiResult<QuestionOut> {
    let pool = DatabaseManager::pool().await?;

    let question = questions::fetch(&pool, id).await?;
    let title = titles::fetch(&pool, question.title_id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;

    validate_text(&payload.text)?;
    validate_choices(payload.question_type, &payload.choices)?;

    let position = if payload.position == 0 {
        questions::next_position(&pool, title.id).await?
    } else {
        payload.position
    };

    let updated = questions::update(
        &pool,
        id,
        payload.text.trim(),
        &payload.explanation,
        payload.question_type,
        position,
        Some(payload.choices.as_slice()),
    )
    .await?;

    let choices = questions::choices_for(&pool, updated.id).await?;
    Ok(ApiResponse::success(QuestionOut::new(updated, choices)))
}

/// PATCH /api/quiz/questions/:id - Partial update. A present choice list
/// replaces all choices; an absent one leaves them untouched, but the
/// authoring invariant is still enforced against the resulting state.
pub async fn patch(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionPatchRequest>,
) -> ApiResult<QuestionOut> {
    let pool = DatabaseManager::pool().await?;

    let question = questions::fetch(&pool, id).await?;
    let title = titles::fetch(&pool, question.title_id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;

    let text = payload.text.unwrap_or_else(|| question.text.clone());
    let explanation = payload
        .explanation
        .unwrap_or_else(|| question.explanation.clone());
    let question_type = payload.question_type.unwrap_or(question.question_type);
    validate_text(&text)?;

    match &payload.choices {
        Some(choices) => validate_choices(question_type, choices)?,
        None => {
            let existing = questions::choices_for(&pool, question.id).await?;
            validate_choices(question_type, &as_payloads(&existing))?;
        }
    }

    let position = match payload.position {
        Some(0) => questions::next_position(&pool, title.id).await?,
        Some(p) => p,
        None => question.position,
    };

    let updated = questions::update(
        &pool,
        id,
        text.trim(),
        &explanation,
        question_type,
        position,
        payload.choices.as_deref(),
    )
    .await?;

    let choices = questions::choices_for(&pool, updated.id).await?;
    Ok(ApiResponse::success(QuestionOut::new(updated, choices)))
}

fn as_payloads(choices: &[Choice]) -> Vec<ChoicePayload> {
    choices
        .iter()
        .map(|c| ChoicePayload {
            text: c.text.clone(),
            is_correct: c.is_correct,
            position: c.position,
        })
        .collect()
}

/// DELETE /api/quiz/questions/:id - Title owner only
pub async fn destroy(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let question = questions::fetch(&pool, id).await?;
    let title = titles::fetch(&pool, question.title_id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Write)?;

    questions::delete(&pool, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/quiz/questions/:id/check - Grade a submission. Visibility is
/// checked before the payload so an invisible question never leaks which
/// choice ids are valid.
pub async fn check(
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckAnswerRequest>,
) -> ApiResult<GradedAnswer> {
    let pool = DatabaseManager::pool().await?;

    let question = questions::fetch(&pool, id).await?;
    let title = titles::fetch(&pool, question.title_id).await?;
    authorize_title(Some(&principal), &title, Operation::Read)?;

    let choices = questions::choices_for(&pool, question.id).await?;
    let graded = check_answer(&question, &choices, &payload.selected_choice_ids)?;
    Ok(ApiResponse::success(graded))
}

// Note action. Each method re-checks the *current* title visibility before
// the ownership lookup, so a non-owner's note under a now-private title is
// unreachable until the title is public again.

async fn load_note_target(
    pool: &sqlx::PgPool,
    principal: &MaybePrincipal,
    question_id: Uuid,
) -> Result<(Principal, Uuid), ApiError> {
    let question = questions::fetch(pool, question_id).await?;
    let title: Title = titles::fetch(pool, question.title_id).await?;
    authorize_title(principal.as_ref(), &title, Operation::Read)?;

    let principal = principal
        .as_ref()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    Ok((principal, question.id))
}

/// GET /api/quiz/questions/:id/note - The caller's note on this question
pub async fn note_get(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let (principal, question_id) = load_note_target(&pool, &principal, id).await?;

    let note = notes::fetch_for_question(&pool, principal.id, question_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(ApiResponse::success(note))
}

/// POST /api/quiz/questions/:id/note
pub async fn note_post(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let (principal, question_id) = load_note_target(&pool, &principal, id).await?;

    if payload.body.trim().is_empty() {
        return Err(ApiError::field_error("body", "Note text is required"));
    }

    let note = notes::create(&pool, principal.id, question_id, &payload.body).await?;
    Ok(ApiResponse::created(note))
}

/// PUT /api/quiz/questions/:id/note
pub async fn note_put(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let (principal, question_id) = load_note_target(&pool, &principal, id).await?;

    if payload.body.trim().is_empty() {
        return Err(ApiError::field_error("body", "Note text is required"));
    }

    let note = notes::update_for_question(&pool, principal.id, question_id, &payload.body).await?;
    Ok(ApiResponse::success(note))
}

/// PATCH /api/quiz/questions/:id/note
pub async fn note_patch(
    principal: MaybePrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePatchPayload>,
) -> ApiResult<QuestionNote> {
    let pool = DatabaseManager::pool().await?;
    let (principal, question_id) = load_note_target(&pool, &principal, id).await?;

    let note = match payload.body {
        Some(body) if body.trim().is_empty() => {
            return Err(ApiError::field_error("body", "Note text is required"));
        }
        Some(body) => notes::update_for_question(&pool, principal.id, question_id, &body).await?,
        None => notes::fetch_for_question(&pool, principal.id, question_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Note not found"))?,
    };

    Ok(ApiResponse::success(note))
}

/// DELETE /api/quiz/questions/:id/note
pub async fn note_delete(principal: MaybePrincipal, Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let (principal, question_id) = load_note_target(&pool, &principal, id).await?;

    notes::delete_for_question(&pool, principal.id, question_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
