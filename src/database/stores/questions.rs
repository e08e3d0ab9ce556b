use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::authoring::ChoicePayload;
use crate::database::models::{Choice, Question, QuestionType};
use crate::database::StoreError;

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Question, StoreError> {
    sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Question not found"))
}

/// Batch fetch for shaping favorite listings.
pub async fn fetch_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Question>, StoreError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query_as::<_, Question>(
        "SELECT * FROM questions WHERE id = ANY($1) ORDER BY title_id, position, id",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Questions under public titles plus the viewer's own.
pub async fn list_visible(
    pool: &PgPool,
    viewer: Option<Uuid>,
    random: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Question>, StoreError> {
    let order = if random {
        "random()"
    } else {
        "q.title_id, q.position, q.id"
    };
    let sql = format!(
        "SELECT q.* FROM questions q
         JOIN titles t ON t.id = q.title_id
         WHERE t.status = 'public' OR t.owner_id = $1
         ORDER BY {}
         LIMIT $2 OFFSET $3",
        order
    );

    let rows = sqlx::query_as::<_, Question>(&sql)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn count_visible(pool: &PgPool, viewer: Option<Uuid>) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM questions q
         JOIN titles t ON t.id = q.title_id
         WHERE t.status = 'public' OR t.owner_id = $1",
    )
    .bind(viewer)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub async fn list_for_title(
    pool: &PgPool,
    title_id: Uuid,
    random: bool,
) -> Result<Vec<Question>, StoreError> {
    let order = if random { "random()" } else { "position, id" };
    let sql = format!(
        "SELECT * FROM questions WHERE title_id = $1 ORDER BY {}",
        order
    );

    let rows = sqlx::query_as::<_, Question>(&sql)
        .bind(title_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn choices_for(pool: &PgPool, question_id: Uuid) -> Result<Vec<Choice>, StoreError> {
    let rows = sqlx::query_as::<_, Choice>(
        "SELECT * FROM choices WHERE question_id = $1 ORDER BY position, id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Choices for a batch of questions in one round trip, for list shaping.
pub async fn choices_for_questions(
    pool: &PgPool,
    question_ids: &[Uuid],
) -> Result<Vec<Choice>, StoreError> {
    if question_ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query_as::<_, Choice>(
        "SELECT * FROM choices WHERE question_id = ANY($1) ORDER BY question_id, position, id",
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Next display position within a title: max(existing) + 1.
pub async fn next_position(pool: &PgPool, title_id: Uuid) -> Result<i32, StoreError> {
    let next = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM questions WHERE title_id = $1",
    )
    .bind(title_id)
    .fetch_one(pool)
    .await?;

    Ok(next)
}

pub async fn create(
    pool: &PgPool,
    title_id: Uuid,
    text: &str,
    explanation: &str,
    question_type: QuestionType,
    position: i32,
    choices: &[ChoicePayload],
) -> Result<Question, StoreError> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, Question>(
        "INSERT INTO questions (id, title_id, text, explanation, question_type, position)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(title_id)
    .bind(text)
    .bind(explanation)
    .bind(question_type)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    insert_choices(&mut tx, question.id, choices).await?;

    tx.commit().await?;
    Ok(question)
}

/// Update a question. A submitted choice list is replace-all: every existing
/// choice is deleted and the list recreated; `None` leaves choices alone.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    text: &str,
    explanation: &str,
    question_type: QuestionType,
    position: i32,
    choices: Option<&[ChoicePayload]>,
) -> Result<Question, StoreError> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, Question>(
        "UPDATE questions
         SET text = $2, explanation = $3, question_type = $4, position = $5, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(text)
    .bind(explanation)
    .bind(question_type)
    .bind(position)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("Question not found"))?;

    if let Some(choices) = choices {
        sqlx::query("DELETE FROM choices WHERE question_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_choices(&mut tx, id, choices).await?;
    }

    tx.commit().await?;
    Ok(question)
}

async fn insert_choices(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
    choices: &[ChoicePayload],
) -> Result<(), StoreError> {
    for choice in choices {
        sqlx::query(
            "INSERT INTO choices (id, question_id, text, is_correct, position)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(&choice.text)
        .bind(choice.is_correct)
        .bind(choice.position)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Question not found"));
    }
    Ok(())
}
