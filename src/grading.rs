//! Grading engine: compares a submitted choice selection against a
//! question's correct choices. Side-effect free; grading the same
//! (question, selection) pair twice yields the same verdict.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Choice, Question, QuestionType};
use crate::error::ApiError;

/// Result of checking one submission against one question. The correct
/// choice ids are always revealed, win or lose.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub selected_choice_ids: Vec<Uuid>,
    pub is_correct: bool,
    pub explanation: String,
    pub correct_choice_ids: Vec<Uuid>,
}

/// Validate and grade a submission. The selection is correct iff the set of
/// submitted ids equals the set of correct choice ids exactly; a subset or
/// superset grades as incorrect.
pub fn check_answer(
    question: &Question,
    choices: &[Choice],
    selected: &[Uuid],
) -> Result<GradedAnswer, ApiError> {
    validate_selection(question, choices, selected)?;

    let correct: BTreeSet<Uuid> = choices
        .iter()
        .filter(|c| c.is_correct)
        .map(|c| c.id)
        .collect();
    let submitted: BTreeSet<Uuid> = selected.iter().copied().collect();

    Ok(GradedAnswer {
        question_id: question.id,
        selected_choice_ids: selected.to_vec(),
        is_correct: submitted == correct,
        explanation: question.explanation.clone(),
        // BTreeSet iteration keeps this sorted and deterministic
        correct_choice_ids: correct.into_iter().collect(),
    })
}

fn validate_selection(
    question: &Question,
    choices: &[Choice],
    selected: &[Uuid],
) -> Result<(), ApiError> {
    if selected.is_empty() {
        return Err(ApiError::field_error(
            "selected_choice_ids",
            "Select at least one choice",
        ));
    }

    let submitted: BTreeSet<Uuid> = selected.iter().copied().collect();
    if submitted.len() != selected.len() {
        return Err(ApiError::field_error(
            "selected_choice_ids",
            "Duplicate choice ids in selection",
        ));
    }

    let known: BTreeSet<Uuid> = choices.iter().map(|c| c.id).collect();
    let unknown: Vec<String> = submitted
        .difference(&known)
        .map(|id| id.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::field_error(
            "selected_choice_ids",
            format!("Unknown choice ids for this question: {}", unknown.join(", ")),
        ));
    }

    match question.question_type {
        QuestionType::Single if selected.len() != 1 => Err(ApiError::field_error(
            "selected_choice_ids",
            "A single-choice question takes exactly one selection",
        )),
        // The non-empty check above already guarantees this, but the lower
        // bound is a rule of its own, not a consequence of authoring limits.
        QuestionType::Multiple if selected.is_empty() => Err(ApiError::field_error(
            "selected_choice_ids",
            "Select at least one choice",
        )),
        _ => Ok(()),
    }
}
