//! Authoring rules for a question's choice list. Applied whenever a choice
//! list is submitted (create, or the replace-all path of an update).

use serde::Deserialize;

use crate::database::models::QuestionType;
use crate::error::ApiError;

pub const MIN_CHOICES: usize = 2;
pub const MAX_CHOICES: usize = 5;

/// One submitted choice. Updates are replace-all: a submitted list discards
/// every existing choice of the question, so there is no id here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoicePayload {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub position: i32,
}

pub fn validate_choices(
    question_type: QuestionType,
    choices: &[ChoicePayload],
) -> Result<(), ApiError> {
    if choices.len() < MIN_CHOICES {
        return Err(ApiError::field_error(
            "choices",
            format!("A question needs at least {} choices", MIN_CHOICES),
        ));
    }
    if choices.len() > MAX_CHOICES {
        return Err(ApiError::field_error(
            "choices",
            format!("A question takes at most {} choices", MAX_CHOICES),
        ));
    }

    let correct_count = choices.iter().filter(|c| c.is_correct).count();
    if correct_count == 0 {
        return Err(ApiError::field_error(
            "choices",
            "At least one choice must be marked correct",
        ));
    }

    match question_type {
        QuestionType::Single if correct_count != 1 => Err(ApiError::field_error(
            "question_type",
            "A single-choice question must have exactly one correct choice",
        )),
        QuestionType::Multiple if correct_count < 2 => Err(ApiError::field_error(
            "question_type",
            "A multiple-choice question needs at least two correct choices",
        )),
        _ => Ok(()),
    }
}
