//! Client-facing response shapes assembled from store rows.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Choice, Question, Title};
use crate::database::stores::titles::{TitleStats, TitleWithStats};

/// Question with its choices embedded, as list and detail endpoints show it.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOut {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionOut {
    pub fn new(question: Question, choices: Vec<Choice>) -> Self {
        Self { question, choices }
    }
}

/// Attach each choice to its question, preserving question order.
pub fn attach_choices(questions: Vec<Question>, choices: Vec<Choice>) -> Vec<QuestionOut> {
    let mut by_question: HashMap<Uuid, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question.entry(choice.question_id).or_default().push(choice);
    }

    questions
        .into_iter()
        .map(|q| {
            let choices = by_question.remove(&q.id).unwrap_or_default();
            QuestionOut::new(q, choices)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleSummary {
    #[serde(flatten)]
    pub title: Title,
    pub questions_count: i64,
    pub average_rating: Option<f64>,
}

impl From<TitleWithStats> for TitleSummary {
    fn from(row: TitleWithStats) -> Self {
        Self {
            title: row.title,
            questions_count: row.questions_count,
            average_rating: round_rating(row.average_rating),
        }
    }
}

impl TitleSummary {
    pub fn new(title: Title, stats: &TitleStats) -> Self {
        Self {
            title,
            questions_count: stats.questions_count,
            average_rating: round_rating(stats.average_rating),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleDetail {
    #[serde(flatten)]
    pub title: Title,
    pub questions: Vec<QuestionOut>,
    pub questions_count: i64,
    pub average_rating: Option<f64>,
    pub ratings_count: i64,
}

impl TitleDetail {
    pub fn new(title: Title, questions: Vec<QuestionOut>, stats: &TitleStats) -> Self {
        Self {
            title,
            questions,
            questions_count: stats.questions_count,
            average_rating: round_rating(stats.average_rating),
            ratings_count: stats.ratings_count,
        }
    }
}

/// Average stars shown with one decimal place.
fn round_rating(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::QuestionType;
    use chrono::Utc;

    #[test]
    fn rounds_average_to_one_decimal() {
        assert_eq!(round_rating(Some(4.666_666)), Some(4.7));
        assert_eq!(round_rating(Some(3.0)), Some(3.0));
        assert_eq!(round_rating(None), None);
    }

    #[test]
    fn attaches_choices_to_their_questions() {
        let now = Utc::now();
        let title_id = Uuid::new_v4();
        let make_question = |position: i32| Question {
            id: Uuid::new_v4(),
            title_id,
            text: format!("q{}", position),
            explanation: String::new(),
            question_type: QuestionType::Single,
            position,
            created_at: now,
            updated_at: now,
        };
        let q1 = make_question(1);
        let q2 = make_question(2);

        let choice = |question_id: Uuid, position: i32| Choice {
            id: Uuid::new_v4(),
            question_id,
            text: format!("c{}", position),
            is_correct: position == 1,
            position,
        };
        let choices = vec![choice(q2.id, 1), choice(q1.id, 1), choice(q1.id, 2)];

        let shaped = attach_choices(vec![q1.clone(), q2.clone()], choices);
        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].question.id, q1.id);
        assert_eq!(shaped[0].choices.len(), 2);
        assert_eq!(shaped[1].question.id, q2.id);
        assert_eq!(shaped[1].choices.len(), 1);
    }

    #[test]
    fn questions_without_choices_get_empty_list() {
        let now = Utc::now();
        let q = Question {
            id: Uuid::new_v4(),
            title_id: Uuid::new_v4(),
            text: "orphan".to_string(),
            explanation: String::new(),
            question_type: QuestionType::Single,
            position: 1,
            created_at: now,
            updated_at: now,
        };
        let shaped = attach_choices(vec![q], vec![]);
        assert!(shaped[0].choices.is_empty());
    }
}
