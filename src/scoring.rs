use crate::error::{QuizError, ValidationError};
use crate::model::{Answer, Quiz};
use serde::Serialize;
use tracing::{debug, instrument};

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    /// Percentage of correct answers, 0..=100.
    pub score: u8,
    pub correct_count: usize,
    pub total: usize,
    /// Correct option index for every question, in quiz order.
    pub correct_answer_indices: Vec<usize>,
}

/// Grade `answers` against `quiz`.
///
/// Answers that are out of range, negative or not integers count as wrong;
/// only a length mismatch or a corrupted quiz is an error. Pure: the same
/// inputs always give the same outcome.
#[instrument(target = "quizmaster::scoring", skip_all, fields(quiz_id = %quiz.id()))]
pub fn score(quiz: &Quiz, answers: &[Answer]) -> Result<ScoreOutcome, QuizError> {
    let questions = quiz.questions();
    let total = questions.len();
    if total == 0 {
        return Err(QuizError::DataIntegrity(format!(
            "stored quiz {} has no questions",
            quiz.id()
        )));
    }
    if answers.len() != total {
        return Err(ValidationError::AnswerCountMismatch {
            expected: total,
            got: answers.len(),
        }
        .into());
    }

    let correct_answer_indices = questions
        .iter()
        .enumerate()
        .map(|(position, question)| {
            question.correct_index().ok_or_else(|| {
                QuizError::DataIntegrity(format!(
                    "question {} of quiz {} does not list its correct answer among the options",
                    position + 1,
                    quiz.id()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let correct_count = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| {
            answer
                .index()
                .and_then(|selected| question.options().get(selected))
                .is_some_and(|option| option == question.correct_answer())
        })
        .count();

    let score = percentage(correct_count, total);
    debug!(correct_count, total, score, "graded submission");

    Ok(ScoreOutcome {
        score,
        correct_count,
        total,
        correct_answer_indices,
    })
}

/// `round(correct / total * 100)` with ties rounded up, in integer arithmetic
/// so exact halves (1/8 -> 12.5) never depend on float representation.
fn percentage(correct: usize, total: usize) -> u8 {
    let rounded = (correct * 200 + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
