use crate::error::UpstreamFormatError;
use crate::json_utils::coerce_integer;
use crate::model::{Question, OPTIONS_PER_QUESTION};
use serde_json::Value;
use tracing::{debug, instrument};

/// Validate the generator's raw `questions` value and reshape it into
/// canonical questions.
///
/// The whole list is rejected if any single entry is invalid; entries are
/// checked in order so the reported index is the first bad one.
#[instrument(target = "quizmaster::normalize", skip(raw))]
pub fn normalize(raw: &Value, expected_count: usize) -> Result<Vec<Question>, UpstreamFormatError> {
    let items = raw.as_array().ok_or_else(|| {
        UpstreamFormatError::InvalidResponseShape(
            "generator did not return an array of questions".to_string(),
        )
    })?;
    if items.len() != expected_count {
        return Err(UpstreamFormatError::InvalidResponseShape(format!(
            "expected {expected_count} questions, received {}",
            items.len()
        )));
    }

    let questions = items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_question(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(target: "quizmaster::normalize", count = questions.len(), "normalized questions");
    Ok(questions)
}

fn normalize_question(index: usize, item: &Value) -> Result<Question, UpstreamFormatError> {
    let invalid = |reason: &str| UpstreamFormatError::InvalidQuestion {
        index,
        reason: reason.to_string(),
    };

    let text = item
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| invalid("is missing its question text"))?;

    let options: Vec<String> = item
        .get("options")
        .and_then(Value::as_array)
        .filter(|options| options.len() == OPTIONS_PER_QUESTION)
        .ok_or_else(|| invalid("must provide exactly 4 options"))?
        .iter()
        .map(option_text)
        .collect();

    let correct_index = item
        .get("correctAnswerIndex")
        .and_then(coerce_integer)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n < options.len())
        .ok_or_else(|| invalid("has an invalid correctAnswerIndex"))?;

    let correct_answer = options[correct_index].clone();
    Question::new(text, options, correct_answer).map_err(|e| invalid(&e.to_string()))
}

fn option_text(option: &Value) -> String {
    match option {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
