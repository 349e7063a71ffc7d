//! Quiz data model. Constructors enforce the invariants; stored records that
//! come back through `Deserialize` are re-checked where they are consumed.

use crate::error::{ModelError, ValidationError};
use crate::json_utils::as_integer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse an optional difficulty, falling back to `Medium` when absent.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ValidationError> {
        value.map_or(Ok(Self::default()), |s| s.parse())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ValidationError::InvalidDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

uuid_id!(QuizId);
uuid_id!(ResultId);

/// A multiple-choice question whose correct answer is one of its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ModelError::EmptyQuestionText);
        }
        if options.len() != OPTIONS_PER_QUESTION {
            return Err(ModelError::OptionCount {
                expected: OPTIONS_PER_QUESTION,
                got: options.len(),
            });
        }
        let correct_answer = correct_answer.into();
        if !options.contains(&correct_answer) {
            return Err(ModelError::CorrectAnswerNotInOptions(correct_answer));
        }
        Ok(Self { text, options, correct_answer })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Position of the correct answer among the options.
    ///
    /// `None` only for a record that bypassed [`Question::new`], e.g. a
    /// corrupted document read back from storage.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|option| *option == self.correct_answer)
    }
}

/// A generated quiz. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    id: QuizId,
    topic: String,
    difficulty: Difficulty,
    question_count: usize,
    questions: Vec<Question>,
    created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(
        topic: impl Into<String>,
        difficulty: Difficulty,
        questions: Vec<Question>,
    ) -> Result<Self, ModelError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(ModelError::EmptyTopic);
        }
        if questions.is_empty() {
            return Err(ModelError::NoQuestions);
        }
        Ok(Self {
            id: QuizId::new(),
            topic,
            difficulty,
            question_count: questions.len(),
            questions,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> QuizId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One submitted answer slot, kept exactly as the client sent it.
///
/// Anything that is not a whole number (strings, `null`, `1.5`) simply never
/// matches an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answer(Value);

impl Answer {
    /// The selected option index, if the slot holds a non-negative integer.
    pub fn index(&self) -> Option<usize> {
        as_integer(&self.0).and_then(|n| usize::try_from(n).ok())
    }

}

impl From<Value> for Answer {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<i64> for Answer {
    fn from(index: i64) -> Self {
        Self(Value::from(index))
    }
}

/// Record of one graded submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: ResultId,
    pub user: String,
    pub quiz_id: QuizId,
    pub score: u8,
    pub correct_count: usize,
    pub total: usize,
    pub topic: String,
    pub difficulty: Difficulty,
    pub answers: Vec<Answer>,
    pub timestamp: DateTime<Utc>,
}
