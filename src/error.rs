use std::time::Duration;
use thiserror::Error;

/// Top-level failure for every quiz operation.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Generation output error: {0}")]
    UpstreamFormat(#[from] UpstreamFormatError),
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Quiz not found: {0}")]
    NotFound(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Invalid quiz data: {0}")]
    Model(#[from] ModelError),
    #[error("Account error: {0}")]
    Account(#[from] AccountError),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Bad request input. Always detected before any generator or store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Topic is required")]
    InvalidTopic,
    #[error("questionCount must be an integer between {min} and {max}")]
    InvalidQuestionCount { min: usize, max: usize },
    #[error("difficulty must be one of: easy, medium, hard (got '{0}')")]
    InvalidDifficulty(String),
    #[error("answers array must contain {expected} items, received {got}")]
    AnswerCountMismatch { expected: usize, got: usize },
    #[error("quizId is required")]
    MissingQuizId,
    #[error("answers must be an array of selected option indices")]
    AnswersNotArray,
}

/// The generator answered, but not with something we can turn into a quiz.
#[derive(Error, Debug)]
pub enum UpstreamFormatError {
    #[error("Generator response was not valid JSON: {0}. Raw payload: {1}")]
    MalformedGenerationOutput(#[source] serde_json::Error, String),
    #[error("Unexpected response shape: {0}")]
    InvalidResponseShape(String),
    #[error("Question {} {reason}", .index + 1)]
    InvalidQuestion { index: usize, reason: String },
}

/// Rejected registrations and sign-ins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Username must contain at least {min} characters")]
    UsernameTooShort { min: usize },
    #[error("Username '{0}' already exists")]
    UsernameTaken(String),
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Violations of the `Question`/`Quiz` construction invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("question text must not be empty")]
    EmptyQuestionText,
    #[error("expected exactly {expected} options, got {got}")]
    OptionCount { expected: usize, got: usize },
    #[error("correct answer '{0}' is not one of the options")]
    CorrectAnswerNotInOptions(String),
    #[error("a quiz needs at least one question")]
    NoQuestions,
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("Mock client error: {0}")]
    Mock(String),
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
    #[error("Response blocked by safety filters")]
    ContentFiltered,
}

/// Coarse classification an outer transport uses to pick a response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    NotFound,
    Server,
}

impl QuizError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::Account(_) => ErrorClass::Client,
            Self::NotFound(_) => ErrorClass::NotFound,
            _ => ErrorClass::Server,
        }
    }

    /// Conventional HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Account(_) => 400,
            Self::NotFound(_) => 404,
            Self::UpstreamFormat(_) | Self::Ai(_) => 502,
            Self::Configuration(_) => 503,
            Self::GenerationTimeout(_) => 504,
            Self::DataIntegrity(_) | Self::Model(_) | Self::Storage(_) => 500,
        }
    }
}
