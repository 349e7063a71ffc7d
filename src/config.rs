use crate::error::QuizError;
use crate::generation::GenerationLimits;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const MIN_QUESTIONS_VAR: &str = "QUIZ_MIN_QUESTIONS";
pub const MAX_QUESTIONS_VAR: &str = "QUIZ_MAX_QUESTIONS";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const DEFAULT_USER_VAR: &str = "QUIZ_DEFAULT_USER";
pub const TIMEOUT_VAR: &str = "QUIZ_GENERATION_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_USER: &str = "anonymous";

/// Trait for types that can retrieve their credential from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key through `lookup`. Blank values count as absent.
    fn find_key_with<F>(lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(Self::KEY_NAME)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// Everything the quiz pipeline reads from the environment.
#[derive(Clone)]
pub struct QuizConfig {
    pub min_questions: usize,
    pub max_questions: usize,
    pub model: String,
    pub default_user: String,
    /// `None` disables generation; submissions keep working.
    pub api_key: Option<String>,
    pub generation_timeout: Option<Duration>,
}

impl KeyFromEnv for QuizConfig {
    const KEY_NAME: &'static str = "GEMINI_API_KEY";
}

impl Default for QuizConfig {
    fn default() -> Self {
        let limits = GenerationLimits::default();
        Self {
            min_questions: limits.min_questions,
            max_questions: limits.max_questions,
            model: DEFAULT_MODEL.to_string(),
            default_user: DEFAULT_USER.to_string(),
            api_key: None,
            generation_timeout: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("min_questions", &self.min_questions)
            .field("max_questions", &self.max_questions)
            .field("model", &self.model)
            .field("default_user", &self.default_user)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("generation_timeout", &self.generation_timeout)
            .finish()
    }
}

impl QuizConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, QuizError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QuizError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let min_questions = parse_var(&lookup, MIN_QUESTIONS_VAR, defaults.min_questions)?;
        let max_questions = parse_var(&lookup, MAX_QUESTIONS_VAR, defaults.max_questions)?;
        if min_questions == 0 {
            return Err(QuizError::Configuration(format!(
                "{MIN_QUESTIONS_VAR} must be at least 1"
            )));
        }
        if min_questions > max_questions {
            return Err(QuizError::Configuration(format!(
                "{MIN_QUESTIONS_VAR} ({min_questions}) must not exceed {MAX_QUESTIONS_VAR} ({max_questions})"
            )));
        }

        let timeout_secs: Option<u64> = non_blank(&lookup, TIMEOUT_VAR)
            .map(|raw| parse_value(TIMEOUT_VAR, &raw))
            .transpose()?;

        Ok(Self {
            min_questions,
            max_questions,
            model: non_blank(&lookup, MODEL_VAR).unwrap_or(defaults.model),
            default_user: non_blank(&lookup, DEFAULT_USER_VAR).unwrap_or(defaults.default_user),
            api_key: Self::find_key_with(&lookup),
            generation_timeout: timeout_secs.filter(|&s| s > 0).map(Duration::from_secs),
        })
    }

    pub fn limits(&self) -> GenerationLimits {
        GenerationLimits {
            min_questions: self.min_questions,
            max_questions: self.max_questions,
        }
    }

    /// The generator credential, or a configuration error when it is absent.
    pub fn require_api_key(&self) -> Result<&str, QuizError> {
        self.api_key.as_deref().ok_or_else(|| {
            QuizError::Configuration(format!("{} is not configured", Self::KEY_NAME))
        })
    }
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, QuizError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_blank(lookup, name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, QuizError> {
    raw.parse()
        .map_err(|_| QuizError::Configuration(format!("{name} has invalid value '{raw}'")))
}
