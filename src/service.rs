//! Request/response facade over generation, storage and scoring.
//!
//! `QuizMaster` is what a transport layer calls: it owns the validation order
//! of the Generate and Submit operations and shapes their JSON payloads.

use crate::accounts::UserRegistry;
use crate::config::QuizConfig;
use crate::core::LowLevelClient;
use crate::error::{AccountError, QuizError, ValidationError};
use crate::generation::{GenerationLimits, QuizGenerationService};
use crate::json_utils::coerce_integer;
use crate::model::{Answer, Difficulty, Quiz, QuizId, QuizResult, ResultId};
use crate::scoring::score;
use crate::store::{QuizCatalog, ResultStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: Option<String>,
    /// Integer or numeric string; absent, `null` or `""` means the minimum.
    #[serde(default)]
    pub question_count: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub quiz_id: QuizId,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub questions: Vec<ClientQuestion>,
    pub created_at: DateTime<Utc>,
}

/// A question as handed to the client: the answer is exposed by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
}

impl GenerateResponse {
    pub fn from_quiz(quiz: &Quiz) -> Result<Self, QuizError> {
        let questions = quiz
            .questions()
            .iter()
            .map(|question| {
                let answer_index = question.correct_index().ok_or_else(|| {
                    QuizError::DataIntegrity(
                        "stored quiz question is missing the correct answer in options".to_string(),
                    )
                })?;
                Ok(ClientQuestion {
                    question: question.text().to_string(),
                    options: question.options().to_vec(),
                    answer_index,
                })
            })
            .collect::<Result<Vec<_>, QuizError>>()?;

        Ok(Self {
            quiz_id: quiz.id(),
            topic: quiz.topic().to_string(),
            difficulty: quiz.difficulty(),
            question_count: quiz.question_count(),
            questions,
            created_at: quiz.created_at(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub quiz_id: Option<String>,
    /// Kept untyped so a non-array can be reported as a validation error.
    #[serde(default)]
    pub answers: Option<Value>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub score: u8,
    pub correct_count: usize,
    pub total: usize,
    pub result_id: ResultId,
    pub correct_answers: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// Submissions work but generation is unavailable.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub generation_available: bool,
}

/// The quiz application: generation (when configured), catalog, scoring and results.
#[derive(Debug)]
pub struct QuizMaster<C: LowLevelClient> {
    generator: Option<QuizGenerationService<C>>,
    limits: GenerationLimits,
    default_user: String,
    catalog: Arc<dyn QuizCatalog>,
    results: Arc<dyn ResultStore>,
    accounts: UserRegistry,
}

impl<C: LowLevelClient> QuizMaster<C> {
    /// `client` is `None` when no generator credential is configured; Generate
    /// then fails with a configuration error while Submit keeps working.
    pub fn new(
        config: &QuizConfig,
        client: Option<C>,
        catalog: Arc<dyn QuizCatalog>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        let limits = config.limits();
        let generator = client.map(|client| {
            QuizGenerationService::new(client, limits).with_timeout(config.generation_timeout)
        });
        if generator.is_none() {
            warn!("No generator configured; quiz generation is disabled");
        }
        Self {
            generator,
            limits,
            default_user: config.default_user.clone(),
            catalog,
            results,
            accounts: UserRegistry::new(),
        }
    }

    /// Generate, persist and return a new quiz.
    #[instrument(skip(self, request), fields(topic = ?request.topic))]
    pub async fn generate_quiz(&self, request: GenerateRequest) -> Result<GenerateResponse, QuizError> {
        let topic = request
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .ok_or(ValidationError::InvalidTopic)?;
        let question_count = self.requested_count(request.question_count.as_ref())?;
        let plan = self
            .limits
            .plan(topic, question_count, request.difficulty.as_deref())?;

        let generator = self.generator.as_ref().ok_or_else(|| {
            QuizError::Configuration("GEMINI_API_KEY is not configured".to_string())
        })?;

        let questions = generator.generate_planned(&plan).await?;
        let quiz = Quiz::new(plan.topic, plan.difficulty, questions)?;
        let response = GenerateResponse::from_quiz(&quiz)?;
        self.catalog.insert(quiz).await?;

        info!(quiz_id = %response.quiz_id, question_count = response.question_count, "Quiz created");
        Ok(response)
    }

    /// Grade a submission and record the result.
    #[instrument(skip(self, request), fields(quiz_id = ?request.quiz_id))]
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, QuizError> {
        let raw_id = request
            .quiz_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingQuizId)?;
        let answers: Vec<Answer> = match request.answers {
            Some(Value::Array(items)) => items.into_iter().map(Answer::from).collect(),
            _ => return Err(ValidationError::AnswersNotArray.into()),
        };

        let quiz_id: QuizId = raw_id
            .parse()
            .map_err(|_| QuizError::NotFound(raw_id.to_string()))?;
        let quiz = self
            .catalog
            .get(&quiz_id)
            .await?
            .ok_or_else(|| QuizError::NotFound(raw_id.to_string()))?;

        let outcome = score(&quiz, &answers)?;

        let result = QuizResult {
            id: ResultId::new(),
            user: self.resolve_user(request.user.as_deref()),
            quiz_id,
            score: outcome.score,
            correct_count: outcome.correct_count,
            total: outcome.total,
            topic: quiz.topic().to_string(),
            difficulty: quiz.difficulty(),
            answers,
            timestamp: Utc::now(),
        };
        let result_id = result.id;
        self.results.insert(result).await?;

        info!(%result_id, score = outcome.score, correct = outcome.correct_count, total = outcome.total, "Submission graded");
        Ok(SubmitResponse {
            score: outcome.score,
            correct_count: outcome.correct_count,
            total: outcome.total,
            result_id,
            correct_answers: outcome.correct_answer_indices,
        })
    }

    /// Past results for `user` (or the anonymous user), newest first.
    pub async fn history(&self, user: Option<&str>) -> Result<Vec<QuizResult>, QuizError> {
        self.results.list_for_user(&self.resolve_user(user)).await
    }

    /// Create a player account; returns the name results will be recorded under.
    pub async fn register(&self, username: &str, password: &str) -> Result<String, QuizError> {
        Ok(self.accounts.register(username, password).await?)
    }

    /// Check a player's credentials and return their account name.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, QuizError> {
        if !self.accounts.authenticate(username, password).await {
            warn!("Rejected sign-in");
            return Err(AccountError::InvalidCredentials.into());
        }
        Ok(username.trim().to_string())
    }

    pub fn health(&self) -> HealthReport {
        let generation_available = self.generator.is_some();
        HealthReport {
            status: if generation_available { HealthStatus::Ok } else { HealthStatus::Degraded },
            generation_available,
        }
    }

    fn requested_count(&self, raw: Option<&Value>) -> Result<i64, ValidationError> {
        let invalid = ValidationError::InvalidQuestionCount {
            min: self.limits.min_questions,
            max: self.limits.max_questions,
        };
        match raw {
            None | Some(Value::Null) => Ok(default_count(self.limits)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(default_count(self.limits)),
            Some(value) => coerce_integer(value).ok_or(invalid),
        }
    }

    fn resolve_user(&self, user: Option<&str>) -> String {
        user.map(str::trim)
            .filter(|user| !user.is_empty())
            .unwrap_or(&self.default_user)
            .to_string()
    }
}

fn default_count(limits: GenerationLimits) -> i64 {
    i64::try_from(limits.min_questions).unwrap_or(i64::MAX)
}
