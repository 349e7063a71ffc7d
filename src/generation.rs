//! Quiz generation: request validation, prompting, and turning the model's
//! free-form answer into canonical questions.

use crate::core::LowLevelClient;
use crate::error::{QuizError, UpstreamFormatError, ValidationError};
use crate::json_utils::extract_json;
use crate::model::{Difficulty, Question};
use crate::normalize::normalize;
use schemars::{schema_for, JsonSchema};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Inclusive bounds on how many questions a quiz may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    pub min_questions: usize,
    pub max_questions: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self { min_questions: 5, max_questions: 10 }
    }
}

impl GenerationLimits {
    /// Validate raw request values into a [`GenerationPlan`].
    ///
    /// Checks run topic, count, difficulty; the first failure wins.
    pub fn plan(
        &self,
        topic: &str,
        question_count: i64,
        difficulty: Option<&str>,
    ) -> Result<GenerationPlan, ValidationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::InvalidTopic);
        }

        let question_count = usize::try_from(question_count)
            .ok()
            .filter(|n| (self.min_questions..=self.max_questions).contains(n))
            .ok_or(ValidationError::InvalidQuestionCount {
                min: self.min_questions,
                max: self.max_questions,
            })?;

        let difficulty = Difficulty::parse_or_default(difficulty)?;

        Ok(GenerationPlan {
            topic: topic.to_string(),
            question_count,
            difficulty,
        })
    }
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub topic: String,
    pub question_count: usize,
    pub difficulty: Difficulty,
}

/// Shape the model is asked to produce. Only used to render schema guidance;
/// the reply itself is validated field by field in `normalize`.
#[derive(JsonSchema)]
#[schemars(title = "Generated Quiz")]
#[allow(dead_code)]
struct GeneratedQuiz {
    /// The quiz questions, exactly as many as requested
    questions: Vec<GeneratedQuestion>,
}

#[derive(JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GeneratedQuestion {
    /// The question text
    question: String,
    /// Exactly four answer options
    #[schemars(length(min = 4, max = 4))]
    options: Vec<String>,
    /// 0-based index of the correct option
    #[schemars(range(min = 0, max = 3))]
    correct_answer_index: u8,
}

/// Build the generation prompt for a validated plan.
pub fn build_prompt(plan: &GenerationPlan) -> String {
    let prompt = format!(
        "Write a multiple-choice quiz about \"{topic}\".\n\
         - Return exactly {count} questions.\n\
         - Target an overall difficulty of {difficulty}.\n\
         - Every question has exactly 4 answer options.\n\
         - Give the 0-based position of the correct option as \"correctAnswerIndex\".\n\
         - Reply with compact JSON only, shaped as {{\"questions\":[{{\"question\":\"...\",\"options\":[\"...\",\"...\",\"...\",\"...\"],\"correctAnswerIndex\":0}}]}}",
        topic = plan.topic,
        count = plan.question_count,
        difficulty = plan.difficulty,
    );
    add_schema_guidance(prompt)
}

fn add_schema_guidance(prompt: String) -> String {
    let schema = schema_for!(GeneratedQuiz);
    let schema_json = serde_json::to_string(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!("{prompt}\n\n## Response Format\nThe JSON must match this schema:\n{schema_json}")
}

/// Generates canonical questions through an injected [`LowLevelClient`].
#[derive(Debug, Clone)]
pub struct QuizGenerationService<C: LowLevelClient> {
    client: C,
    limits: GenerationLimits,
    timeout: Option<Duration>,
}

impl<C: LowLevelClient> QuizGenerationService<C> {
    pub fn new(client: C, limits: GenerationLimits) -> Self {
        info!(
            min_questions = limits.min_questions,
            max_questions = limits.max_questions,
            "Creating new QuizGenerationService"
        );
        Self { client, limits, timeout: None }
    }

    /// Bound each generator call; an expired call is dropped and reported as
    /// [`QuizError::GenerationTimeout`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the request, call the generator once and return exactly
    /// `question_count` canonical questions.
    #[instrument(target = "quizmaster::generation", skip(self), fields(topic = %topic))]
    pub async fn generate(
        &self,
        topic: &str,
        question_count: i64,
        difficulty: Option<&str>,
    ) -> Result<Vec<Question>, QuizError> {
        let plan = self.limits.plan(topic, question_count, difficulty)?;
        self.generate_planned(&plan).await
    }

    /// Generate questions for an already validated plan.
    #[instrument(
        target = "quizmaster::generation",
        skip(self, plan),
        fields(topic = %plan.topic, question_count = plan.question_count, difficulty = %plan.difficulty)
    )]
    pub async fn generate_planned(&self, plan: &GenerationPlan) -> Result<Vec<Question>, QuizError> {
        let prompt = build_prompt(plan);
        debug!(prompt_len = prompt.len(), "Sending generation prompt");

        let raw = self.ask(prompt).await?;
        let payload = extract_json(&raw);
        let parsed: Value = serde_json::from_str(&payload).map_err(|e| {
            warn!(error = %e, raw_len = raw.len(), "Generator output was not valid JSON");
            UpstreamFormatError::MalformedGenerationOutput(e, payload.clone())
        })?;

        let questions = normalize(
            parsed.get("questions").unwrap_or(&Value::Null),
            plan.question_count,
        )
        .inspect_err(|e| warn!(error = %e, "Generator output failed validation"))?;

        info!(count = questions.len(), "Generated quiz questions");
        Ok(questions)
    }

    async fn ask(&self, prompt: String) -> Result<String, QuizError> {
        let Some(limit) = self.timeout else {
            return Ok(self.client.ask_raw(prompt).await?);
        };
        match tokio::time::timeout(limit, self.client.ask_raw(prompt)).await {
            Ok(response) => Ok(response?),
            Err(_) => {
                warn!(timeout = ?limit, "Generator call timed out");
                Err(QuizError::GenerationTimeout(limit))
            }
        }
    }
}
