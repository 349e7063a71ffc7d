pub mod accounts;
pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generation;
pub mod json_utils;
pub mod model;
pub mod normalize;
pub mod scoring;
pub mod service;
pub mod store;

// Convenient re-exports
pub use accounts::UserRegistry;
pub use config::QuizConfig;
pub use error::{ErrorClass, QuizError};
pub use generation::{GenerationLimits, QuizGenerationService};
pub use json_utils::extract_json;
pub use model::{Answer, Difficulty, Question, Quiz, QuizId, QuizResult, ResultId};
pub use normalize::normalize;
pub use scoring::{score, ScoreOutcome};
pub use service::QuizMaster;
