//! Persistence boundary for quizzes and graded results.
//!
//! Real deployments plug a document store in behind these traits; the
//! in-memory implementations back the CLI and the tests.

use crate::error::QuizError;
use crate::model::{Quiz, QuizId, QuizResult, ResultId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::sync::RwLock;

#[async_trait]
pub trait QuizCatalog: Send + Sync + Debug {
    async fn insert(&self, quiz: Quiz) -> Result<(), QuizError>;

    async fn get(&self, id: &QuizId) -> Result<Option<Quiz>, QuizError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync + Debug {
    async fn insert(&self, result: QuizResult) -> Result<(), QuizError>;

    async fn get(&self, id: &ResultId) -> Result<Option<QuizResult>, QuizError>;

    /// All results recorded for `user`, newest first.
    async fn list_for_user(&self, user: &str) -> Result<Vec<QuizResult>, QuizError>;
}

#[derive(Debug, Default)]
pub struct InMemoryQuizCatalog {
    quizzes: RwLock<HashMap<QuizId, Quiz>>,
}

impl InMemoryQuizCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.quizzes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quizzes.read().await.is_empty()
    }
}

#[async_trait]
impl QuizCatalog for InMemoryQuizCatalog {
    async fn insert(&self, quiz: Quiz) -> Result<(), QuizError> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id()) {
            return Err(QuizError::Storage(format!("quiz {} already exists", quiz.id())));
        }
        quizzes.insert(quiz.id(), quiz);
        Ok(())
    }

    async fn get(&self, id: &QuizId) -> Result<Option<Quiz>, QuizError> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: RwLock<Vec<QuizResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn insert(&self, result: QuizResult) -> Result<(), QuizError> {
        let mut results = self.results.write().await;
        if results.iter().any(|existing| existing.id == result.id) {
            return Err(QuizError::Storage(format!("result {} already exists", result.id)));
        }
        results.push(result);
        Ok(())
    }

    async fn get(&self, id: &ResultId) -> Result<Option<QuizResult>, QuizError> {
        Ok(self.results.read().await.iter().find(|r| r.id == *id).cloned())
    }

    async fn list_for_user(&self, user: &str) -> Result<Vec<QuizResult>, QuizError> {
        let mut found: Vec<QuizResult> = self
            .results
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| r.user == user)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(found)
    }
}
