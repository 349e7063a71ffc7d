use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{core::LowLevelClient, error::AIError};

/// One scripted reply for [`MockClient`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(String),
    /// Reply with the text after sleeping; used to exercise timeouts.
    Delayed(Duration, String),
}

impl MockResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }
}

/// Shared control surface for a [`MockClient`]: queue replies, inspect prompts.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Number of generator calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Mock client for testing that replays scripted responses in order
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::default(),
        });
        (Self { handle: handle.clone() }, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        match self.handle.next(prompt) {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(AIError::Mock(message)),
            Some(MockResponse::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(AIError::Mock("no scripted response left".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// A well-formed model reply with `count` placeholder questions on `topic`,
/// wrapped in a ```json fence the way chat models usually answer.
pub fn canned_quiz(topic: &str, count: usize) -> String {
    let questions: Vec<_> = (0..count)
        .map(|i| {
            let correct = i % 4;
            json!({
                "question": format!("Sample question {} about {topic}?", i + 1),
                "options": (0..4)
                    .map(|o| if o == correct { format!("Right answer {}", i + 1) } else { format!("Wrong answer {}.{}", i + 1, o + 1) })
                    .collect::<Vec<_>>(),
                "correctAnswerIndex": correct,
            })
        })
        .collect();
    format!(
        "Here is your quiz:\n```json\n{}\n```",
        json!({ "questions": questions })
    )
}
