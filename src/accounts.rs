//! Named player accounts. Results are recorded under the account name, so
//! history lookups line up with whoever signed in.

use crate::error::AccountError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

pub const MIN_USERNAME_LEN: usize = 3;

/// Usernames mapped to SHA-256 password hashes. Passwords are never kept.
#[derive(Debug, Default)]
pub struct UserRegistry {
    credentials: RwLock<HashMap<String, String>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `username` and return its trimmed form.
    #[instrument(target = "quizmaster::accounts", skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let username = username.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AccountError::UsernameTooShort { min: MIN_USERNAME_LEN });
        }
        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(username) {
            return Err(AccountError::UsernameTaken(username.to_string()));
        }
        credentials.insert(username.to_string(), hash_password(password));
        info!(target: "quizmaster::accounts", %username, "Registered user");
        Ok(username.to_string())
    }

    /// `true` only for a known user whose password hashes to the stored value.
    #[instrument(target = "quizmaster::accounts", skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> bool {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return false;
        }
        let accepted = self
            .credentials
            .read()
            .await
            .get(username)
            .is_some_and(|stored| *stored == hash_password(password));
        debug!(target: "quizmaster::accounts", accepted, "Authentication attempt");
        accepted
    }

    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
