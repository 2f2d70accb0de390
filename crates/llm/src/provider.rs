use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat message for the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// Chat-completion backend. Each provider implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and return the assistant's response text.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Model or deployment name, reported as `modelUsed` by capability runners.
    fn model(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Scripted provider for tests: replies are returned in queue order.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub struct MockLlmProvider {
        model: String,
        replies: Mutex<VecDeque<Result<String, String>>>,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl MockLlmProvider {
        pub fn new(model: &str) -> Self {
            Self {
                model: model.to_string(),
                replies: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn queue_text(&self, text: &str) {
            self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        }

        /// Queue a 500 API failure carrying `body`.
        pub fn queue_error(&self, body: &str) {
            self.replies.lock().unwrap().push_back(Err(body.to_string()));
        }

        /// Messages received so far, one entry per `complete` call.
        pub fn prompts(&self) -> Vec<Vec<Message>> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(messages);
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(body)) => Err(LlmError::ApiError { status: 500, body }),
                None => Err(LlmError::NotConfigured("no scripted reply".into())),
            }
        }

        fn model(&self) -> &str {
            &self.model
        }
    }
}
