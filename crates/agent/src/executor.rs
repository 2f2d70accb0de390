use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crease_core::Domain;
use crease_llm::{extract_json, LlmProvider, Message};

use crate::capability::CapabilityError;

/// Sends one domain prompt to a chat-completion provider and decodes the JSON reply.
pub struct PromptExecutor {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl PromptExecutor {
    pub fn new(
        provider: Box<dyn LlmProvider>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Execute a prompt: `system_prompt` as the system message, `payload` as a
    /// JSON user message. Transport failures and timeouts surface as
    /// `Llm`/`Timeout`; a reply that does not decode as `T` is `InvalidOutput`.
    pub async fn execute_json<T, P>(
        &self,
        domain: Domain,
        system_prompt: &str,
        payload: &P,
    ) -> Result<T, CapabilityError>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let start = Instant::now();

        let context = serde_json::to_string_pretty(payload)
            .map_err(|e| CapabilityError::InvalidOutput(format!("unserializable request: {e}")))?;

        let messages = vec![
            Message::system(system_prompt),
            Message::user(format!(
                "## Match context\n{context}\n\nRespond ONLY with a single JSON object."
            )),
        ];

        info!(%domain, model = self.model(), "executing capability prompt");

        let reply = tokio::time::timeout(
            self.timeout,
            self.provider
                .complete(messages, self.temperature, self.max_tokens),
        )
        .await
        .map_err(|_| CapabilityError::Timeout(self.timeout))??;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        debug!(%domain, elapsed_ms, "capability reply: {}", reply);

        serde_json::from_str(extract_json(&reply))
            .map_err(|e| CapabilityError::InvalidOutput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use crease_llm::provider::mock::MockLlmProvider;
    use crease_llm::LlmError;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        severity: String,
    }

    fn executor(provider: MockLlmProvider) -> PromptExecutor {
        PromptExecutor::new(Box::new(provider), 0.2, 200, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn decodes_fenced_reply() {
        let provider = MockLlmProvider::new("gpt-test");
        provider.queue_text("```json\n{\"severity\": \"HIGH\"}\n```");
        let exec = executor(provider);
        let verdict: Verdict = exec
            .execute_json(Domain::Risk, "system", &serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(verdict.severity, "HIGH");
        assert_eq!(exec.model(), "gpt-test");
    }

    #[tokio::test]
    async fn prose_reply_is_invalid_output() {
        let provider = MockLlmProvider::new("gpt-test");
        provider.queue_text("I think the bowler is tired.");
        let err = executor(provider)
            .execute_json::<Verdict, _>(Domain::Fatigue, "system", &1)
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn api_failure_is_llm_error() {
        let provider = MockLlmProvider::new("gpt-test");
        provider.queue_error("overloaded");
        let err = executor(provider)
            .execute_json::<Verdict, _>(Domain::Tactical, "system", &1)
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Llm(LlmError::ApiError { status: 500, .. })));
    }

    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        async fn complete(
            &self,
            _messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            std::future::pending::<()>().await;
            unreachable!()
        }

        fn model(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out() {
        let exec = PromptExecutor::new(Box::new(StalledProvider), 0.2, 200, Duration::from_millis(50));
        let err = exec
            .execute_json::<Verdict, _>(Domain::Risk, "system", &1)
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Timeout(_)));
    }
}
