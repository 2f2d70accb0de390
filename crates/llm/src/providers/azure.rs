use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::chat_messages;
use crate::provider::{LlmError, LlmProvider, Message};

/// Azure OpenAI chat completions, addressed by deployment rather than model.
pub struct AzureOpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiProvider {
    pub fn new(api_key: String, endpoint: String, deployment: String, api_version: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment,
            api_version,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = self.url();

        let body = json!({
            "messages": chat_messages(&messages),
            "temperature": temperature,
            "max_tokens": max_tokens,
            "response_format": { "type": "json_object" },
        });

        debug!(deployment = %self.deployment, "Azure OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))?
            .to_string();

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_url() {
        let provider = AzureOpenAiProvider::new(
            "k".into(),
            "https://coach.openai.azure.com/".into(),
            "tactical".into(),
            "2024-06-01".into(),
        );
        assert_eq!(
            provider.url(),
            "https://coach.openai.azure.com/openai/deployments/tactical/chat/completions?api-version=2024-06-01"
        );
    }
}
