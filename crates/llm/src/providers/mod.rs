pub mod azure;
pub mod ollama;
pub mod openai;

use crease_core::config::{LlmConfig, OllamaConfig};
use serde_json::json;

use crate::provider::{LlmError, LlmProvider, Message};

/// Create the chat-completion provider named in config, bound to `model`
/// (an OpenAI model name, an Azure deployment, or ignored for Ollama).
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
    model: &str,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                model.to_string(),
                base_url.to_string(),
            )))
        }
        "azure" => {
            let api_key = llm_config
                .azure_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("AZURE_OPENAI_API_KEY not set".into()))?;
            let endpoint = llm_config
                .azure_endpoint
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("AZURE_OPENAI_ENDPOINT not set".into()))?;
            Ok(Box::new(azure::AzureOpenAiProvider::new(
                api_key.clone(),
                endpoint.clone(),
                model.to_string(),
                llm_config.azure_api_version.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

/// Messages in the OpenAI-compatible `{role, content}` wire shape.
pub(crate) fn chat_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect()
}
