use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crease_core::config::Config;
use crease_core::Domain;
use crease_llm::{create_provider, LlmError};

use crate::capability::CapabilitySet;
use crate::executor::PromptExecutor;
use crate::llm_runner::{
    LlmRunner, FATIGUE_SYSTEM_PROMPT, RISK_SYSTEM_PROMPT, TACTICAL_SYSTEM_PROMPT,
};
use crate::rules::{RuleFatigueRunner, RuleRiskRunner, RuleTacticalRunner};

/// Build the capability runners named by `LLM_PROVIDER`.
///
/// `rules` gives deterministic runners only; any chat-completion provider gets
/// one executor per domain, bound to that domain's model or deployment.
pub fn build_capabilities(config: &Config) -> Result<CapabilitySet, LlmError> {
    let llm = &config.llm;
    if llm.provider == "rules" {
        info!("capabilities: rule-based runners");
        return Ok(CapabilitySet::rules());
    }

    let timeout = Duration::from_millis(llm.timeout_ms);
    let executor = |model: &str| -> Result<PromptExecutor, LlmError> {
        let provider = create_provider(llm, &config.ollama, model)?;
        Ok(PromptExecutor::new(provider, llm.temperature, llm.max_tokens, timeout))
    };

    let set = CapabilitySet::new(
        Arc::new(LlmRunner::new(
            Domain::Fatigue,
            FATIGUE_SYSTEM_PROMPT,
            executor(&llm.models.fatigue)?,
            RuleFatigueRunner,
        )),
        Arc::new(LlmRunner::new(
            Domain::Risk,
            RISK_SYSTEM_PROMPT,
            executor(&llm.models.risk)?,
            RuleRiskRunner,
        )),
        Arc::new(LlmRunner::new(
            Domain::Tactical,
            TACTICAL_SYSTEM_PROMPT,
            executor(&llm.models.tactical)?,
            RuleTacticalRunner,
        )),
    );

    info!(provider = %llm.provider, timeout_ms = llm.timeout_ms, "capabilities: chat-completion runners");
    Ok(set)
}
