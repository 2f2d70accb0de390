use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crease_core::Domain;

use crate::capability::{Capability, CapabilityError};
use crate::executor::PromptExecutor;
use crate::types::{RunnerOutput, Validate};

pub const FATIGUE_SYSTEM_PROMPT: &str = "You are a cricket workload analyst. \
Assess the active player's fatigue from the telemetry provided. \
Reply with JSON: {\"fatigueIndex\": number 0-10, \"projectedFatigue\": number, \
\"severity\": \"LOW\"|\"MEDIUM\"|\"HIGH\"|\"CRITICAL\", \"headline\": string, \
\"recommendation\": string, \"signals\": [string]}.";

pub const RISK_SYSTEM_PROMPT: &str = "You are a cricket sports-medicine analyst. \
Assess the active player's injury and no-ball risk from the telemetry provided. \
Reply with JSON: {\"severity\": \"LOW\"|\"MEDIUM\"|\"HIGH\"|\"CRITICAL\", \
\"injuryRisk\": \"LOW\"|\"MEDIUM\"|\"HIGH\"|\"UNKNOWN\", \"noBallRisk\": same, \
\"headline\": string, \"recommendation\": string, \"rationale\": string, \
\"mitigations\": [string], \"signals\": [string]}.";

pub const TACTICAL_SYSTEM_PROMPT: &str = "You are a cricket tactics coach. \
Using the match state, the fatigue and risk assessments and the ranked safe \
candidates, decide the single next action for the active player. Only name \
replacement players from the candidate lists. Reply with JSON: \
{\"immediateAction\": string, \"rationale\": string, \"suggestedAdjustments\": [string], \
\"nextBowler\": string|null, \"nextBatter\": string|null, \
\"confidence\": \"LOW\"|\"MEDIUM\"|\"HIGH\"}.";

/// Chat-completion-backed runner for one domain.
///
/// `rules` supplies the fallback: a reply that fails to decode or validate is
/// replaced by the rule assessment and reported in `fallbacks_used`; transport
/// errors and timeouts are returned to the caller.
pub struct LlmRunner<R> {
    domain: Domain,
    system_prompt: &'static str,
    executor: PromptExecutor,
    rules: R,
}

impl<R> LlmRunner<R> {
    pub fn new(domain: Domain, system_prompt: &'static str, executor: PromptExecutor, rules: R) -> Self {
        Self {
            domain,
            system_prompt,
            executor,
            rules,
        }
    }
}

#[async_trait]
impl<R> Capability for LlmRunner<R>
where
    R: Capability,
    R::Request: Serialize,
    R::Output: DeserializeOwned + Validate,
{
    type Request = R::Request;
    type Output = R::Output;

    fn domain(&self) -> Domain {
        self.domain
    }

    async fn run(
        &self,
        request: &Self::Request,
    ) -> Result<RunnerOutput<Self::Output>, CapabilityError> {
        let decoded = self
            .executor
            .execute_json::<R::Output, _>(self.domain, self.system_prompt, request)
            .await
            .and_then(|output| {
                output
                    .validate()
                    .map(|_| output)
                    .map_err(CapabilityError::InvalidOutput)
            });

        match decoded {
            Ok(output) => Ok(RunnerOutput {
                output,
                model: self.executor.model().to_string(),
                fallbacks_used: Vec::new(),
            }),
            Err(CapabilityError::InvalidOutput(reason)) => {
                warn!(domain = %self.domain, %reason, "model reply rejected, using rule assessment");
                Ok(self.fallback(request, &format!("invalid_output: {reason}")))
            }
            Err(e) => Err(e),
        }
    }

    fn fallback(&self, request: &Self::Request, reason: &str) -> RunnerOutput<Self::Output> {
        self.rules.fallback(request, reason)
    }
}
