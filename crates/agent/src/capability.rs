use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crease_core::Domain;
use crease_llm::LlmError;

use crate::rules::{RuleFatigueRunner, RuleRiskRunner, RuleTacticalRunner};
use crate::types::{
    AssessmentRequest, FatigueOutput, RiskOutput, RunnerOutput, TacticalOutput, TacticalRequest,
};

/// One capability domain. Implementations either return a well-formed output
/// or an error; how they produce it is invisible to the orchestrator.
#[async_trait]
pub trait Capability: Send + Sync {
    type Request: Send + Sync;
    type Output: Send;

    fn domain(&self) -> Domain;

    /// Invoke the domain. May suspend (network) and may fail.
    async fn run(
        &self,
        request: &Self::Request,
    ) -> Result<RunnerOutput<Self::Output>, CapabilityError>;

    /// Deterministic, infallible output used when `run` fails or is unavailable.
    fn fallback(&self, request: &Self::Request, reason: &str) -> RunnerOutput<Self::Output>;
}

pub type FatigueCapability = dyn Capability<Request = AssessmentRequest, Output = FatigueOutput>;
pub type RiskCapability = dyn Capability<Request = AssessmentRequest, Output = RiskOutput>;
pub type TacticalCapability = dyn Capability<Request = TacticalRequest, Output = TacticalOutput>;

/// The three runners injected into the orchestrator.
#[derive(Clone)]
pub struct CapabilitySet {
    pub fatigue: Arc<FatigueCapability>,
    pub risk: Arc<RiskCapability>,
    pub tactical: Arc<TacticalCapability>,
}

impl CapabilitySet {
    pub fn new(
        fatigue: Arc<FatigueCapability>,
        risk: Arc<RiskCapability>,
        tactical: Arc<TacticalCapability>,
    ) -> Self {
        Self {
            fatigue,
            risk,
            tactical,
        }
    }

    /// Rule-based runners for every domain; no network access.
    pub fn rules() -> Self {
        Self::new(
            Arc::new(RuleFatigueRunner),
            Arc::new(RuleRiskRunner),
            Arc::new(RuleTacticalRunner),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid output: {0}")]
    InvalidOutput(String),
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}
