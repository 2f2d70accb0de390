use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crease_agent::{CapabilitySet, FatigueOutput, RiskOutput, TacticalOutput};
use crease_core::config::OrchestratorConfig;
use crease_core::{OrchestrationSnapshot, RouterDecision, SafetyRanking};

use crate::executor::DomainExecutor;
use crate::merge::{merge, FinalRecommendation};
use crate::ranker::rank;
use crate::result::{CapabilityResult, DomainError};
use crate::router::{decide, AnalysisMode};
use crate::triggers::{compute_triggers, TriggerScores};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResults {
    pub fatigue: CapabilityResult<FatigueOutput>,
    pub risk: CapabilityResult<RiskOutput>,
    pub tactical: CapabilityResult<TacticalOutput>,
}

/// Everything produced for one request. Always complete: failures show up
/// in `errors` and in the per-domain statuses, never as a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResponse {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
    pub router: RouterDecision,
    pub results: DomainResults,
    pub recommendation: FinalRecommendation,
    pub triggers: TriggerScores,
    pub safety: SafetyRanking,
    pub errors: Vec<DomainError>,
}

/// Entry point for callers. Holds read-only configuration and the injected
/// capability runners; holds no per-request state.
pub struct Orchestrator {
    config: Arc<OrchestratorConfig>,
    executor: DomainExecutor,
}

impl Orchestrator {
    pub fn new(config: Arc<OrchestratorConfig>, capabilities: CapabilitySet) -> Self {
        let executor = DomainExecutor::new(capabilities, config.substitute_fallbacks);
        Self { config, executor }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn rank(&self, snapshot: &OrchestrationSnapshot) -> SafetyRanking {
        rank(
            snapshot,
            snapshot.active_player_id(),
            self.config.candidate_limit,
            &self.config.thresholds.ranker,
        )
    }

    pub fn triggers(&self, snapshot: &OrchestrationSnapshot) -> TriggerScores {
        compute_triggers(snapshot, &self.config.thresholds.triggers)
    }

    pub fn route(&self, snapshot: &OrchestrationSnapshot, mode: AnalysisMode) -> RouterDecision {
        decide(mode, snapshot, &self.config.thresholds.router)
    }

    pub async fn advise(
        &self,
        snapshot: &OrchestrationSnapshot,
        mode: AnalysisMode,
    ) -> OrchestrationResponse {
        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();

        let safety = self.rank(snapshot);
        let triggers = self.triggers(snapshot);
        let router = self.route(snapshot, mode);
        info!(
            %request_id,
            player = snapshot.active_player_id(),
            intent = ?router.intent,
            agents = ?router.agents_to_run,
            rules = ?router.rules_fired,
            "routing decision"
        );

        let run = self.executor.run(&router, snapshot, &safety).await;
        let recommendation = merge(snapshot, &router, &run, &safety);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            %request_id,
            authority = ?recommendation.authority,
            confidence = ?recommendation.confidence,
            errors = run.errors.len(),
            elapsed_ms,
            "orchestration complete"
        );

        OrchestrationResponse {
            request_id,
            generated_at: Utc::now(),
            router,
            results: DomainResults {
                fatigue: run.fatigue,
                risk: run.risk,
                tactical: run.tactical,
            },
            recommendation,
            triggers,
            safety,
            errors: run.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_core::{LiveSignals, MatchState, RiskLevel, RosterPlayerContext};

    use crate::result::ResultStatus;

    #[tokio::test]
    async fn rules_only_request_is_complete() {
        let roster = vec![
            RosterPlayerContext::new("p1", "Boult", "left-arm fast bowler").with_live(LiveSignals {
                fatigue_index: Some(2.0),
                injury_risk: RiskLevel::Low,
                ..LiveSignals::default()
            }),
            RosterPlayerContext::new("p2", "Southee", "swing bowler"),
        ];
        let snapshot = OrchestrationSnapshot::new(MatchState::default(), roster, "p1", None);
        let orchestrator = Orchestrator::new(Arc::new(OrchestratorConfig::default()), CapabilitySet::rules());

        let response = orchestrator.advise(&snapshot, AnalysisMode::Auto).await;
        assert!(Uuid::parse_str(&response.request_id).is_ok());
        assert_eq!(response.results.fatigue.status, ResultStatus::Skipped);
        assert_eq!(response.results.tactical.status, ResultStatus::Ok);
        assert!(response.errors.is_empty());
        assert_eq!(response.safety.bowler_candidates[0].player_id, "p2");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["router"]["intent"], "BOWLING_NEXT");
        assert!(json["generatedAt"].is_string());
    }
}
