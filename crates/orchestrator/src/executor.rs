use std::time::Instant;

use tracing::{debug, info, warn};

use crease_agent::{AssessmentRequest, Capability, CapabilitySet, TacticalRequest};
use crease_core::{Domain, OrchestrationSnapshot, RouterDecision, SafetyRanking};

use crate::result::{CapabilityResult, DomainError, DomainRun};

/// Runs the selected capability domains as a two-level graph: fatigue and
/// risk concurrently, then tactical once both have settled.
pub struct DomainExecutor {
    capabilities: CapabilitySet,
    substitute_fallbacks: bool,
}

/// What one invocation produced: the reported result, the output handed
/// downstream, and the failure if there was one.
struct Invocation<T> {
    result: CapabilityResult<T>,
    context: Option<T>,
    error: Option<DomainError>,
}

impl<T> Invocation<T> {
    fn skipped() -> Self {
        Self {
            result: CapabilityResult::skipped(),
            context: None,
            error: None,
        }
    }
}

impl DomainExecutor {
    pub fn new(capabilities: CapabilitySet, substitute_fallbacks: bool) -> Self {
        Self {
            capabilities,
            substitute_fallbacks,
        }
    }

    pub async fn run(
        &self,
        decision: &RouterDecision,
        snapshot: &OrchestrationSnapshot,
        ranking: &SafetyRanking,
    ) -> DomainRun {
        let start = Instant::now();
        let assessment = AssessmentRequest::from_snapshot(snapshot);

        let (fatigue, risk) = futures::join!(
            self.invoke(
                decision.runs(Domain::Fatigue),
                self.capabilities.fatigue.as_ref(),
                &assessment,
            ),
            self.invoke(
                decision.runs(Domain::Risk),
                self.capabilities.risk.as_ref(),
                &assessment,
            ),
        );

        let tactical_request = TacticalRequest {
            match_state: assessment.match_state.clone(),
            player: assessment.player.clone(),
            mode: assessment.mode,
            intent: decision.intent,
            fatigue: fatigue.context,
            risk: risk.context,
            bowler_candidates: ranking.bowler_candidates.clone(),
            batter_candidates: ranking.batter_candidates.clone(),
        };
        let tactical = self
            .invoke(
                decision.runs(Domain::Tactical),
                self.capabilities.tactical.as_ref(),
                &tactical_request,
            )
            .await;

        let errors: Vec<DomainError> = [fatigue.error, risk.error, tactical.error]
            .into_iter()
            .flatten()
            .collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            agents = ?decision.agents_to_run,
            errors = errors.len(),
            elapsed_ms,
            "capability domains settled"
        );

        DomainRun {
            fatigue: fatigue.result,
            risk: risk.result,
            tactical: tactical.result,
            errors,
        }
    }

    /// Invoke one domain in isolation. A failing runner is replaced by its
    /// fallback builder; the error never escapes this call.
    async fn invoke<C>(
        &self,
        selected: bool,
        capability: &C,
        request: &C::Request,
    ) -> Invocation<C::Output>
    where
        C: Capability + ?Sized,
        C::Output: Clone,
    {
        let domain = capability.domain();
        if !selected {
            debug!(%domain, "domain not selected");
            return Invocation::skipped();
        }

        let start = Instant::now();
        match capability.run(request).await {
            Ok(run) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                debug!(%domain, model = %run.model, elapsed_ms, "domain completed");
                let context = Some(run.output.clone());
                Invocation {
                    result: CapabilityResult::completed(run),
                    context,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%domain, error = %message, "capability failed, using fallback");
                let fallback = capability.fallback(request, &message);
                let context = Some(fallback.output.clone());
                let result = if self.substitute_fallbacks {
                    CapabilityResult::recovered(fallback, message.clone())
                } else {
                    CapabilityResult::failed(message.clone())
                };
                Invocation {
                    result,
                    context,
                    error: Some(DomainError { domain, message }),
                }
            }
        }
    }
}
