use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Barrier;

use crease_agent::rules::{RuleFatigueRunner, RuleRiskRunner, RuleTacticalRunner};
use crease_agent::{
    Capability, CapabilityError, CapabilitySet, Confidence, RunnerOutput, TacticalOutput,
    TacticalRequest,
};
use crease_core::config::OrchestratorConfig;
use crease_core::{
    Domain, Intent, LiveSignals, MatchFormat, MatchPhase, MatchState, Mode, OrchestrationSnapshot,
    RiskLevel, RosterPlayerContext,
};
use crease_orchestrator::{AnalysisMode, Authority, Orchestrator, ResultStatus};

type EventLog = Arc<Mutex<Vec<String>>>;

/// Wraps a runner to record start/end events and the requests it saw, and
/// optionally to wait on a barrier or fail.
struct Probe<R> {
    inner: R,
    log: EventLog,
    seen: Arc<Mutex<Vec<serde_json::Value>>>,
    barrier: Option<Arc<Barrier>>,
    fail: bool,
}

impl<R> Probe<R> {
    fn new(inner: R, log: &EventLog) -> Self {
        Self {
            inner,
            log: log.clone(),
            seen: Arc::new(Mutex::new(Vec::new())),
            barrier: None,
            fail: false,
        }
    }

    fn with_barrier(mut self, barrier: &Arc<Barrier>) -> Self {
        self.barrier = Some(barrier.clone());
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl<R> Capability for Probe<R>
where
    R: Capability,
    R::Request: Serialize,
{
    type Request = R::Request;
    type Output = R::Output;

    fn domain(&self) -> Domain {
        self.inner.domain()
    }

    async fn run(
        &self,
        request: &Self::Request,
    ) -> Result<RunnerOutput<Self::Output>, CapabilityError> {
        let domain = self.inner.domain();
        self.log.lock().unwrap().push(format!("start:{domain}"));
        self.seen
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        tokio::task::yield_now().await;
        let out = if self.fail {
            Err(CapabilityError::Unavailable(format!("{domain} service offline")))
        } else {
            self.inner.run(request).await
        };
        self.log.lock().unwrap().push(format!("end:{domain}"));
        out
    }

    fn fallback(&self, request: &Self::Request, reason: &str) -> RunnerOutput<Self::Output> {
        self.inner.fallback(request, reason)
    }
}

/// Tactical runner that always proposes the same plan.
struct FixedTactical(TacticalOutput);

#[async_trait]
impl Capability for FixedTactical {
    type Request = TacticalRequest;
    type Output = TacticalOutput;

    fn domain(&self) -> Domain {
        Domain::Tactical
    }

    async fn run(
        &self,
        _request: &TacticalRequest,
    ) -> Result<RunnerOutput<TacticalOutput>, CapabilityError> {
        Ok(RunnerOutput {
            output: self.0.clone(),
            model: "fixed".to_string(),
            fallbacks_used: Vec::new(),
        })
    }

    fn fallback(&self, _request: &TacticalRequest, reason: &str) -> RunnerOutput<TacticalOutput> {
        RunnerOutput {
            output: self.0.clone(),
            model: "fixed".to_string(),
            fallbacks_used: vec![reason.to_string()],
        }
    }
}

fn orchestrator(capabilities: CapabilitySet) -> Orchestrator {
    Orchestrator::new(Arc::new(OrchestratorConfig::default()), capabilities)
}

fn player(id: &str, name: &str, role: &str, live: LiveSignals) -> RosterPlayerContext {
    RosterPlayerContext::new(id, name, role).with_live(live)
}

/// Tired, high-risk active bowler with two fresh alternatives.
fn alarming_bowling_snapshot() -> OrchestrationSnapshot {
    let roster = vec![
        player(
            "starc",
            "Mitchell Starc",
            "left-arm fast bowler",
            LiveSignals {
                fatigue_index: Some(8.0),
                injury_risk: RiskLevel::High,
                overs_bowled: Some(3.0),
                ..LiveSignals::default()
            },
        ),
        player(
            "hazlewood",
            "Josh Hazlewood",
            "fast bowler",
            LiveSignals {
                fatigue_index: Some(3.0),
                injury_risk: RiskLevel::Low,
                overs_bowled: Some(1.0),
                ..LiveSignals::default()
            },
        ),
        player(
            "zampa",
            "Adam Zampa",
            "leg-spin bowler",
            LiveSignals {
                fatigue_index: Some(4.0),
                injury_risk: RiskLevel::Low,
                ..LiveSignals::default()
            },
        ),
        player("head", "Travis Head", "opening batter", LiveSignals::default()),
    ];
    OrchestrationSnapshot::new(
        MatchState::new(MatchFormat::T20, MatchPhase::Death, Mode::Bowling),
        roster,
        "starc",
        None,
    )
}

#[tokio::test]
async fn fatigue_and_risk_run_concurrently() {
    // Both level-one runners wait for each other; sequential awaiting would
    // never get past the first barrier wait.
    let log = EventLog::default();
    let barrier = Arc::new(Barrier::new(2));
    let capabilities = CapabilitySet::new(
        Arc::new(Probe::new(RuleFatigueRunner, &log).with_barrier(&barrier)),
        Arc::new(Probe::new(RuleRiskRunner, &log).with_barrier(&barrier)),
        Arc::new(Probe::new(RuleTacticalRunner, &log)),
    );
    let orchestrator = orchestrator(capabilities);
    let snapshot = alarming_bowling_snapshot();

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.advise(&snapshot, AnalysisMode::Auto),
    )
    .await
    .expect("fatigue and risk did not overlap");

    assert_eq!(response.results.fatigue.status, ResultStatus::Ok);
    assert_eq!(response.results.risk.status, ResultStatus::Ok);
    assert_eq!(response.results.tactical.status, ResultStatus::Ok);
}

#[tokio::test]
async fn tactical_starts_after_both_assessments_settle() {
    let log = EventLog::default();
    let capabilities = CapabilitySet::new(
        Arc::new(Probe::new(RuleFatigueRunner, &log)),
        Arc::new(Probe::new(RuleRiskRunner, &log)),
        Arc::new(Probe::new(RuleTacticalRunner, &log)),
    );
    orchestrator(capabilities)
        .advise(&alarming_bowling_snapshot(), AnalysisMode::Auto)
        .await;

    let events = log.lock().unwrap().clone();
    let at = |event: &str| {
        events
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("missing {event} in {events:?}"))
    };
    assert!(at("start:tactical") > at("end:fatigue"));
    assert!(at("start:tactical") > at("end:risk"));
    assert_eq!(events.len(), 6);
}

#[tokio::test]
async fn risk_failure_is_isolated() {
    let log = EventLog::default();
    let tactical = Arc::new(Probe::new(RuleTacticalRunner, &log));
    let tactical_seen = tactical.seen.clone();
    let capabilities = CapabilitySet::new(
        Arc::new(Probe::new(RuleFatigueRunner, &log)),
        Arc::new(Probe::new(RuleRiskRunner, &log).failing()),
        tactical,
    );
    let response = orchestrator(capabilities)
        .advise(&alarming_bowling_snapshot(), AnalysisMode::Auto)
        .await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].domain, Domain::Risk);
    assert!(response.errors[0].message.contains("risk service offline"));

    assert_eq!(response.results.fatigue.status, ResultStatus::Ok);
    assert_eq!(response.results.risk.status, ResultStatus::Fallback);
    assert_eq!(response.results.tactical.status, ResultStatus::Ok);

    // tactical ran with a fallback-shaped risk context
    let seen = tactical_seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["risk"]["severity"], "CRITICAL");
    assert!(seen[0]["risk"]["recommendation"].is_string());
}

#[tokio::test]
async fn disabled_substitution_reports_error_but_still_recommends() {
    let log = EventLog::default();
    let capabilities = CapabilitySet::new(
        Arc::new(Probe::new(RuleFatigueRunner, &log)),
        Arc::new(Probe::new(RuleRiskRunner, &log).failing()),
        Arc::new(Probe::new(RuleTacticalRunner, &log)),
    );
    let config = OrchestratorConfig {
        substitute_fallbacks: false,
        ..OrchestratorConfig::default()
    };
    let response = Orchestrator::new(Arc::new(config), capabilities)
        .advise(&alarming_bowling_snapshot(), AnalysisMode::Auto)
        .await;

    assert_eq!(response.results.risk.status, ResultStatus::Error);
    assert!(response.results.risk.output.is_none());
    assert_eq!(response.results.tactical.status, ResultStatus::Ok);
    assert_eq!(response.recommendation.authority, Authority::Tactical);
    assert_eq!(response.errors.len(), 1);
}

#[tokio::test]
async fn critical_risk_overrides_tactical_plan() {
    let tactical = TacticalOutput {
        immediate_action: "Continue with Mitchell Starc for the next over.".to_string(),
        rationale: "Death overs need the best bowler.".to_string(),
        suggested_adjustments: vec!["Set boundary riders square".to_string()],
        next_bowler: None,
        next_batter: None,
        confidence: Confidence::High,
    };
    let rules = CapabilitySet::rules();
    let capabilities =
        CapabilitySet::new(rules.fatigue, rules.risk, Arc::new(FixedTactical(tactical)));
    let response = orchestrator(capabilities)
        .advise(&alarming_bowling_snapshot(), AnalysisMode::Auto)
        .await;

    assert_eq!(response.router.intent, Intent::SafetyAlert);
    let risk = response.results.risk.output.as_ref().unwrap();
    let decision = &response.recommendation.combined_decision;
    assert_eq!(decision.immediate_action, risk.recommendation);
    assert_eq!(decision.rationale, risk.rationale);
    assert!(decision
        .suggested_adjustments
        .contains(&"Set boundary riders square".to_string()));
    assert_eq!(response.recommendation.authority, Authority::RiskOverride);
    assert_eq!(
        response.recommendation.next_safe_bowler.as_ref().unwrap().player_id,
        "hazlewood"
    );
}

#[tokio::test]
async fn batting_mode_never_mentions_bowler_swaps() {
    let roster = vec![
        player(
            "gill",
            "Shubman Gill",
            "opening batter",
            LiveSignals {
                fatigue_index: Some(6.5),
                ..LiveSignals::default()
            },
        ),
        player("siraj", "Mohammed Siraj", "seam bowler", LiveSignals::default()),
        player("kuldeep", "Kuldeep Yadav", "wrist spinner", LiveSignals::default()),
    ];
    let snapshot = OrchestrationSnapshot::new(
        MatchState::new(MatchFormat::Odi, MatchPhase::Middle, Mode::Batting),
        roster,
        "gill",
        None,
    );
    let tactical = TacticalOutput {
        immediate_action: "Bring on Mohammed Siraj for the next over.".to_string(),
        rationale: "Gill is tiring; change the bowler at the other end.".to_string(),
        suggested_adjustments: vec![
            "Rotate the strike".to_string(),
            "Next bowler: Kuldeep Yadav".to_string(),
        ],
        next_bowler: Some("Mohammed Siraj".to_string()),
        next_batter: Some("Mohammed Siraj".to_string()),
        confidence: Confidence::Medium,
    };
    let rules = CapabilitySet::rules();
    let capabilities =
        CapabilitySet::new(rules.fatigue, rules.risk, Arc::new(FixedTactical(tactical)));
    let response = orchestrator(capabilities)
        .advise(&snapshot, AnalysisMode::Auto)
        .await;

    let text = serde_json::to_string(&response.recommendation)
        .unwrap()
        .to_lowercase();
    for phrase in ["bring on", "next bowler", "change the bowler"] {
        assert!(!text.contains(phrase), "recommendation still mentions {phrase}: {text}");
    }
    assert!(response.recommendation.next_safe_bowler.is_none());
    let batter = response.recommendation.next_safe_batter.as_ref().unwrap();
    assert_eq!(batter.player_id, "NONE");
    assert_eq!(batter.name, "No eligible batter available in roster");
    assert_eq!(
        response.recommendation.combined_decision.suggested_adjustments,
        vec!["Rotate the strike".to_string()]
    );
}

#[tokio::test]
async fn active_player_never_offered_as_replacement() {
    let response = orchestrator(CapabilitySet::rules())
        .advise(&alarming_bowling_snapshot(), AnalysisMode::Full)
        .await;
    let safety = &response.safety;
    for candidate in safety
        .bowler_candidates
        .iter()
        .chain(&safety.batter_candidates)
        .chain(&safety.bench_options)
    {
        assert_ne!(candidate.player_id, "starc");
    }
    assert_ne!(
        response.recommendation.next_safe_bowler.as_ref().unwrap().player_id,
        "starc"
    );
}

#[tokio::test]
async fn quota_complete_bowler_needs_substitute() {
    let roster = vec![
        player(
            "rashid",
            "Rashid Khan",
            "leg-spin bowler",
            LiveSignals {
                fatigue_index: Some(3.0),
                injury_risk: RiskLevel::Low,
                overs_bowled: Some(4.0),
                ..LiveSignals::default()
            },
        ),
        player("noor", "Noor Ahmad", "spin bowler", LiveSignals::default()),
    ];
    let snapshot = OrchestrationSnapshot::new(MatchState::default(), roster, "rashid", None);
    let response = orchestrator(CapabilitySet::rules())
        .advise(&snapshot, AnalysisMode::Auto)
        .await;

    assert_eq!(response.router.intent, Intent::Substitution);
    assert_eq!(response.router.agents_to_run, vec![Domain::Tactical]);
    assert!(response.router.reason.contains("quota"));
    assert_eq!(response.results.fatigue.status, ResultStatus::Skipped);
    assert_eq!(response.results.risk.status, ResultStatus::Skipped);
    assert!(response.errors.is_empty());
    assert_eq!(
        response.recommendation.next_safe_bowler.as_ref().unwrap().player_id,
        "noor"
    );
    assert!(response.recommendation.statement.contains("Noor Ahmad"));
}

#[tokio::test]
async fn degenerate_snapshot_still_recommends() {
    let snapshot = OrchestrationSnapshot::new(MatchState::default(), vec![], "ghost", None);
    let response = orchestrator(CapabilitySet::rules())
        .advise(&snapshot, AnalysisMode::Auto)
        .await;

    assert_eq!(response.router.agents_to_run, vec![Domain::Tactical]);
    assert_eq!(response.router.rules_fired[0], "degenerate_snapshot");
    assert_eq!(response.results.tactical.status, ResultStatus::Ok);
    assert!(response
        .recommendation
        .next_safe_bowler
        .as_ref()
        .unwrap()
        .is_none());
    assert!(!response.recommendation.statement.is_empty());
}

#[tokio::test]
async fn fixture_snapshot_end_to_end() {
    let snapshot =
        OrchestrationSnapshot::from_json(include_str!("fixtures/death_overs.json")).unwrap();
    let response = orchestrator(CapabilitySet::rules())
        .advise(&snapshot, AnalysisMode::Auto)
        .await;

    assert_eq!(response.router.intent, Intent::SafetyAlert);
    assert_eq!(response.router.agents_to_run, Domain::ALL.to_vec());
    // jadeja has bowled the T20 quota
    let bowlers: Vec<_> = response
        .safety
        .bowler_candidates
        .iter()
        .map(|c| c.player_id.as_str())
        .collect();
    assert_eq!(bowlers, vec!["siraj"]);
    assert_eq!(response.recommendation.authority, Authority::Tactical);
    assert_eq!(
        response.recommendation.next_safe_bowler.as_ref().unwrap().player_id,
        "siraj"
    );
    assert!(response.recommendation.statement.contains("Mohammed Siraj"));
    for score in [
        response.triggers.fatigue,
        response.triggers.risk,
        response.triggers.tactical,
    ] {
        assert!((0.0..=100.0).contains(&score));
    }
}

#[test]
fn synchronous_components_are_deterministic() {
    let orchestrator = orchestrator(CapabilitySet::rules());
    let snapshot = alarming_bowling_snapshot();
    for mode in [AnalysisMode::Auto, AnalysisMode::Full] {
        assert_eq!(
            orchestrator.route(&snapshot, mode),
            orchestrator.route(&snapshot, mode)
        );
    }
    assert_eq!(orchestrator.rank(&snapshot), orchestrator.rank(&snapshot));
    assert_eq!(orchestrator.triggers(&snapshot), orchestrator.triggers(&snapshot));
}
