//! Deterministic rule-based capability runners.
//!
//! These are complete runners in their own right (provider `rules`) and also
//! the fallback builders behind every chat-completion runner: a failed model
//! call degrades to the same assessment computed here.

use async_trait::async_trait;

use crease_core::tuning::{DEFAULT_FATIGUE, FATIGUE_GAIN_PER_OVER, SLEEP_TARGET_HOURS, STRAIN_TRIGGER};
use crease_core::{Domain, Intent, MatchPhase, MatchState, Mode, RiskLevel};

use crate::capability::{Capability, CapabilityError};
use crate::types::{
    AssessmentRequest, Confidence, FatigueOutput, RiskOutput, RunnerOutput, Severity,
    TacticalOutput, TacticalRequest,
};

/// Model name reported by rule runners.
pub const RULES_MODEL: &str = "rules";

const SEVERE_FATIGUE: f64 = 8.5;
const HIGH_FATIGUE: f64 = 7.0;
const MODERATE_FATIGUE: f64 = 5.0;
const LOW_SLEEP_HOURS: f64 = 6.0;
const LOW_RECOVERY: f64 = 40.0;
const CHASE_PRESSURE_GAP: f64 = 2.0;

fn rule_output<T>(output: T, reason: Option<&str>) -> RunnerOutput<T> {
    RunnerOutput {
        output,
        model: RULES_MODEL.to_string(),
        fallbacks_used: reason.map(|r| vec![r.to_string()]).unwrap_or_default(),
    }
}

// ── Fatigue ──────────────────────────────────────────────────

pub fn assess_fatigue(request: &AssessmentRequest) -> FatigueOutput {
    let player = &request.player;
    let live = &player.live;
    let mut signals = Vec::new();

    let fatigue = match live.fatigue_index {
        Some(f) => {
            signals.push(format!("fatigue index {f:.1}/10"));
            f.clamp(0.0, 10.0)
        }
        None => {
            signals.push(format!("fatigue index unknown, assuming {DEFAULT_FATIGUE:.0}"));
            DEFAULT_FATIGUE
        }
    };

    let gain = match request.mode {
        Mode::Bowling => FATIGUE_GAIN_PER_OVER,
        Mode::Batting => FATIGUE_GAIN_PER_OVER / 2.0,
    } * request.match_state.intensity.load_multiplier();
    let projected = (fatigue + gain).min(10.0);

    let mut severity = if fatigue >= SEVERE_FATIGUE {
        Severity::Critical
    } else if fatigue >= HIGH_FATIGUE {
        Severity::High
    } else if fatigue >= MODERATE_FATIGUE {
        Severity::Medium
    } else {
        Severity::Low
    };

    if let Some(limit) = player.baseline.fatigue_limit {
        if projected >= limit {
            signals.push(format!("projected {projected:.1} next over reaches limit {limit:.1}"));
            severity = severity.max(Severity::High);
        }
    }
    if let Some(strain) = live.strain_index {
        if strain >= STRAIN_TRIGGER {
            signals.push(format!("strain index {strain:.1}"));
            severity = severity.max(Severity::Medium);
        }
    }
    if let Some(sleep) = player.baseline.sleep_hours {
        if sleep < LOW_SLEEP_HOURS {
            signals.push(format!("slept {sleep:.1}h against a {SLEEP_TARGET_HOURS:.0}h target"));
            severity = severity.max(Severity::Medium);
        }
    }
    if let Some(recovery) = player.baseline.recovery_score {
        if recovery < LOW_RECOVERY {
            signals.push(format!("recovery score {recovery:.0}"));
            severity = severity.max(Severity::Medium);
        }
    }
    if request.mode == Mode::Bowling {
        if let (Some(quota), Some(bowled)) = (request.quota, live.overs_bowled) {
            signals.push(format!("{bowled:.0} of {quota} overs bowled"));
        }
    }

    FatigueOutput {
        fatigue_index: fatigue,
        projected_fatigue: projected,
        severity,
        headline: format!("{}: {} fatigue load", player.name, severity.label()),
        recommendation: fatigue_recommendation(&player.name, severity, request.mode),
        signals,
    }
}

fn fatigue_recommendation(name: &str, severity: Severity, mode: Mode) -> String {
    match (mode, severity) {
        (Mode::Bowling, Severity::Critical) => {
            format!("Take {name} out of the attack now and start the recovery protocol.")
        }
        (Mode::Bowling, Severity::High) => {
            format!("Give {name} one more over at most, then rotate.")
        }
        (Mode::Bowling, Severity::Medium) => {
            format!("Monitor {name} between overs and shorten the spell if the run-up slows.")
        }
        (Mode::Bowling, Severity::Low) => format!("{name} can continue the current spell."),
        (Mode::Batting, Severity::Critical) => {
            format!("{name} is close to exhaustion: take a drinks break and cut out hard running.")
        }
        (Mode::Batting, Severity::High) => {
            format!("{name} should favour boundaries over twos and hydrate at every break.")
        }
        (Mode::Batting, Severity::Medium) => {
            format!("Keep {name}'s running efficient and monitor recovery between overs.")
        }
        (Mode::Batting, Severity::Low) => format!("{name} is fresh enough to keep batting freely."),
    }
}

pub struct RuleFatigueRunner;

#[async_trait]
impl Capability for RuleFatigueRunner {
    type Request = AssessmentRequest;
    type Output = FatigueOutput;

    fn domain(&self) -> Domain {
        Domain::Fatigue
    }

    async fn run(
        &self,
        request: &AssessmentRequest,
    ) -> Result<RunnerOutput<FatigueOutput>, CapabilityError> {
        Ok(rule_output(assess_fatigue(request), None))
    }

    fn fallback(&self, request: &AssessmentRequest, reason: &str) -> RunnerOutput<FatigueOutput> {
        rule_output(assess_fatigue(request), Some(reason))
    }
}

// ── Risk ─────────────────────────────────────────────────────

pub fn assess_risk(request: &AssessmentRequest) -> RiskOutput {
    let player = &request.player;
    let live = &player.live;
    let name = &player.name;
    let bowling = request.mode == Mode::Bowling;
    let injury = live.injury_risk;
    let no_ball = if bowling { live.no_ball_risk } else { RiskLevel::Unknown };

    let mut signals = vec![format!("injury risk {injury}")];
    if bowling {
        signals.push(format!("no-ball risk {no_ball}"));
    }

    let loaded_fatigue = live.fatigue_index.filter(|f| *f >= HIGH_FATIGUE);
    let strained = live.strain_index.is_some_and(|s| s >= STRAIN_TRIGGER);
    let loaded = loaded_fatigue.is_some() || strained;

    let mut severity = match injury {
        RiskLevel::High if loaded => Severity::Critical,
        RiskLevel::High => Severity::High,
        RiskLevel::Medium => Severity::Medium,
        RiskLevel::Low | RiskLevel::Unknown => Severity::Low,
    };
    severity = match no_ball {
        RiskLevel::High => severity.max(Severity::High),
        RiskLevel::Medium => severity.max(Severity::Medium),
        _ => severity,
    };
    if injury == RiskLevel::Unknown && no_ball == RiskLevel::Unknown {
        signals.push("no injury telemetry available".to_string());
    }

    let mut rationale = format!("Injury risk is {injury}");
    if let Some(f) = loaded_fatigue {
        rationale.push_str(&format!(" with fatigue at {f:.1}"));
    }
    if strained {
        rationale.push_str(" and elevated strain");
    }
    if no_ball.is_elevated() {
        rationale.push_str(&format!("; no-ball risk is {no_ball}"));
    }
    rationale.push('.');

    let mut mitigations = Vec::new();
    if injury.is_elevated() {
        mitigations.push("Physio check at the next break".to_string());
    }
    if loaded {
        mitigations.push(if bowling {
            "Shorten the run-up and bowl within 90% effort".to_string()
        } else {
            "Walk singles where possible and avoid diving".to_string()
        });
    }
    if no_ball.is_elevated() {
        mitigations.push("Re-mark the run-up and focus on the front-foot landing".to_string());
    }

    RiskOutput {
        severity,
        injury_risk: injury,
        no_ball_risk: no_ball,
        headline: format!("{name}: {} injury risk", severity.label()),
        recommendation: risk_recommendation(name, severity, request.mode),
        rationale,
        mitigations,
        signals,
    }
}

fn risk_recommendation(name: &str, severity: Severity, mode: Mode) -> String {
    match (mode, severity) {
        (Mode::Bowling, Severity::Critical) => format!(
            "Stop {name} bowling now and have the physio assess before any further overs."
        ),
        (Mode::Bowling, Severity::High) => {
            format!("Withdraw {name} from the attack after this over for a physio assessment.")
        }
        (Mode::Batting, Severity::Critical) => {
            format!("Have the physio assess {name} immediately; retire hurt if pain persists.")
        }
        (Mode::Batting, Severity::High) => {
            format!("Have the physio check {name} at the next break and limit hard running.")
        }
        (_, Severity::Medium) => format!("Keep a close watch on {name} and reassess after the over."),
        (_, Severity::Low) => format!("No injury action needed for {name} right now."),
    }
}

pub struct RuleRiskRunner;

#[async_trait]
impl Capability for RuleRiskRunner {
    type Request = AssessmentRequest;
    type Output = RiskOutput;

    fn domain(&self) -> Domain {
        Domain::Risk
    }

    async fn run(
        &self,
        request: &AssessmentRequest,
    ) -> Result<RunnerOutput<RiskOutput>, CapabilityError> {
        Ok(rule_output(assess_risk(request), None))
    }

    fn fallback(&self, request: &AssessmentRequest, reason: &str) -> RunnerOutput<RiskOutput> {
        rule_output(assess_risk(request), Some(reason))
    }
}

// ── Tactical ─────────────────────────────────────────────────

pub fn plan_tactics(request: &TacticalRequest) -> TacticalOutput {
    let name = &request.player.name;
    let fatigue_severe = request
        .fatigue
        .as_ref()
        .is_some_and(|f| f.severity.is_severe());
    let risk_severe = request.risk.as_ref().is_some_and(|r| r.severity.is_severe());
    let quota_done = request.intent == Intent::Substitution;
    let must_change = fatigue_severe || risk_severe || quota_done;
    let both = request.intent == Intent::BothNext;

    let mut adjustments = phase_adjustments(&request.match_state, request.mode);
    let mut next_bowler = None;
    let mut next_batter = None;

    let (immediate_action, replacement_found) = match request.mode {
        Mode::Bowling => {
            if both {
                if let Some(b) = request.batter_candidates.first() {
                    next_batter = Some(b.name.clone());
                    adjustments.push(format!("Next batter in: {}", b.name));
                }
            }
            match (must_change, request.bowler_candidates.first()) {
                (true, Some(c)) => {
                    next_bowler = Some(c.name.clone());
                    (
                        format!("Bring on {} for the next over and rest {name}.", c.name),
                        true,
                    )
                }
                (true, None) => (
                    format!(
                        "No fresh bowler is available: keep {name} on a reduced-effort plan and protect the boundary."
                    ),
                    false,
                ),
                (false, _) => (format!("Continue with {name} for the next over."), true),
            }
        }
        Mode::Batting => {
            if both {
                if let Some(b) = request.bowler_candidates.first() {
                    next_bowler = Some(b.name.clone());
                    adjustments.push(format!("Next bowler when fielding: {}", b.name));
                }
            }
            match (must_change, request.batter_candidates.first()) {
                (true, Some(c)) => {
                    next_batter = Some(c.name.clone());
                    (
                        format!(
                            "Have {} padded up as the next batter; {name} should target boundaries over hard running.",
                            c.name
                        ),
                        true,
                    )
                }
                (true, None) => (
                    format!("{name} should manage effort between deliveries and bat through."),
                    false,
                ),
                (false, _) => (format!("Keep {name} batting and rotate the strike."), true),
            }
        }
    };

    let mut reasons = Vec::new();
    if let Some(f) = &request.fatigue {
        reasons.push(f.headline.clone());
    }
    if let Some(r) = &request.risk {
        reasons.push(r.headline.clone());
    }
    if quota_done {
        reasons.push(format!("{name} has completed the bowling quota"));
    }
    reasons.push(format!(
        "{} phase with {} wickets in hand",
        phase_label(request.match_state.phase),
        request.match_state.wickets_in_hand()
    ));

    let live = &request.player.live;
    let telemetry_known = live.fatigue_index.is_some() && live.injury_risk != RiskLevel::Unknown;
    let confidence = if !replacement_found {
        Confidence::Low
    } else if telemetry_known && (request.fatigue.is_some() || request.risk.is_some()) {
        Confidence::High
    } else if telemetry_known {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    TacticalOutput {
        immediate_action,
        rationale: format!("{}.", reasons.join("; ")),
        suggested_adjustments: adjustments,
        next_bowler,
        next_batter,
        confidence,
    }
}

fn phase_label(phase: MatchPhase) -> &'static str {
    match phase {
        MatchPhase::Powerplay => "Powerplay",
        MatchPhase::Middle => "Middle-overs",
        MatchPhase::Death => "Death-overs",
    }
}

fn phase_adjustments(state: &MatchState, mode: Mode) -> Vec<String> {
    match mode {
        Mode::Bowling => vec![match state.phase {
            MatchPhase::Powerplay => "Keep two slips in while the ball is new".to_string(),
            MatchPhase::Middle => "Squeeze with a ring field and target dot balls".to_string(),
            MatchPhase::Death => {
                "Set boundary riders square and mix yorkers with slower balls".to_string()
            }
        }],
        Mode::Batting => {
            let mut out = Vec::new();
            if state.run_rate_gap().is_some_and(|gap| gap > CHASE_PRESSURE_GAP) {
                out.push("Target the shorter boundary to lift the run rate".to_string());
            }
            if state.wickets_in_hand() <= 3 {
                out.push("Protect the remaining wickets and farm the strike".to_string());
            }
            if out.is_empty() {
                out.push("Rotate the strike to keep the scoreboard moving".to_string());
            }
            out
        }
    }
}

pub struct RuleTacticalRunner;

#[async_trait]
impl Capability for RuleTacticalRunner {
    type Request = TacticalRequest;
    type Output = TacticalOutput;

    fn domain(&self) -> Domain {
        Domain::Tactical
    }

    async fn run(
        &self,
        request: &TacticalRequest,
    ) -> Result<RunnerOutput<TacticalOutput>, CapabilityError> {
        Ok(rule_output(plan_tactics(request), None))
    }

    fn fallback(&self, request: &TacticalRequest, reason: &str) -> RunnerOutput<TacticalOutput> {
        rule_output(plan_tactics(request), Some(reason))
    }
}
