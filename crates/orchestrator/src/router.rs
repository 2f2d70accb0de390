//! Rule-based routing: snapshot in, intent and capability domains out.

use serde::{Deserialize, Serialize};

use crease_core::tuning::RouterThresholds;
use crease_core::{
    Domain, Intent, Mode, OrchestrationSnapshot, RosterPlayerContext, RouterDecision, RouterInputs,
};

/// How much of the graph the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Let the rules pick the domains.
    #[default]
    Auto,
    /// Run every domain and plan both roles.
    Full,
}

// ── Rule names recorded in `rules_fired` ─────────────────────

pub const RULE_FULL_ANALYSIS: &str = "full_analysis_requested";
pub const RULE_DEGENERATE: &str = "degenerate_snapshot";
pub const RULE_FATIGUE_INDEX: &str = "fatigue_index_threshold";
pub const RULE_PROJECTED_FATIGUE: &str = "projected_fatigue_limit";
pub const RULE_STRAIN: &str = "strain_threshold";
pub const RULE_INJURY_RISK: &str = "injury_risk_elevated";
pub const RULE_NO_BALL_RISK: &str = "no_ball_risk_elevated";
pub const RULE_QUOTA_COMPLETE: &str = "quota_complete";
pub const RULE_BATTING_MODE: &str = "batting_mode";
pub const RULE_SAFETY_ALERT: &str = "safety_alert";
pub const RULE_QUOTA_SUBSTITUTION: &str = "quota_substitution";
pub const RULE_FATIGUE_GENERAL: &str = "fatigue_general";
pub const RULE_BOWLING_DEFAULT: &str = "bowling_next_default";
pub const RULE_TACTICAL_ALWAYS: &str = "tactical_always";

/// Classify the snapshot. Total: every input yields a decision, and every
/// decision includes `Domain::Tactical`.
pub fn decide(
    mode: AnalysisMode,
    snapshot: &OrchestrationSnapshot,
    thresholds: &RouterThresholds,
) -> RouterDecision {
    let mut rules = Vec::new();

    let Some(player) = snapshot.active_player() else {
        let inputs = RouterInputs {
            mode: Some(snapshot.mode()),
            quota: snapshot.quota(),
            ..RouterInputs::default()
        };
        if mode == AnalysisMode::Full {
            rules.push(RULE_FULL_ANALYSIS.to_string());
            return RouterDecision {
                intent: Intent::BothNext,
                agents_to_run: Domain::ALL.to_vec(),
                rules_fired: rules,
                inputs_used: inputs,
                reason: "Full analysis requested for both roles.".to_string(),
            };
        }
        rules.push(RULE_DEGENERATE.to_string());
        rules.push(RULE_TACTICAL_ALWAYS.to_string());
        return RouterDecision {
            intent: Intent::General,
            agents_to_run: vec![Domain::Tactical],
            rules_fired: rules,
            inputs_used: inputs,
            reason: format!(
                "Active player {} is not in the roster; running the tactical domain only.",
                snapshot.active_player_id()
            ),
        };
    };

    let inputs = collect_inputs(snapshot, player, thresholds);

    if mode == AnalysisMode::Full {
        rules.push(RULE_FULL_ANALYSIS.to_string());
        return RouterDecision {
            intent: Intent::BothNext,
            agents_to_run: Domain::ALL.to_vec(),
            rules_fired: rules,
            inputs_used: inputs,
            reason: format!("Full analysis requested for {} in both roles.", player.name),
        };
    }

    let fatigue_triggered = fatigue_triggered(&inputs, thresholds, &mut rules);
    let risk_triggered = risk_triggered(&inputs, &mut rules);
    if inputs.quota_complete {
        rules.push(RULE_QUOTA_COMPLETE.to_string());
    }

    let name = &player.name;
    let (intent, reason) = if snapshot.mode() == Mode::Batting {
        rules.push(RULE_BATTING_MODE.to_string());
        (
            Intent::BattingNext,
            format!("{name} is batting: plan the innings and the next safe batter."),
        )
    } else if risk_triggered {
        rules.push(RULE_SAFETY_ALERT.to_string());
        (
            Intent::SafetyAlert,
            format!(
                "Elevated risk for {name} (injury {}, no-ball {}).",
                inputs.injury_risk, inputs.no_ball_risk
            ),
        )
    } else if inputs.quota_complete {
        rules.push(RULE_QUOTA_SUBSTITUTION.to_string());
        let quota = inputs.quota.unwrap_or_default();
        (
            Intent::Substitution,
            format!("{name} has completed the {quota}-over bowling quota; a replacement bowler is needed."),
        )
    } else if fatigue_triggered {
        rules.push(RULE_FATIGUE_GENERAL.to_string());
        (
            Intent::General,
            format!("Fatigue threshold reached for {name}; review the workload."),
        )
    } else {
        rules.push(RULE_BOWLING_DEFAULT.to_string());
        (
            Intent::BowlingNext,
            format!("No fatigue or risk trigger for {name}; plan the next over."),
        )
    };

    let mut agents = Vec::with_capacity(3);
    if fatigue_triggered {
        agents.push(Domain::Fatigue);
    }
    if risk_triggered {
        agents.push(Domain::Risk);
    }
    agents.push(Domain::Tactical);
    rules.push(RULE_TACTICAL_ALWAYS.to_string());

    RouterDecision {
        intent,
        agents_to_run: agents,
        rules_fired: rules,
        inputs_used: inputs,
        reason,
    }
}

fn collect_inputs(
    snapshot: &OrchestrationSnapshot,
    player: &RosterPlayerContext,
    thresholds: &RouterThresholds,
) -> RouterInputs {
    let live = &player.live;
    let intensity = snapshot.match_state().intensity;
    let mode = snapshot.mode();
    RouterInputs {
        mode: Some(mode),
        fatigue_index: live.fatigue_index,
        projected_fatigue: live
            .fatigue_index
            .map(|f| f + thresholds.fatigue_gain_per_over * intensity.load_multiplier()),
        fatigue_limit: player.baseline.fatigue_limit,
        strain_index: live.strain_index,
        injury_risk: live.injury_risk,
        no_ball_risk: live.no_ball_risk,
        overs_bowled: live.overs_bowled,
        quota: snapshot.quota(),
        quota_complete: mode == Mode::Bowling && snapshot.quota_complete(player),
    }
}

fn fatigue_triggered(
    inputs: &RouterInputs,
    thresholds: &RouterThresholds,
    rules: &mut Vec<String>,
) -> bool {
    let mut triggered = false;
    if inputs
        .fatigue_index
        .is_some_and(|f| f >= thresholds.fatigue_trigger)
    {
        rules.push(RULE_FATIGUE_INDEX.to_string());
        triggered = true;
    }
    if let (Some(projected), Some(limit)) = (inputs.projected_fatigue, inputs.fatigue_limit) {
        if projected >= limit {
            rules.push(RULE_PROJECTED_FATIGUE.to_string());
            triggered = true;
        }
    }
    if inputs
        .strain_index
        .is_some_and(|s| s >= thresholds.strain_trigger)
    {
        rules.push(RULE_STRAIN.to_string());
        triggered = true;
    }
    triggered
}

fn risk_triggered(inputs: &RouterInputs, rules: &mut Vec<String>) -> bool {
    let mut triggered = false;
    if inputs.injury_risk.is_elevated() {
        rules.push(RULE_INJURY_RISK.to_string());
        triggered = true;
    }
    if inputs.no_ball_risk.is_elevated() {
        rules.push(RULE_NO_BALL_RISK.to_string());
        triggered = true;
    }
    triggered
}
