//! Diagnostic 0-100 urgency scores per domain.
//!
//! Scores are reported alongside the routing decision but never drive it.

use serde::{Deserialize, Serialize};

use crease_core::tuning::{TriggerWeights, DEFAULT_FATIGUE, DEFAULT_RECOVERY};
use crease_core::{MatchPhase, Mode, OrchestrationSnapshot, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerScores {
    pub fatigue: f64,
    pub risk: f64,
    pub tactical: f64,
}

/// Points for a risk band before weighting.
fn band_points(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 15.0,
        RiskLevel::Medium => 55.0,
        RiskLevel::High => 90.0,
        RiskLevel::Unknown => 30.0,
    }
}

fn finish(score: f64) -> f64 {
    (score.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

pub fn compute_triggers(snapshot: &OrchestrationSnapshot, weights: &TriggerWeights) -> TriggerScores {
    let state = snapshot.match_state();
    let player = snapshot.active_player();
    let live = player.map(|p| &p.live);
    let baseline = player.map(|p| &p.baseline);

    let fatigue_index = live
        .and_then(|l| l.fatigue_index)
        .unwrap_or(DEFAULT_FATIGUE);
    let recovery = baseline
        .and_then(|b| b.recovery_score)
        .unwrap_or(DEFAULT_RECOVERY);
    let strain = live.and_then(|l| l.strain_index).unwrap_or(0.0);
    let workload_ratio = match (live.and_then(|l| l.overs_bowled), snapshot.quota()) {
        (Some(overs), Some(quota)) if quota > 0 => (overs / f64::from(quota)).min(1.0),
        _ => 0.0,
    };

    let fatigue = weights.fatigue_share * fatigue_index * 10.0
        + weights.workload_share * workload_ratio * 100.0
        + weights.recovery_share * (100.0 - recovery)
        + weights.strain_points * strain;

    let injury = live.map(|l| l.injury_risk).unwrap_or_default();
    let no_ball = match snapshot.mode() {
        Mode::Bowling => band_points(live.map(|l| l.no_ball_risk).unwrap_or_default()),
        Mode::Batting => 0.0,
    };
    let risk = weights.injury_share * band_points(injury)
        + weights.no_ball_share * no_ball
        + weights.risk_fatigue_share * fatigue_index * 10.0;

    let phase = match state.phase {
        MatchPhase::Powerplay => weights.powerplay_points,
        MatchPhase::Middle => weights.middle_points,
        MatchPhase::Death => weights.death_points,
    };
    let chase = state.run_rate_gap().unwrap_or(0.0).max(0.0) * weights.run_rate_gap_points;
    let wickets = f64::from(state.wickets.min(10)) * weights.wicket_points;
    let tactical = phase + chase + wickets + 0.2 * finish(fatigue).max(finish(risk));

    TriggerScores {
        fatigue: finish(fatigue),
        risk: finish(risk),
        tactical: finish(tactical),
    }
}
