//! Safety ranking of substitute players.
//!
//! Every non-active roster player is scored for bowling and batting suitability
//! as a weighted sum of fatigue, injury band, sleep, recovery and workload.
//! Missing telemetry falls back to moderate defaults, so ranking never fails.

use crease_core::tuning::{
    RankerWeights, DEFAULT_FATIGUE, DEFAULT_RECOVERY, DEFAULT_SLEEP_HOURS, FATIGUE_CEILING,
    SLEEP_TARGET_HOURS,
};
use crease_core::{
    Intensity, Mode, OrchestrationSnapshot, RiskLevel, RosterPlayerContext, SafetyCandidate,
    SafetyRanking,
};

/// Rank eligible bowlers and batters, best first.
///
/// `active_player_id` is excluded from every list. Bowlers who have already
/// bowled their quota are not bowling candidates. `bench_options` scores every
/// other player for the snapshot's mode regardless of role.
pub fn rank(
    snapshot: &OrchestrationSnapshot,
    active_player_id: &str,
    limit: usize,
    weights: &RankerWeights,
) -> SafetyRanking {
    let intensity = snapshot.match_state().intensity;
    let pool: Vec<&RosterPlayerContext> = snapshot
        .roster()
        .iter()
        .filter(|p| p.player_id != active_player_id)
        .collect();

    let bowlers = pool
        .iter()
        .filter(|p| p.can_bowl() && !snapshot.quota_complete(p))
        .map(|p| candidate(p, Mode::Bowling, intensity, weights))
        .collect();

    let batters = pool
        .iter()
        .filter(|p| p.can_bat())
        .map(|p| candidate(p, Mode::Batting, intensity, weights))
        .collect();

    let mode = snapshot.mode();
    let bench = pool
        .iter()
        .map(|p| {
            let mut c = candidate(p, mode, intensity, weights);
            let eligible = match mode {
                Mode::Bowling => p.can_bowl(),
                Mode::Batting => p.can_bat(),
            };
            if !eligible {
                c.reason.push_str(&format!(" (not a {mode} role)"));
            }
            c
        })
        .collect();

    SafetyRanking {
        bowler_candidates: top(bowlers, limit),
        batter_candidates: top(batters, limit),
        bench_options: top(bench, limit),
    }
}

/// Stable descending sort, so equal scores keep roster order.
fn top(mut candidates: Vec<SafetyCandidate>, limit: usize) -> Vec<SafetyCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(limit);
    candidates
}

fn candidate(
    player: &RosterPlayerContext,
    mode: Mode,
    intensity: Intensity,
    weights: &RankerWeights,
) -> SafetyCandidate {
    let (score, reason) = safety_score(player, mode, intensity, weights);
    SafetyCandidate {
        player_id: player.player_id.clone(),
        name: player.name.clone(),
        role: player.role.clone(),
        score,
        reason,
    }
}

pub fn risk_bonus(level: RiskLevel, weights: &RankerWeights) -> f64 {
    match level {
        RiskLevel::Low => weights.risk_bonus_low,
        RiskLevel::Medium => weights.risk_bonus_medium,
        RiskLevel::High => weights.risk_bonus_high,
        RiskLevel::Unknown => 0.0,
    }
}

/// `(10 − fatigue) + risk bonus + sleep bonus + recovery bonus − workload penalty`,
/// rounded to two decimals, with a human-readable breakdown.
pub fn safety_score(
    player: &RosterPlayerContext,
    mode: Mode,
    intensity: Intensity,
    weights: &RankerWeights,
) -> (f64, String) {
    let live = &player.live;
    let baseline = &player.baseline;

    let fatigue = live
        .fatigue_index
        .unwrap_or(DEFAULT_FATIGUE)
        .clamp(0.0, FATIGUE_CEILING);
    let sleep = baseline.sleep_hours.unwrap_or(DEFAULT_SLEEP_HOURS);
    let recovery = baseline.recovery_score.unwrap_or(DEFAULT_RECOVERY);
    let overs = live.overs_bowled.unwrap_or(0.0);

    let domain = match mode {
        Mode::Bowling => &weights.bowling,
        Mode::Batting => &weights.batting,
    };
    let recovery_weight = if mode == Mode::Batting && intensity == Intensity::High {
        weights.batting_high_intensity_recovery
    } else {
        domain.recovery
    };

    let sleep_bonus = ((sleep - SLEEP_TARGET_HOURS) * domain.sleep)
        .clamp(weights.sleep_bonus_min, weights.sleep_bonus_max);
    let recovery_bonus = (recovery - 50.0) / 50.0 * recovery_weight;
    let workload_excess = baseline
        .acute_chronic_ratio()
        .map(|r| (r - weights.acute_chronic_ceiling).max(0.0))
        .unwrap_or(0.0);
    let workload_penalty = overs * domain.overs + workload_excess * domain.workload;

    let score = (FATIGUE_CEILING - fatigue)
        + risk_bonus(live.injury_risk, weights)
        + sleep_bonus
        + recovery_bonus
        - workload_penalty;

    let reason = format!(
        "fatigue {fatigue:.1}, injury {}, sleep {sleep:.1}h, recovery {recovery:.0}, overs {overs:.0}",
        live.injury_risk
    );

    ((score * 100.0).round() / 100.0, reason)
}
