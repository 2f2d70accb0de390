//! Product-tuned thresholds and weights for routing, ranking and trigger scoring.
//!
//! The values have no documented derivation; they are kept as named constants
//! and grouped into plain structs so deployments and tests can override them.

use serde::{Deserialize, Serialize};

// ── Router ────────────────────────────────────────────────────

pub const FATIGUE_TRIGGER: f64 = 6.0;
pub const STRAIN_TRIGGER: f64 = 3.0;
/// Expected fatigue gain from one more over at MEDIUM intensity.
pub const FATIGUE_GAIN_PER_OVER: f64 = 0.6;

// ── Missing-data defaults ─────────────────────────────────────

pub const DEFAULT_FATIGUE: f64 = 5.0;
pub const DEFAULT_SLEEP_HOURS: f64 = 6.0;
pub const DEFAULT_RECOVERY: f64 = 45.0;

// ── Ranker ────────────────────────────────────────────────────

pub const FATIGUE_CEILING: f64 = 10.0;
pub const SLEEP_TARGET_HOURS: f64 = 7.0;
pub const RISK_BONUS_LOW: f64 = 2.0;
pub const RISK_BONUS_MEDIUM: f64 = 0.8;
pub const RISK_BONUS_HIGH: f64 = -2.2;
pub const ACUTE_CHRONIC_CEILING: f64 = 1.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterThresholds {
    pub fatigue_trigger: f64,
    pub strain_trigger: f64,
    pub fatigue_gain_per_over: f64,
}

impl Default for RouterThresholds {
    fn default() -> Self {
        Self {
            fatigue_trigger: FATIGUE_TRIGGER,
            strain_trigger: STRAIN_TRIGGER,
            fatigue_gain_per_over: FATIGUE_GAIN_PER_OVER,
        }
    }
}

/// Weights for one ranking domain (bowling or batting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points per hour of sleep above/below target.
    pub sleep: f64,
    /// Points for a recovery score of 100 (scaled linearly around 50).
    pub recovery: f64,
    /// Penalty per over already bowled this match.
    pub overs: f64,
    /// Penalty per unit of acute:chronic ratio above the ceiling.
    pub workload: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankerWeights {
    pub bowling: ScoreWeights,
    pub batting: ScoreWeights,
    /// Recovery weight used for batting when match intensity is HIGH.
    pub batting_high_intensity_recovery: f64,
    pub risk_bonus_low: f64,
    pub risk_bonus_medium: f64,
    pub risk_bonus_high: f64,
    pub sleep_bonus_min: f64,
    pub sleep_bonus_max: f64,
    pub acute_chronic_ceiling: f64,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            bowling: ScoreWeights {
                sleep: 0.35,
                recovery: 1.2,
                overs: 0.45,
                workload: 1.5,
            },
            batting: ScoreWeights {
                sleep: 0.35,
                recovery: 1.6,
                overs: 0.1,
                workload: 1.0,
            },
            batting_high_intensity_recovery: 2.2,
            risk_bonus_low: RISK_BONUS_LOW,
            risk_bonus_medium: RISK_BONUS_MEDIUM,
            risk_bonus_high: RISK_BONUS_HIGH,
            sleep_bonus_min: -1.5,
            sleep_bonus_max: 1.0,
            acute_chronic_ceiling: ACUTE_CHRONIC_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerWeights {
    pub fatigue_share: f64,
    pub workload_share: f64,
    pub recovery_share: f64,
    pub strain_points: f64,
    pub injury_share: f64,
    pub no_ball_share: f64,
    pub risk_fatigue_share: f64,
    pub run_rate_gap_points: f64,
    pub wicket_points: f64,
    pub powerplay_points: f64,
    pub middle_points: f64,
    pub death_points: f64,
}

impl Default for TriggerWeights {
    fn default() -> Self {
        Self {
            fatigue_share: 0.55,
            workload_share: 0.25,
            recovery_share: 0.20,
            strain_points: 4.0,
            injury_share: 0.60,
            no_ball_share: 0.25,
            risk_fatigue_share: 0.15,
            run_rate_gap_points: 12.0,
            wicket_points: 6.0,
            powerplay_points: 12.0,
            middle_points: 8.0,
            death_points: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub router: RouterThresholds,
    pub ranker: RankerWeights,
    pub triggers: TriggerWeights,
}
