use serde::{Deserialize, Serialize};

use crate::match_state::Mode;
use crate::roster::RiskLevel;

/// An independently invocable advisory function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    Fatigue,
    Risk,
    Tactical,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Fatigue, Domain::Risk, Domain::Tactical];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Fatigue => "fatigue",
            Domain::Risk => "risk",
            Domain::Tactical => "tactical",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Substitution,
    BowlingNext,
    BattingNext,
    BothNext,
    SafetyAlert,
    General,
}

/// Signals the router looked at, echoed for audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterInputs {
    pub mode: Option<Mode>,
    pub fatigue_index: Option<f64>,
    pub projected_fatigue: Option<f64>,
    pub fatigue_limit: Option<f64>,
    pub strain_index: Option<f64>,
    pub injury_risk: RiskLevel,
    pub no_ball_risk: RiskLevel,
    pub overs_bowled: Option<f64>,
    pub quota: Option<u32>,
    pub quota_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterDecision {
    pub intent: Intent,
    /// Ordered, without duplicates. Contains `Tactical` for every decision.
    pub agents_to_run: Vec<Domain>,
    pub rules_fired: Vec<String>,
    pub inputs_used: RouterInputs,
    pub reason: String,
}

impl RouterDecision {
    pub fn runs(&self, domain: Domain) -> bool {
        self.agents_to_run.contains(&domain)
    }
}
