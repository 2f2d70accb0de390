use serde::{Deserialize, Serialize};

/// Role text fragments that mark a player as able to bowl.
pub const BOWLING_ROLE_HINTS: &[&str] = &[
    "bowl",
    "all-rounder",
    "allrounder",
    "all rounder",
    "pace",
    "seam",
    "spin",
    "quick",
    "fast",
    "medium",
];

/// Role text fragments that mark a player as able to bat.
pub const BATTING_ROLE_HINTS: &[&str] = &[
    "bat",
    "opener",
    "keeper",
    "all-rounder",
    "allrounder",
    "all rounder",
    "finisher",
    "top order",
    "top-order",
    "middle order",
    "middle-order",
    "anchor",
];

/// Injury / no-ball risk band. `Unknown` is a real value, not an alias for `Low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl RiskLevel {
    /// MEDIUM or HIGH.
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Pre-match baseline for a player. Every field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Baseline {
    pub sleep_hours: Option<f64>,
    pub recovery_score: Option<f64>,
    pub workload_7d: Option<f64>,
    pub workload_28d: Option<f64>,
    pub fatigue_limit: Option<f64>,
    pub control: Option<f64>,
    pub speed: Option<f64>,
    pub power: Option<f64>,
}

impl Baseline {
    /// Acute:chronic workload ratio (7-day load against the weekly share of 28 days).
    pub fn acute_chronic_ratio(&self) -> Option<f64> {
        match (self.workload_7d, self.workload_28d) {
            (Some(acute), Some(chronic)) if chronic > 0.0 => Some(acute / (chronic / 4.0)),
            _ => None,
        }
    }
}

/// In-match telemetry for a player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveSignals {
    pub fatigue_index: Option<f64>,
    pub strain_index: Option<f64>,
    pub injury_risk: RiskLevel,
    pub no_ball_risk: RiskLevel,
    pub heart_rate_recovery: Option<f64>,
    pub overs_bowled: Option<f64>,
}

/// What a role string allows the player to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCapability {
    pub can_bowl: bool,
    pub can_bat: bool,
}

impl RoleCapability {
    /// Match role text against the fixed hint vocabulary.
    pub fn from_role(role: &str) -> Self {
        let role = role.to_lowercase();
        Self {
            can_bowl: BOWLING_ROLE_HINTS.iter().any(|hint| role.contains(hint)),
            can_bat: BATTING_ROLE_HINTS.iter().any(|hint| role.contains(hint)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayerContext {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub baseline: Baseline,
    #[serde(default)]
    pub live: LiveSignals,
}

impl RosterPlayerContext {
    pub fn new(player_id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            role: role.into(),
            baseline: Baseline::default(),
            live: LiveSignals::default(),
        }
    }

    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_live(mut self, live: LiveSignals) -> Self {
        self.live = live;
        self
    }

    pub fn capability(&self) -> RoleCapability {
        RoleCapability::from_role(&self.role)
    }

    pub fn can_bowl(&self) -> bool {
        self.capability().can_bowl
    }

    pub fn can_bat(&self) -> bool {
        self.capability().can_bat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hints() {
        let pacer = RoleCapability::from_role("Right-arm fast bowler");
        assert!(pacer.can_bowl);
        assert!(!pacer.can_bat);

        let opener = RoleCapability::from_role("Opening Batter");
        assert!(!opener.can_bowl);
        assert!(opener.can_bat);

        let ar = RoleCapability::from_role("All-Rounder");
        assert!(ar.can_bowl && ar.can_bat);

        let keeper = RoleCapability::from_role("Wicket-keeper");
        assert!(keeper.can_bat);
        assert!(!keeper.can_bowl);

        assert_eq!(RoleCapability::from_role("physio"), RoleCapability::default());
    }

    #[test]
    fn missing_signals_deserialize_as_unknown() {
        let player: RosterPlayerContext =
            serde_json::from_str(r#"{"playerId":"p1","name":"Asha","role":"spinner"}"#).unwrap();
        assert_eq!(player.live.injury_risk, RiskLevel::Unknown);
        assert_eq!(player.live.fatigue_index, None);
        assert_eq!(player.baseline.sleep_hours, None);
    }

    #[test]
    fn workload_fields_use_compact_names() {
        let baseline: Baseline =
            serde_json::from_str(r#"{"workload7d":120.0,"workload28d":400.0}"#).unwrap();
        let ratio = baseline.acute_chronic_ratio().unwrap();
        assert!((ratio - 1.2).abs() < 1e-9);
    }

    #[test]
    fn zero_chronic_load_has_no_ratio() {
        let baseline = Baseline {
            workload_7d: Some(50.0),
            workload_28d: Some(0.0),
            ..Baseline::default()
        };
        assert_eq!(baseline.acute_chronic_ratio(), None);
    }
}
