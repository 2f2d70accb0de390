use serde::{Deserialize, Serialize};

use crease_core::{
    Intent, MatchState, Mode, OrchestrationSnapshot, RiskLevel, RosterPlayerContext,
    SafetyCandidate,
};

/// Severity reported by the fatigue and risk domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// HIGH or CRITICAL.
    pub fn is_severe(self) -> bool {
        self >= Severity::High
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// Input to the fatigue and risk domains: one player in one match state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub match_state: MatchState,
    pub player: RosterPlayerContext,
    pub mode: Mode,
    pub quota: Option<u32>,
}

pub type FatigueRequest = AssessmentRequest;
pub type RiskRequest = AssessmentRequest;

impl AssessmentRequest {
    /// Build from a snapshot. An unresolvable active player becomes a
    /// placeholder with every signal unknown.
    pub fn from_snapshot(snapshot: &OrchestrationSnapshot) -> Self {
        let player = snapshot.active_player().cloned().unwrap_or_else(|| {
            RosterPlayerContext::new(snapshot.active_player_id(), "Unknown player", "")
        });
        Self {
            match_state: snapshot.match_state().clone(),
            player,
            mode: snapshot.mode(),
            quota: snapshot.quota(),
        }
    }
}

/// Input to the tactical domain, carrying the settled fatigue/risk context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalRequest {
    pub match_state: MatchState,
    pub player: RosterPlayerContext,
    pub mode: Mode,
    pub intent: Intent,
    /// `None` when the fatigue domain was not selected.
    pub fatigue: Option<FatigueOutput>,
    /// `None` when the risk domain was not selected.
    pub risk: Option<RiskOutput>,
    pub bowler_candidates: Vec<SafetyCandidate>,
    pub batter_candidates: Vec<SafetyCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueOutput {
    pub fatigue_index: f64,
    pub projected_fatigue: f64,
    pub severity: Severity,
    pub headline: String,
    pub recommendation: String,
    #[serde(default)]
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOutput {
    pub severity: Severity,
    #[serde(default)]
    pub injury_risk: RiskLevel,
    #[serde(default)]
    pub no_ball_risk: RiskLevel,
    pub headline: String,
    pub recommendation: String,
    pub rationale: String,
    #[serde(default)]
    pub mitigations: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalOutput {
    pub immediate_action: String,
    pub rationale: String,
    #[serde(default)]
    pub suggested_adjustments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_bowler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_batter: Option<String>,
    pub confidence: Confidence,
}

/// What a capability runner hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerOutput<T> {
    pub output: T,
    pub model: String,
    #[serde(default)]
    pub fallbacks_used: Vec<String>,
}

/// Structural checks applied to model-produced outputs before they are trusted.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is empty"))
    } else {
        Ok(())
    }
}

impl Validate for FatigueOutput {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=10.0).contains(&self.fatigue_index) {
            return Err(format!("fatigueIndex {} outside 0-10", self.fatigue_index));
        }
        require_text("headline", &self.headline)?;
        require_text("recommendation", &self.recommendation)
    }
}

impl Validate for RiskOutput {
    fn validate(&self) -> Result<(), String> {
        require_text("headline", &self.headline)?;
        require_text("recommendation", &self.recommendation)?;
        require_text("rationale", &self.rationale)
    }
}

impl Validate for TacticalOutput {
    fn validate(&self) -> Result<(), String> {
        require_text("immediateAction", &self.immediate_action)?;
        require_text("rationale", &self.rationale)?;
        if let Some(name) = &self.next_bowler {
            require_text("nextBowler", name)?;
        }
        if let Some(name) = &self.next_batter {
            require_text("nextBatter", name)?;
        }
        Ok(())
    }
}
