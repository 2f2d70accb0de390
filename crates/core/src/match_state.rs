use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchFormat {
    T10,
    T20,
    Odi,
    Test,
}

impl MatchFormat {
    /// Maximum overs a single bowler may deliver (the quota).
    /// Multi-day matches have no quota.
    pub fn max_overs_per_bowler(self) -> Option<u32> {
        match self {
            MatchFormat::T10 => Some(2),
            MatchFormat::T20 => Some(4),
            MatchFormat::Odi => Some(10),
            MatchFormat::Test => None,
        }
    }
}

impl std::fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchFormat::T10 => write!(f, "T10"),
            MatchFormat::T20 => write!(f, "T20"),
            MatchFormat::Odi => write!(f, "ODI"),
            MatchFormat::Test => write!(f, "TEST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchPhase {
    Powerplay,
    Middle,
    Death,
}

/// Whether the active player's side is batting or bowling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Batting,
    Bowling,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Batting => write!(f, "batting"),
            Mode::Bowling => write!(f, "bowling"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

impl Intensity {
    /// Scales per-over fatigue gain.
    pub fn load_multiplier(self) -> f64 {
        match self {
            Intensity::Low => 0.8,
            Intensity::Medium => 1.0,
            Intensity::High => 1.25,
        }
    }
}

/// Scoreboard and phase of play for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub format: MatchFormat,
    pub phase: MatchPhase,
    pub mode: Mode,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub wickets: u32,
    #[serde(default)]
    pub overs: u32,
    #[serde(default)]
    pub balls: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_run_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_run_rate: Option<f64>,
}

impl MatchState {
    pub fn new(format: MatchFormat, phase: MatchPhase, mode: Mode) -> Self {
        Self {
            format,
            phase,
            mode,
            intensity: Intensity::default(),
            score: 0,
            wickets: 0,
            overs: 0,
            balls: 0,
            target: None,
            required_run_rate: None,
            current_run_rate: None,
        }
    }

    /// Required minus current run rate, when both are known.
    pub fn run_rate_gap(&self) -> Option<f64> {
        match (self.required_run_rate, self.current_run_rate) {
            (Some(required), Some(current)) => Some(required - current),
            _ => None,
        }
    }

    pub fn wickets_in_hand(&self) -> u32 {
        10u32.saturating_sub(self.wickets)
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(MatchFormat::T20, MatchPhase::Middle, Mode::Bowling)
    }
}
