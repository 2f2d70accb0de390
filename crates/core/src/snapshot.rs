use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::match_state::{MatchState, Mode};
use crate::roster::RosterPlayerContext;

/// The fully-resolved match, roster and telemetry state for one orchestration call.
///
/// Fields are private: a snapshot is built once and every downstream component
/// reads the same value through shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSnapshot {
    match_state: MatchState,
    #[serde(default)]
    roster: Vec<RosterPlayerContext>,
    active_player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    focus_role: Option<Mode>,
}

impl OrchestrationSnapshot {
    pub fn new(
        match_state: MatchState,
        roster: Vec<RosterPlayerContext>,
        active_player_id: impl Into<String>,
        focus_role: Option<Mode>,
    ) -> Self {
        Self {
            match_state,
            roster,
            active_player_id: active_player_id.into(),
            focus_role,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn roster(&self) -> &[RosterPlayerContext] {
        &self.roster
    }

    pub fn active_player_id(&self) -> &str {
        &self.active_player_id
    }

    /// Explicit focus role when given, otherwise the match mode.
    pub fn mode(&self) -> Mode {
        self.focus_role.unwrap_or(self.match_state.mode)
    }

    pub fn active_player(&self) -> Option<&RosterPlayerContext> {
        self.roster
            .iter()
            .find(|p| p.player_id == self.active_player_id)
    }

    /// No roster signal to classify: the active player cannot be resolved.
    pub fn is_degenerate(&self) -> bool {
        self.active_player().is_none()
    }

    pub fn quota(&self) -> Option<u32> {
        self.match_state.format.max_overs_per_bowler()
    }

    /// True when the player has already bowled the format's quota.
    pub fn quota_complete(&self, player: &RosterPlayerContext) -> bool {
        match (self.quota(), player.live.overs_bowled) {
            (Some(quota), Some(bowled)) => bowled >= f64::from(quota),
            _ => false,
        }
    }
}
