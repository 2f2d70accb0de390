use serde::{Deserialize, Serialize};

/// A roster player scored as a substitution option. Higher score = safer to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyCandidate {
    pub player_id: String,
    pub name: String,
    pub role: String,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRanking {
    pub bowler_candidates: Vec<SafetyCandidate>,
    pub batter_candidates: Vec<SafetyCandidate>,
    pub bench_options: Vec<SafetyCandidate>,
}
