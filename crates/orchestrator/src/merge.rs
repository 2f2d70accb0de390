//! Merging domain outputs into one recommendation.
//!
//! Severe risk overrides the tactical plan. Otherwise the tactical domain is
//! authoritative, and when it produced nothing a statement is synthesized from
//! the fatigue and risk assessments. The mode guard then runs on every merge:
//! off-mode references are removed and the replacement slot only ever holds an
//! eligible ranked candidate or the `NONE` sentinel.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crease_agent::{Confidence, FatigueOutput, RiskOutput, Severity, TacticalOutput};
use crease_core::{Intent, Mode, OrchestrationSnapshot, RouterDecision, SafetyCandidate, SafetyRanking};

use crate::result::{DomainRun, ResultStatus};

/// Cap on `suggested_adjustments` after merging.
pub const MAX_ADJUSTMENTS: usize = 4;

/// `player_id` of the no-eligible-replacement sentinel.
pub const NO_ELIGIBLE_PLAYER: &str = "NONE";

/// Phrases that propose a bowling change. Not allowed while batting.
const BOWLER_SWAP_PHRASES: &[&str] = &[
    "bring on",
    "bowling change",
    "change the bowler",
    "change bowler",
    "swap bowler",
    "bowler swap",
    "next bowler",
    "replace the bowler",
    "rotate the bowler",
    "into the attack",
    "out of the attack",
    "from the attack",
    "take him off",
    "take her off",
    "replacement bowler",
];

/// Phrases that propose a batting change. Not allowed while bowling.
const NEXT_BATTER_PHRASES: &[&str] = &[
    "next batter",
    "next batsman",
    "new batter",
    "padded up",
    "pad up",
    "send in",
    "batting order",
    "up the order",
    "retire",
    "replacement batter",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    RiskOverride,
    Tactical,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedDecision {
    pub immediate_action: String,
    pub rationale: String,
    pub suggested_adjustments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSafePlayer {
    pub player_id: String,
    pub name: String,
    pub reason: String,
}

impl NextSafePlayer {
    pub fn none(mode: Mode) -> Self {
        let role = role_noun(mode);
        Self {
            player_id: NO_ELIGIBLE_PLAYER.to_string(),
            name: format!("No eligible {role} available in roster"),
            reason: format!("No {role} in the roster besides the active player is eligible."),
        }
    }

    pub fn is_none(&self) -> bool {
        self.player_id == NO_ELIGIBLE_PLAYER
    }

    fn from_candidate(candidate: &SafetyCandidate) -> Self {
        Self {
            player_id: candidate.player_id.clone(),
            name: candidate.name.clone(),
            reason: candidate.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfContinues {
    pub risk_level: Severity,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRecommendation {
    pub title: String,
    pub statement: String,
    pub combined_decision: CombinedDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_safe_bowler: Option<NextSafePlayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_safe_batter: Option<NextSafePlayer>,
    pub confidence: Confidence,
    pub if_continues: IfContinues,
    pub authority: Authority,
    pub mode: Mode,
}

fn role_noun(mode: Mode) -> &'static str {
    match mode {
        Mode::Bowling => "bowler",
        Mode::Batting => "batter",
    }
}

pub fn merge(
    snapshot: &OrchestrationSnapshot,
    decision: &RouterDecision,
    run: &DomainRun,
    ranking: &SafetyRanking,
) -> FinalRecommendation {
    let mode = snapshot.mode();
    let name = snapshot
        .active_player()
        .map(|p| p.name.as_str())
        .unwrap_or_else(|| snapshot.active_player_id());

    let fatigue = run.fatigue.output();
    let risk = run.risk.output();
    let tactical = run.tactical.output();

    let (authority, mut combined) = match (risk, tactical) {
        (Some(r), _) if r.severity.is_severe() => (Authority::RiskOverride, risk_override(r, tactical)),
        (_, Some(t)) => (
            Authority::Tactical,
            CombinedDecision {
                immediate_action: t.immediate_action.clone(),
                rationale: t.rationale.clone(),
                suggested_adjustments: capped(t.suggested_adjustments.iter()),
            },
        ),
        _ => (Authority::Synthesized, synthesize(name, fatigue, risk)),
    };

    let proposed = tactical
        .and_then(|t| match mode {
            Mode::Bowling => t.next_bowler.as_deref(),
            Mode::Batting => t.next_batter.as_deref(),
        })
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let eligible = match mode {
        Mode::Bowling => &ranking.bowler_candidates,
        Mode::Batting => &ranking.batter_candidates,
    };
    let (slot, accepted) = resolve_slot(proposed, eligible, mode);

    if let Some(proposed) = proposed {
        if !accepted {
            warn!(%mode, proposed, replacement = %slot.name, "replacing ineligible proposal");
            let names_active = proposed == snapshot.active_player_id() || proposed.eq_ignore_ascii_case(name);
            if !names_active {
                replace_proposal(&mut combined, proposed, &slot, name, mode);
            }
        }
    }

    let corrections = guard(&mut combined, mode, name);
    if corrections > 0 {
        debug!(%mode, corrections, "mode guard removed off-mode references");
    }

    let confidence = confidence(authority, run, tactical);
    let if_continues = if_continues(name, mode, fatigue, risk);
    let title = title(authority, decision.intent, mode, name);
    let statement = statement(&combined.immediate_action, &slot, mode);

    let (next_safe_bowler, next_safe_batter) = match mode {
        Mode::Bowling => (Some(slot), None),
        Mode::Batting => (None, Some(slot)),
    };

    FinalRecommendation {
        title,
        statement,
        combined_decision: combined,
        next_safe_bowler,
        next_safe_batter,
        confidence,
        if_continues,
        authority,
        mode,
    }
}

fn capped<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if out.len() == MAX_ADJUSTMENTS {
            break;
        }
        if !out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            out.push(item.clone());
        }
    }
    out
}

fn risk_override(risk: &RiskOutput, tactical: Option<&TacticalOutput>) -> CombinedDecision {
    let appended = tactical
        .map(|t| t.suggested_adjustments.as_slice())
        .unwrap_or_default();
    CombinedDecision {
        immediate_action: risk.recommendation.clone(),
        rationale: risk.rationale.clone(),
        suggested_adjustments: capped(risk.mitigations.iter().chain(appended)),
    }
}

fn synthesize(name: &str, fatigue: Option<&FatigueOutput>, risk: Option<&RiskOutput>) -> CombinedDecision {
    match (fatigue, risk) {
        (f, Some(r)) if f.map_or(true, |f| r.severity >= f.severity) => CombinedDecision {
            immediate_action: r.recommendation.clone(),
            rationale: r.rationale.clone(),
            suggested_adjustments: capped(r.mitigations.iter()),
        },
        (Some(f), _) => CombinedDecision {
            immediate_action: f.recommendation.clone(),
            rationale: format!("{}: {}.", f.headline, f.signals.join(", ")),
            suggested_adjustments: Vec::new(),
        },
        _ => CombinedDecision {
            immediate_action: format!(
                "No assessment is available for {name}: continue the current plan and reassess after the over."
            ),
            rationale: "No capability domain produced an output for this request.".to_string(),
            suggested_adjustments: Vec::new(),
        },
    }
}

fn off_mode_phrases(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Bowling => NEXT_BATTER_PHRASES,
        Mode::Batting => BOWLER_SWAP_PHRASES,
    }
}

/// Byte ranges of whole-word occurrences of `needle`, ignoring ASCII case.
fn word_matches(text: &str, needle: &str) -> Vec<(usize, usize)> {
    let needle = needle.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let hay = text.to_ascii_lowercase();
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(pos) = hay[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let bounded_before = hay[..start].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
        let bounded_after = hay[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if bounded_before && bounded_after {
            found.push((start, end));
            from = end;
        } else {
            from = start + hay[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

fn contains_word(text: &str, needle: &str) -> bool {
    !word_matches(text, needle).is_empty()
}

fn replace_word(text: &str, needle: &str, with: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in word_matches(text, needle) {
        out.push_str(&text[last..start]);
        out.push_str(with);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

fn mentions_off_mode(text: &str, mode: Mode) -> bool {
    off_mode_phrases(mode).iter().any(|p| contains_word(text, p))
}

/// Keep the sentences of `text` that pass `keep`. `None` when nothing is left.
fn keep_sentences(text: &str, keep: impl Fn(&str) -> bool) -> Option<String> {
    let kept: Vec<&str> = text
        .split_inclusive(['.', ';'])
        .filter(|sentence| keep(sentence))
        .collect();
    let joined = kept.concat();
    let trimmed = joined.trim().trim_end_matches(';').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Drop sentences that mention the other role's changes.
fn strip_off_mode(text: &str, mode: Mode) -> Option<String> {
    keep_sentences(text, |sentence| !mentions_off_mode(sentence, mode))
}

/// Rewrite a rejected proposal out of every free-text field: swapped for the
/// substitute, or removed when there is no eligible substitute.
fn replace_proposal(
    combined: &mut CombinedDecision,
    proposed: &str,
    slot: &NextSafePlayer,
    name: &str,
    mode: Mode,
) {
    if slot.is_none() {
        combined.immediate_action = no_replacement_action(name, mode);
        combined.rationale = keep_sentences(&combined.rationale, |s| !contains_word(s, proposed))
            .unwrap_or_else(|| format!("No eligible {} is available in the roster.", role_noun(mode)));
        combined
            .suggested_adjustments
            .retain(|a| !contains_word(a, proposed));
    } else {
        combined.immediate_action = replace_word(&combined.immediate_action, proposed, &slot.name);
        combined.rationale = replace_word(&combined.rationale, proposed, &slot.name);
        for adjustment in &mut combined.suggested_adjustments {
            *adjustment = replace_word(adjustment, proposed, &slot.name);
        }
    }
}

fn mode_default_action(name: &str, mode: Mode) -> String {
    match mode {
        Mode::Bowling => format!("Manage {name}'s bowling workload through the next over."),
        Mode::Batting => format!("Keep {name} batting and manage effort between deliveries."),
    }
}

fn no_replacement_action(name: &str, mode: Mode) -> String {
    match mode {
        Mode::Bowling => format!(
            "No eligible replacement bowler is available: manage {name}'s workload through the next over."
        ),
        Mode::Batting => format!(
            "No eligible replacement batter is available: {name} should manage effort and bat through."
        ),
    }
}

/// Rewrite every free-text field so nothing refers to the inactive role.
/// Returns the number of fields changed.
fn guard(combined: &mut CombinedDecision, mode: Mode, name: &str) -> usize {
    let mut corrections = 0;

    if mentions_off_mode(&combined.immediate_action, mode) {
        combined.immediate_action = strip_off_mode(&combined.immediate_action, mode)
            .unwrap_or_else(|| mode_default_action(name, mode));
        corrections += 1;
    }
    if mentions_off_mode(&combined.rationale, mode) {
        combined.rationale = strip_off_mode(&combined.rationale, mode)
            .unwrap_or_else(|| format!("Plan limited to {name}'s {mode} workload."));
        corrections += 1;
    }
    let before = combined.suggested_adjustments.len();
    combined
        .suggested_adjustments
        .retain(|a| !mentions_off_mode(a, mode));
    corrections += before - combined.suggested_adjustments.len();

    corrections
}

/// The tactical proposal when it names an eligible candidate, otherwise the
/// top-ranked eligible candidate, otherwise the sentinel. The flag is true
/// when the proposal was accepted as-is.
fn resolve_slot(
    proposed: Option<&str>,
    eligible: &[SafetyCandidate],
    mode: Mode,
) -> (NextSafePlayer, bool) {
    let matched = proposed.and_then(|p| {
        eligible
            .iter()
            .find(|c| c.player_id == p || c.name.eq_ignore_ascii_case(p))
    });
    let slot = matched
        .or_else(|| eligible.first())
        .map(NextSafePlayer::from_candidate)
        .unwrap_or_else(|| NextSafePlayer::none(mode));
    (slot, matched.is_some())
}

fn confidence(authority: Authority, run: &DomainRun, tactical: Option<&TacticalOutput>) -> Confidence {
    let base = match authority {
        Authority::RiskOverride if run.risk.status == ResultStatus::Ok => Confidence::High,
        Authority::RiskOverride => Confidence::Medium,
        Authority::Tactical => tactical.map_or(Confidence::Medium, |t| t.confidence),
        Authority::Synthesized => return Confidence::Low,
    };
    if run.any_degraded() {
        base.downgrade()
    } else {
        base
    }
}

fn if_continues(
    name: &str,
    mode: Mode,
    fatigue: Option<&FatigueOutput>,
    risk: Option<&RiskOutput>,
) -> IfContinues {
    let risk_level = [fatigue.map(|f| f.severity), risk.map(|r| r.severity)]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(Severity::Low);

    let mut parts = Vec::new();
    if let Some(f) = fatigue {
        parts.push(format!(
            "fatigue projected at {:.1}/10 after the next over",
            f.projected_fatigue
        ));
    }
    if let Some(r) = risk {
        parts.push(format!("{} injury risk", r.severity.label()));
    }

    let summary = if parts.is_empty() {
        format!("No fatigue or risk assessment was run for {name}; continuing carries no flagged risk.")
    } else {
        format!("If {name} keeps {}: {}.", activity(mode), parts.join(", "))
    };

    IfContinues { risk_level, summary }
}

fn activity(mode: Mode) -> &'static str {
    match mode {
        Mode::Bowling => "bowling",
        Mode::Batting => "batting",
    }
}

fn title(authority: Authority, intent: Intent, mode: Mode, name: &str) -> String {
    if authority == Authority::RiskOverride {
        return format!("Safety alert: {name}");
    }
    match intent {
        Intent::SafetyAlert => format!("Safety alert: {name}"),
        Intent::Substitution => format!("Quota complete: {name}"),
        Intent::BowlingNext => format!("Next over: {name}"),
        Intent::BattingNext => format!("Batting plan: {name}"),
        Intent::BothNext => format!("Full {mode} analysis: {name}"),
        Intent::General => format!("Workload check: {name}"),
    }
}

fn statement(action: &str, slot: &NextSafePlayer, mode: Mode) -> String {
    let role = role_noun(mode);
    if slot.is_none() {
        format!("{action} No eligible {role} available in roster.")
    } else {
        format!("{action} Next safe {role}: {}.", slot.name)
    }
}
