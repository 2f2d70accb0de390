use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crease_agent::build_capabilities;
use crease_core::config::Config;
use crease_core::OrchestrationSnapshot;
use crease_orchestrator::{compute_triggers, decide, rank, AnalysisMode, Orchestrator};

use crate::cli::{CliArgs, Command};

fn analysis_mode(full: bool) -> AnalysisMode {
    if full {
        AnalysisMode::Full
    } else {
        AnalysisMode::Auto
    }
}

fn load_snapshot(path: Option<&Path>) -> Result<OrchestrationSnapshot> {
    let path = path.context("a snapshot file is required (--snapshot or CREASE_SNAPSHOT)")?;
    OrchestrationSnapshot::from_path(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))
}

/// Execute one subcommand and return its JSON output.
pub async fn run(args: &CliArgs, config: &Config) -> Result<Value> {
    if args.command == Command::Config {
        return Ok(config.redacted_summary());
    }

    let snapshot = load_snapshot(args.snapshot.as_deref())?;
    let settings = &config.orchestrator;
    info!(
        player = snapshot.active_player_id(),
        roster = snapshot.roster().len(),
        mode = %snapshot.mode(),
        "snapshot loaded"
    );

    let output = match &args.command {
        Command::Advise { full } => {
            let capabilities =
                build_capabilities(config).context("failed to build capability runners")?;
            let orchestrator = Orchestrator::new(Arc::new(settings.clone()), capabilities);
            let response = orchestrator.advise(&snapshot, analysis_mode(*full)).await;
            serde_json::to_value(response)?
        }
        Command::Route { full } => serde_json::to_value(decide(
            analysis_mode(*full),
            &snapshot,
            &settings.thresholds.router,
        ))?,
        Command::Rank { limit } => serde_json::to_value(rank(
            &snapshot,
            snapshot.active_player_id(),
            limit.unwrap_or(settings.candidate_limit),
            &settings.thresholds.ranker,
        ))?,
        Command::Triggers => {
            serde_json::to_value(compute_triggers(&snapshot, &settings.thresholds.triggers))?
        }
        Command::Config => config.redacted_summary(),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    const SNAPSHOT: &str = r#"{
        "matchState": {"format": "T20", "phase": "MIDDLE", "mode": "BOWLING"},
        "roster": [
            {"playerId": "p1", "name": "Archer", "role": "fast bowler",
             "live": {"fatigueIndex": 8.0, "injuryRisk": "HIGH"}},
            {"playerId": "p2", "name": "Wood", "role": "fast bowler",
             "live": {"fatigueIndex": 3.0, "injuryRisk": "LOW"}},
            {"playerId": "p3", "name": "Rashid", "role": "leg-spin bowler"},
            {"playerId": "p4", "name": "Root", "role": "top-order batter"}
        ],
        "activePlayerId": "p1"
    }"#;

    fn snapshot_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        file
    }

    fn rules_config() -> Config {
        let mut config = Config::for_profile("CLITEST");
        config.llm.provider = "rules".to_string();
        config
    }

    fn args(command: Command, snapshot: Option<PathBuf>) -> CliArgs {
        CliArgs {
            snapshot,
            profile: None,
            command,
        }
    }

    #[tokio::test]
    async fn advise_with_rule_runners() {
        let file = snapshot_file();
        let out = run(
            &args(Command::Advise { full: false }, Some(file.path().to_path_buf())),
            &rules_config(),
        )
        .await
        .unwrap();
        assert_eq!(out["router"]["intent"], "SAFETY_ALERT");
        assert_eq!(out["recommendation"]["authority"], "RISK_OVERRIDE");
        assert_eq!(out["recommendation"]["nextSafeBowler"]["playerId"], "p2");
        assert_eq!(out["errors"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rank_respects_limit() {
        let file = snapshot_file();
        let out = run(
            &args(Command::Rank { limit: Some(1) }, Some(file.path().to_path_buf())),
            &rules_config(),
        )
        .await
        .unwrap();
        assert_eq!(out["bowlerCandidates"].as_array().unwrap().len(), 1);
        assert_eq!(out["bowlerCandidates"][0]["playerId"], "p2");
    }

    #[tokio::test]
    async fn route_full_selects_every_domain() {
        let file = snapshot_file();
        let out = run(
            &args(Command::Route { full: true }, Some(file.path().to_path_buf())),
            &rules_config(),
        )
        .await
        .unwrap();
        assert_eq!(out["intent"], "BOTH_NEXT");
        assert_eq!(
            out["agentsToRun"],
            serde_json::json!(["FATIGUE", "RISK", "TACTICAL"])
        );
    }

    #[tokio::test]
    async fn missing_snapshot_is_an_error() {
        let err = run(&args(Command::Triggers, None), &rules_config())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("snapshot"));
    }

    #[tokio::test]
    async fn config_needs_no_snapshot() {
        let out = run(&args(Command::Config, None), &rules_config()).await.unwrap();
        assert_eq!(out["profile"], "CLITEST");
        assert_eq!(out["llm"]["provider"], "rules");
    }
}
