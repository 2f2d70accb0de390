use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Coaching recommendations from a match snapshot.
///
/// Reads one snapshot (match state, roster telemetry, active player) and
/// prints the requested analysis as JSON on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "crease", version, about = "Cricket workload and tactics orchestrator")]
pub struct CliArgs {
    /// Snapshot JSON file
    #[arg(long, short = 's', global = true, env = "CREASE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Configuration profile (overrides CREASE_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Route, run the selected capability domains and merge a recommendation
    Advise {
        /// Run every domain and plan both roles
        #[arg(long)]
        full: bool,
    },
    /// Show the routing decision only
    Route {
        #[arg(long)]
        full: bool,
    },
    /// Rank substitute bowlers and batters
    Rank {
        /// Candidates per list (defaults to CREASE_CANDIDATE_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Diagnostic trigger scores
    Triggers,
    /// Print the resolved configuration with secrets removed
    Config,
}
