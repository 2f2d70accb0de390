mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crease_core::config::{load_dotenv, Config};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    config.log_summary();

    let output = commands::run(&args, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
