use crate::cli::{Cli, SubCommands};
use crate::config::AppConfig;
use crate::log::initialize_logging;
use clap::Parser;

mod cli;
mod cmd;
mod config;
mod log;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // before parsing, clap reads SEPOLIA_CONFIG_PATH and SEPOLIA_PROFILE
    let dotenv = dotenvy::dotenv();
    let args = Cli::parse();
    initialize_logging()?;
    if let Err(e) = dotenv {
        tracing::debug!("no .env loaded: {e}");
    }
    let cfg = AppConfig::new(args.config, args.profile)?;
    tracing::info!("config {cfg}");
    cmd::run(args.subcommands.unwrap_or(SubCommands::Status), &cfg).await
}
