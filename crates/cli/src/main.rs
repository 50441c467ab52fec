mod cli;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use pipedump_core::{load_dotenv, DirectoryConfig};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = DirectoryConfig::from_env().context("invalid directory configuration")?;
    if !args.offline {
        config.log_summary();
    }

    run::run(&args, &config).await
}
