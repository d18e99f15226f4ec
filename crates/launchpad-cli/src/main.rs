mod commands;
mod config;
mod rpc;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use commands::Command;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Deploy compiled contracts to EVM networks")]
#[command(version)]
struct Cli {
    /// Path to the project configuration
    #[arg(long, global = true, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli.command.run(&cli.config).await
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
