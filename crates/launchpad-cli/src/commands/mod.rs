//! CLI commands for launchpad

use std::path::Path;

use clap::Subcommand;
use color_eyre::eyre::Result;

pub mod accounts;
pub mod artifacts;
pub mod deploy;
pub mod evm;
pub mod init;
pub mod networks;

/// All available CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Write a starter launchpad.toml
    Init(init::InitCommand),

    /// Deploy a compiled contract and wait for confirmation
    Deploy(deploy::DeployCommand),

    /// List configured networks
    Networks(networks::NetworksCommand),

    /// Print the accounts configured for a network
    Accounts(accounts::AccountsCommand),

    /// Print the accounts configured for a network and their balances
    Balances(accounts::BalancesCommand),

    /// Print the configured EVM version
    Evm(evm::EvmCommand),

    /// List deployable artifacts
    Artifacts(artifacts::ArtifactsCommand),
}

impl Command {
    /// Execute the command
    pub async fn run(self, config_path: &Path) -> Result<()> {
        match self {
            Command::Init(cmd) => cmd.run(config_path).await,
            Command::Deploy(cmd) => cmd.run(config_path).await,
            Command::Networks(cmd) => cmd.run(config_path).await,
            Command::Accounts(cmd) => cmd.run(config_path).await,
            Command::Balances(cmd) => cmd.run(config_path).await,
            Command::Evm(cmd) => cmd.run(config_path).await,
            Command::Artifacts(cmd) => cmd.run(config_path).await,
        }
    }
}
