//! Print configured accounts and their balances

use std::path::Path;

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use clap::Args;
use color_eyre::eyre::{eyre, Result};
use console::style;

use crate::config::{NetworkConfig, ProjectConfig};
use crate::rpc::get_balances;

/// Print the accounts configured for a network
#[derive(Args)]
pub struct AccountsCommand {
    /// Network name from launchpad.toml
    #[arg(long)]
    pub network: String,
}

impl AccountsCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;
        let network = config.get_network(&self.network)?;

        let addresses = addresses(&network)?;
        if addresses.is_empty() {
            print_no_accounts(&network.name);
        }
        for address in addresses {
            println!("{}", address);
        }
        Ok(())
    }
}

/// Print the accounts configured for a network and their balances
#[derive(Args)]
pub struct BalancesCommand {
    /// Network name from launchpad.toml
    #[arg(long)]
    pub network: String,

    /// Print balances in ether instead of wei
    #[arg(long)]
    pub ether: bool,
}

impl BalancesCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;
        let network = config.get_network(&self.network)?;

        let addresses = addresses(&network)?;
        if addresses.is_empty() {
            print_no_accounts(&network.name);
            return Ok(());
        }

        for (address, balance) in get_balances(&network.rpc_url, &addresses).await? {
            if self.ether {
                println!("{} {}", address, format_ether(balance));
            } else {
                println!("{} {}", address, balance);
            }
        }
        Ok(())
    }
}

/// Addresses of the network's resolved accounts, in configuration order
fn addresses(network: &NetworkConfig) -> Result<Vec<Address>> {
    network
        .accounts
        .iter()
        .enumerate()
        .map(|(i, credential)| {
            credential
                .expose()
                .parse::<PrivateKeySigner>()
                .map(|signer| signer.address())
                .map_err(|_| {
                    eyre!(
                        "Account #{} of network '{}' is not a valid private key",
                        i,
                        network.name
                    )
                })
        })
        .collect()
}

fn print_no_accounts(network: &str) {
    eprintln!(
        "{} No accounts resolved for {}. Check the variables referenced in {}",
        style("!").yellow(),
        style(network).cyan(),
        style("accounts").cyan()
    );
}
