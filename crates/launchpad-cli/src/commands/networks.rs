//! List configured networks

use std::path::Path;

use clap::Args;
use color_eyre::eyre::Result;
use console::style;

use crate::config::ProjectConfig;
use crate::rpc::get_chain_id;

/// List configured networks
#[derive(Args)]
pub struct NetworksCommand {
    /// Query each endpoint for its chain id
    #[arg(long)]
    pub check: bool,
}

impl NetworksCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;

        if config.networks.is_empty() {
            println!("No networks configured.");
            println!(
                "Add one under {} in {}.",
                style("[networks.<name>]").cyan(),
                config_path.display()
            );
            return Ok(());
        }

        println!(
            "{:<20} {:<12} {:<10} {:<10} {:<50}",
            "Network", "Chain ID", "Accounts", "API Key", "URL"
        );
        println!("{}", "-".repeat(105));

        // Print the URL as written so embedded API keys stay in the environment
        for (name, entry) in &config.networks {
            let chain_id = entry
                .chain_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let api_key = if config.etherscan.contains_key(name) {
                "yes"
            } else {
                "no"
            };
            println!(
                "{:<20} {:<12} {:<10} {:<10} {:<50}",
                name,
                chain_id,
                entry.accounts.len(),
                api_key,
                entry.url
            );

            if self.check {
                check_network(&config, name).await;
            }
        }

        Ok(())
    }
}

async fn check_network(config: &ProjectConfig, name: &str) {
    let network = match config.get_network(name) {
        Ok(network) => network,
        Err(e) => {
            println!("  {} {}", style("✗").red(), e);
            return;
        }
    };

    match get_chain_id(&network.rpc_url).await {
        Ok(actual) if network.chain_id.is_some_and(|expected| expected != actual) => println!(
            "  {} endpoint reports chain id {}",
            style("✗").red(),
            actual
        ),
        Ok(actual) => println!("  {} reachable (chain id {})", style("✓").green(), actual),
        Err(e) => println!("  {} {}", style("✗").red(), e),
    }
}
