//! Deploy a compiled contract

use std::path::Path;
use std::time::Duration;

use alloy::primitives::U256;
use clap::Args;
use color_eyre::eyre::{Report, Result};
use console::style;
use launchpad_core::{
    AlloyChainClient, DeploymentRequest, DeploymentResult, Error, FileSystemArtifactSource,
    Orchestrator,
};
use tokio_util::sync::CancellationToken;

use crate::config::ProjectConfig;

/// Deploy a compiled contract and wait for confirmation
#[derive(Args)]
pub struct DeployCommand {
    /// Contract name, or `Source.sol:Contract` when the name is ambiguous
    #[arg(long)]
    pub contract: String,

    /// Network name from launchpad.toml
    #[arg(long)]
    pub network: String,

    /// Constructor argument, repeat in declaration order. Arrays and tuples as JSON
    #[arg(long = "arg", value_name = "VALUE")]
    pub args: Vec<String>,

    /// Blocks to wait on top of the inclusion block
    #[arg(long)]
    pub confirmations: Option<u64>,

    /// Seconds to wait for confirmation
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Wei sent to a payable constructor (decimal or 0x-hex)
    #[arg(long, value_name = "WEI")]
    pub value: Option<U256>,

    /// Print the full result as JSON instead of the address
    #[arg(long)]
    pub json: bool,
}

impl DeployCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;
        let request = self.request(&config)?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let artifacts = FileSystemArtifactSource::new(config.artifacts_dir(base));
        let explorer_url = request.profile.explorer_url.clone();

        eprintln!(
            "{} Deploying {} to {}...",
            style("→").blue(),
            style(&request.contract).cyan(),
            style(&request.profile.name).cyan()
        );

        let orchestrator = Orchestrator::new(AlloyChainClient::new(), artifacts);

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let outcome = orchestrator.deploy_until_cancelled(request, &cancel).await;
        interrupt.abort();

        match outcome {
            Ok(result) => {
                self.report(&result, explorer_url.as_deref())?;
                Ok(())
            }
            Err(e) => {
                if let Some(tx_hash) = e.tx_hash() {
                    if matches!(e, Error::Timeout { .. } | Error::Cancelled { .. }) {
                        eprintln!(
                            "{} Transaction {} was submitted and may still be mined. Check it before deploying again.",
                            style("⚠").yellow(),
                            style(tx_hash).yellow()
                        );
                    }
                }
                let kind = e.kind();
                Err(Report::new(e).wrap_err(kind.as_str()))
            }
        }
    }

    fn request(&self, config: &ProjectConfig) -> Result<DeploymentRequest> {
        let profile = config.resolve_profile(&self.network)?;
        let confirmations = self.confirmations.unwrap_or(config.deploy.confirmations);
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.deploy.timeout());

        let mut request = DeploymentRequest::new(&self.contract, profile)
            .with_args(self.args.iter().map(|a| parse_arg(a)))
            .with_confirmations(confirmations)
            .with_timeout(timeout);
        if let Some(value) = self.value {
            request = request.with_value(value);
        }
        Ok(request)
    }

    fn report(&self, result: &DeploymentResult, explorer_url: Option<&str>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            println!("{}", result.address);
        }

        eprintln!(
            "{} {} deployed at {}",
            style("✓").green(),
            style(&result.contract).cyan(),
            style(result.address).yellow()
        );
        eprintln!("   Transaction: {}", result.tx_hash);
        eprintln!(
            "   Block: {} (chain {}), gas used: {}",
            result.block_number, result.chain_id, result.gas_used
        );
        if let Some(explorer) = explorer_url {
            eprintln!(
                "   Explorer: {}/address/{}",
                explorer.trim_end_matches('/'),
                result.address
            );
        }
        Ok(())
    }
}

/// Command-line arguments are strings unless they look like JSON arrays or
/// objects; scalars are coerced against the constructor's parameter types.
fn parse_arg(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    serde_json::Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        deploy: DeployCommand,
    }

    fn config() -> ProjectConfig {
        toml::from_str(
            r#"
[deploy]
confirmations = 2
timeout_secs = 30

[networks.hardhat]
url = "http://127.0.0.1:8545"
chain_id = 31337
accounts = ["0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("1000"), json!("1000"));
        assert_eq!(parse_arg("0xdead"), json!("0xdead"));
        assert_eq!(parse_arg("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_arg("[unclosed"), json!("[unclosed"));
    }

    #[test]
    fn test_flags_build_request() {
        let cli = TestCli::parse_from([
            "launchpad",
            "--contract",
            "CampaignFactory",
            "--network",
            "hardhat",
            "--arg",
            "1000",
            "--arg",
            "0x000000000000000000000000000000000000dEaD",
            "--confirmations",
            "1",
            "--value",
            "42",
        ]);

        let request = cli.deploy.request(&config()).unwrap();
        assert_eq!(request.contract, "CampaignFactory");
        assert_eq!(request.args.len(), 2);
        assert_eq!(request.confirmations, 1);
        assert_eq!(request.timeout, Duration::from_secs(30));
        assert_eq!(request.value, Some(U256::from(42)));
        assert_eq!(request.profile.chain_id, Some(31337));
        assert!(request.profile.credential.is_some());
    }

    #[test]
    fn test_config_defaults_apply() {
        let cli = TestCli::parse_from([
            "launchpad",
            "--contract",
            "FactoryContract",
            "--network",
            "hardhat",
        ]);

        let request = cli.deploy.request(&config()).unwrap();
        assert!(request.args.is_empty());
        assert_eq!(request.confirmations, 2);
        assert!(request.value.is_none());
    }

    #[test]
    fn test_unknown_network() {
        let cli = TestCli::parse_from([
            "launchpad",
            "--contract",
            "FactoryContract",
            "--network",
            "mainnet",
        ]);
        assert!(cli.deploy.request(&config()).is_err());
    }
}
