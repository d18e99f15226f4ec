//! Print the configured EVM version

use std::path::Path;

use clap::Args;
use color_eyre::eyre::Result;

use crate::config::{CompilerConfig, ProjectConfig};

/// Print the configured EVM version
#[derive(Args)]
pub struct EvmCommand {
    /// Also print the other compiler settings
    #[arg(long)]
    pub all: bool,
}

impl EvmCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;
        for line in render(&config.compiler, self.all) {
            println!("{}", line);
        }
        Ok(())
    }
}

fn render(compiler: &CompilerConfig, all: bool) -> Vec<String> {
    let evm_version = compiler.evm_version.as_deref().unwrap_or("default");
    if !all {
        return vec![evm_version.to_string()];
    }

    vec![
        format!("evm_version: {}", evm_version),
        format!(
            "version: {}",
            compiler.version.as_deref().unwrap_or("unspecified")
        ),
        format!("via_ir: {}", compiler.via_ir),
        format!(
            "optimizer: {} ({} runs)",
            if compiler.optimizer.enabled { "enabled" } else { "disabled" },
            compiler.optimizer.runs
        ),
    ]
}
