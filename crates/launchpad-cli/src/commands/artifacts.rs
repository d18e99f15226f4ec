//! List deployable artifacts

use std::path::Path;

use clap::Args;
use color_eyre::eyre::Result;
use console::style;
use launchpad_core::FileSystemArtifactSource;

use crate::config::ProjectConfig;

/// List deployable artifacts
#[derive(Args)]
pub struct ArtifactsCommand {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl ArtifactsCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load_from(config_path)?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let source = FileSystemArtifactSource::new(config.artifacts_dir(base));

        if !source.root().is_dir() {
            println!(
                "No artifacts found at {}. Compile the project first.",
                style(source.root().display()).yellow()
            );
            return Ok(());
        }

        let artifacts = source.list()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&artifacts)?);
            return Ok(());
        }

        if artifacts.is_empty() {
            println!("No deployable artifacts found.");
            return Ok(());
        }

        println!(
            "{:<30} {:<30} {:<10} {}",
            "Contract", "Source", "Size", "Constructor"
        );
        println!("{}", "-".repeat(110));

        for a in &artifacts {
            println!(
                "{:<30} {:<30} {:<10} {}",
                a.name, a.source, a.bytecode_size, a.signature
            );
        }

        println!();
        println!("Total: {} artifact(s)", artifacts.len());

        Ok(())
    }
}
