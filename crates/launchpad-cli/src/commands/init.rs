//! Initialize launchpad in a project

use std::path::Path;

use clap::Args;
use color_eyre::eyre::{eyre, Result};
use console::style;
use dialoguer::Confirm;

use crate::config::TEMPLATE;

const ENV_FILE: &str = ".env";

/// Write a starter launchpad.toml
#[derive(Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration without asking
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub async fn run(self, config_path: &Path) -> Result<()> {
        if config_path.exists() && !self.force {
            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "{} already exists. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                return Err(eyre!(
                    "Launchpad is already initialized in this project ({} exists)",
                    config_path.display()
                ));
            }
        }

        std::fs::write(config_path, TEMPLATE)?;
        eprintln!(
            "{} Created {}",
            style("✓").green(),
            config_path.display()
        );

        let project_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        if add_to_gitignore(&project_dir.join(".gitignore"))? {
            eprintln!("{} Added {} to .gitignore", style("✓").green(), ENV_FILE);
        }

        eprintln!();
        eprintln!("Next steps:");
        eprintln!(
            "  1. Set {} in your environment or .env",
            style("PRIVATE_KEY").cyan()
        );
        eprintln!(
            "  2. Run {} to deploy a contract",
            style("launchpad deploy --contract <name> --network <name>").cyan()
        );

        Ok(())
    }
}

/// Keep private keys out of version control. Returns whether the file changed.
fn add_to_gitignore(gitignore_path: &Path) -> Result<bool> {
    if !gitignore_path.exists() {
        return Ok(false);
    }

    let content = std::fs::read_to_string(gitignore_path)?;
    let has_entry = content.lines().any(|line| line.trim() == ENV_FILE);
    if has_entry {
        return Ok(false);
    }

    let mut new_content = content;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(ENV_FILE);
    new_content.push('\n');
    std::fs::write(gitignore_path, new_content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpad.toml");

        InitCommand { force: false }.run(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, TEMPLATE);
    }

    #[tokio::test]
    async fn test_init_updates_gitignore_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("sub");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join(".gitignore"), "target\n").unwrap();

        InitCommand { force: false }
            .run(&project.join("launchpad.toml"))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(project.join(".gitignore")).unwrap(),
            "target\n.env\n"
        );
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpad.toml");
        std::fs::write(&path, "stale").unwrap();

        InitCommand { force: true }.run(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn test_add_to_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");

        assert!(!add_to_gitignore(&path).unwrap());

        std::fs::write(&path, "target").unwrap();
        assert!(add_to_gitignore(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "target\n.env\n");

        assert!(!add_to_gitignore(&path).unwrap());
    }
}
