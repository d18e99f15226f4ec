use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use launchpad_core::{Credential, Error, NetworkProfile, Result, Url};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "launchpad.toml";

/// Project configuration file structure (launchpad.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub deploy: DeployDefaults,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
    /// Explorer API keys by network name
    #[serde(default)]
    pub etherscan: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            artifacts: default_artifacts(),
        }
    }
}

fn default_artifacts() -> PathBuf {
    PathBuf::from("artifacts")
}

/// Compiler settings the artifacts were built with. Reported, never acted on.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompilerConfig {
    pub version: Option<String>,
    pub evm_version: Option<String>,
    #[serde(default)]
    pub via_ir: bool,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: default_runs(),
        }
    }
}

fn default_runs() -> u32 {
    200
}

/// Defaults applied to `deploy` when flags are omitted
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeployDefaults {
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeployDefaults {
    fn default() -> Self {
        Self {
            confirmations: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    launchpad_core::DEFAULT_TIMEOUT.as_secs()
}

impl DeployDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Network entry as written in the file, before environment resolution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkEntry {
    pub url: String,
    pub chain_id: Option<u64>,
    /// Private keys, usually `${VAR}` references
    #[serde(default)]
    pub accounts: Vec<String>,
    pub explorer_url: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            Error::config(format!(
                "Could not read {}. Run `launchpad init` to create one",
                path.display()
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid {}: {}", path.display(), e)))
    }

    /// Get all network names, sorted
    pub fn network_names(&self) -> Vec<&str> {
        self.networks.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve a network by name, expanding environment references.
    ///
    /// Account entries whose variables are unset are skipped with a warning.
    pub fn get_network(&self, name: &str) -> Result<NetworkConfig> {
        let entry = self.networks.get(name).ok_or_else(|| {
            let known = self.network_names().join(", ");
            Error::config(format!(
                "Network '{}' not found in {} [networks] (configured: {})",
                name,
                CONFIG_FILE,
                if known.is_empty() { "none" } else { &known }
            ))
        })?;

        let url = resolve_env_var(&entry.url)?;
        let rpc_url: Url = url
            .parse()
            .map_err(|e| Error::config(format!("Invalid RPC URL for network '{}': {}", name, e)))?;

        let mut accounts = Vec::new();
        for account in &entry.accounts {
            match resolve_env_var(account) {
                Ok(key) if !key.trim().is_empty() => accounts.push(Credential::private_key(key)),
                Ok(_) => tracing::warn!(network = name, "Skipping empty account entry"),
                Err(e) => tracing::warn!(network = name, error = %e, "Skipping unresolved account"),
            }
        }

        let explorer_url = entry
            .explorer_url
            .as_deref()
            .map(resolve_env_var)
            .transpose()?;

        Ok(NetworkConfig {
            name: name.to_string(),
            rpc_url,
            chain_id: entry.chain_id,
            accounts,
            explorer_url,
        })
    }

    /// Resolve a network straight into a deployment profile
    pub fn resolve_profile(&self, name: &str) -> Result<NetworkProfile> {
        Ok(self.get_network(name)?.into_profile())
    }

    /// Artifact directory, relative paths taken from `base`
    pub fn artifacts_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.artifacts)
    }
}

/// Network configuration with environment references resolved
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: Url,
    pub chain_id: Option<u64>,
    pub accounts: Vec<Credential>,
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// Profile signing with the first configured account
    pub fn into_profile(self) -> NetworkProfile {
        let mut profile = NetworkProfile::new(self.name, self.rpc_url);
        if let Some(chain_id) = self.chain_id {
            profile = profile.with_chain_id(chain_id);
        }
        if let Some(credential) = self.accounts.into_iter().next() {
            profile = profile.with_credential(credential);
        }
        if let Some(explorer_url) = self.explorer_url {
            profile = profile.with_explorer_url(explorer_url);
        }
        profile
    }
}

/// Resolve environment variable references in a string.
///
/// Supports `${VAR_NAME}` and `${VAR_NAME:-default}` anywhere in the value.
pub fn resolve_env_var(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::config(format!("Unterminated '${{' in '{}'", value)))?;

        let reference = &after[..end];
        let (var_name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };

        match (std::env::var(var_name), default) {
            (Ok(v), _) if !v.is_empty() => out.push_str(&v),
            (_, Some(default)) => out.push_str(default),
            (Ok(v), None) => out.push_str(&v),
            (Err(_), None) => {
                return Err(Error::config(format!(
                    "Environment variable '{}' not set",
                    var_name
                )))
            }
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Starter configuration written by `launchpad init`
pub const TEMPLATE: &str = r#"[paths]
artifacts = "artifacts"

[compiler]
version = "0.8.23"
evm_version = "paris"
via_ir = true
optimizer = { enabled = true, runs = 999999 }

[deploy]
confirmations = 0
timeout_secs = 300

[networks.hardhat]
url = "http://127.0.0.1:8545"
chain_id = 31337
accounts = ["${PRIVATE_KEY:-0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80}"]

[networks.sepolia]
url = "${ETH_SEPOLIA_TESTNET_URL:-https://rpc.sepolia.org}"
chain_id = 11155111
accounts = ["${PRIVATE_KEY}"]
explorer_url = "https://sepolia.etherscan.io"

[networks.arbitrumSepolia]
url = "https://sepolia-rollup.arbitrum.io/rpc"
chain_id = 421614
accounts = ["${PRIVATE_KEY}"]
explorer_url = "https://sepolia.arbiscan.io"

[etherscan]
sepolia = "${ETHERSCAN_API_KEY:-}"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::ErrorKind;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_project_config() {
        let toml_content = r#"
[paths]
artifacts = "out"

[compiler]
version = "0.8.23"
evm_version = "paris"
via_ir = true
optimizer = { enabled = true, runs = 999999 }

[deploy]
confirmations = 2
timeout_secs = 60

[networks.mainnet]
url = "https://eth.llamarpc.com"
chain_id = 1

[etherscan]
mainnet = "${ETHERSCAN_API_KEY}"
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.paths.artifacts, PathBuf::from("out"));
        assert_eq!(config.compiler.evm_version.as_deref(), Some("paris"));
        assert!(config.compiler.via_ir);
        assert_eq!(config.compiler.optimizer.runs, 999_999);
        assert_eq!(config.deploy.confirmations, 2);
        assert_eq!(config.deploy.timeout(), Duration::from_secs(60));
        assert_eq!(config.networks["mainnet"].chain_id, Some(1));
        assert!(config.etherscan.contains_key("mainnet"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();

        assert!(config.networks.is_empty());
        assert_eq!(config.paths.artifacts, PathBuf::from("artifacts"));
        assert_eq!(config.deploy.confirmations, 0);
        assert_eq!(config.deploy.timeout_secs, 300);
        assert!(config.compiler.evm_version.is_none());
    }

    #[test]
    fn test_template_parses() {
        let config: ProjectConfig = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(config.network_names(), vec!["arbitrumSepolia", "hardhat", "sepolia"]);
        assert_eq!(config.networks["hardhat"].chain_id, Some(31337));
    }

    #[test]
    fn test_get_network_resolves_env() {
        std::env::set_var("LAUNCHPAD_TEST_RPC_URL", "https://rpc.test.xyz");
        std::env::set_var("LAUNCHPAD_TEST_KEY", DEV_KEY);

        let toml_content = r#"
[networks.testnet]
url = "${LAUNCHPAD_TEST_RPC_URL}"
chain_id = 5
accounts = ["${LAUNCHPAD_TEST_KEY}"]
explorer_url = "https://explorer.test.xyz"
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();
        let network = config.get_network("testnet").unwrap();

        assert_eq!(network.name, "testnet");
        assert_eq!(network.rpc_url.as_str(), "https://rpc.test.xyz/");
        assert_eq!(network.accounts.len(), 1);
        assert_eq!(
            network.explorer_url,
            Some("https://explorer.test.xyz".to_string())
        );

        let profile = network.into_profile();
        assert_eq!(profile.chain_id, Some(5));
        assert_eq!(profile.credential.unwrap().expose(), DEV_KEY);

        std::env::remove_var("LAUNCHPAD_TEST_RPC_URL");
        std::env::remove_var("LAUNCHPAD_TEST_KEY");
    }

    #[test]
    fn test_unresolved_account_is_skipped() {
        let toml_content = r#"
[networks.local]
url = "http://localhost:8545"
accounts = ["${LAUNCHPAD_UNSET_KEY_99999}"]
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();
        let profile = config.resolve_profile("local").unwrap();

        assert!(profile.credential.is_none());
        assert!(profile.chain_id.is_none());
    }

    #[test]
    fn test_get_network_not_found() {
        let toml_content = r#"
[networks.mainnet]
url = "https://eth.rpc"
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();
        let err = config.get_network("nonexistent").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("mainnet"));
    }

    #[test]
    fn test_invalid_url() {
        let toml_content = r#"
[networks.broken]
url = "not a url"
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();
        assert!(config.get_network("broken").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, TEMPLATE).unwrap();

        let config = ProjectConfig::load_from(&path).unwrap();
        assert_eq!(
            config.artifacts_dir(dir.path()),
            dir.path().join("artifacts")
        );

        let err = ProjectConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_resolve_env_var() {
        std::env::set_var("LAUNCHPAD_TEST_VAR_123", "resolved_value");

        let result = resolve_env_var("${LAUNCHPAD_TEST_VAR_123}").unwrap();
        assert_eq!(result, "resolved_value");

        let result = resolve_env_var("https://rpc.xyz/v2/${LAUNCHPAD_TEST_VAR_123}").unwrap();
        assert_eq!(result, "https://rpc.xyz/v2/resolved_value");

        std::env::remove_var("LAUNCHPAD_TEST_VAR_123");
    }

    #[test]
    fn test_resolve_env_var_default() {
        let result = resolve_env_var("${LAUNCHPAD_NONEXISTENT_VAR:-https://rpc.ankr.com/eth}").unwrap();
        assert_eq!(result, "https://rpc.ankr.com/eth");

        let result = resolve_env_var("${LAUNCHPAD_NONEXISTENT_VAR:-}").unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_resolve_env_var_literal() {
        let result = resolve_env_var("https://literal.url").unwrap();
        assert_eq!(result, "https://literal.url");
    }

    #[test]
    fn test_resolve_env_var_missing() {
        let err = resolve_env_var("${NONEXISTENT_VAR_99999}").unwrap_err();
        assert!(err.to_string().contains("NONEXISTENT_VAR_99999"));

        assert!(resolve_env_var("${UNTERMINATED").is_err());
    }
}
