use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Re-export alloy types for convenience
pub use alloy::primitives::{Address, B256, U256};
pub use alloy::transports::http::reqwest::Url;

/// Default deadline for reaching the requested confirmation depth
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// =============================================================================
// Domain Enums
// =============================================================================

/// Lifecycle of a submitted creation transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Confirmed,
    Reverted,
    TimedOut,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Confirmed => "confirmed",
            DeploymentStatus::Reverted => "reverted",
            DeploymentStatus::TimedOut => "timedout",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State mutability of a constructor or function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Returns true if this can receive ETH
    pub fn is_payable(&self) -> bool {
        matches!(self, StateMutability::Payable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }
}

// =============================================================================
// Network Profile
// =============================================================================

/// A resolved private key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a hex private key, adding the 0x prefix if missing
    pub fn private_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let key = key.trim();
        if key.starts_with("0x") {
            Self(key.to_string())
        } else {
            Self(format!("0x{}", key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Everything needed to reach and sign for one network.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub name: String,
    /// Expected chain id. When set, the endpoint must report the same id.
    pub chain_id: Option<u64>,
    pub rpc_url: Url,
    pub credential: Option<Credential>,
    pub explorer_url: Option<String>,
}

impl NetworkProfile {
    pub fn new(name: impl Into<String>, rpc_url: Url) -> Self {
        Self {
            name: name.into(),
            chain_id: None,
            rpc_url,
            credential: None,
            explorer_url: None,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }
}

// =============================================================================
// Request / Result
// =============================================================================

/// A single deployment, consumed by one `deploy` call
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub contract: String,
    /// Constructor arguments in ABI order
    pub args: Vec<serde_json::Value>,
    pub profile: NetworkProfile,
    /// Blocks required on top of the inclusion block
    pub confirmations: u64,
    pub timeout: Duration,
    /// Wei sent along with the creation (payable constructors only)
    pub value: Option<U256>,
}

impl DeploymentRequest {
    pub fn new(contract: impl Into<String>, profile: NetworkProfile) -> Self {
        Self {
            contract: contract.into(),
            args: Vec::new(),
            profile,
            confirmations: 0,
            timeout: DEFAULT_TIMEOUT,
            value: None,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<serde_json::Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Outcome of a confirmed deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentResult {
    pub contract: String,
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub deployer: Address,
    pub chain_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> NetworkProfile {
        NetworkProfile::new("localhost", "http://127.0.0.1:8545".parse().unwrap())
    }

    #[test]
    fn test_credential_prefix() {
        assert_eq!(Credential::private_key("abcd").expose(), "0xabcd");
        assert_eq!(Credential::private_key("0xabcd").expose(), "0xabcd");
        assert_eq!(Credential::private_key(" 0xabcd\n").expose(), "0xabcd");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let profile = local().with_credential(Credential::private_key("0xdeadbeef"));
        let debug = format!("{:?}", profile);
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_request_defaults() {
        let request = DeploymentRequest::new("FactoryContract", local());
        assert!(request.args.is_empty());
        assert_eq!(request.confirmations, 0);
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
        assert!(request.value.is_none());
    }

    #[test]
    fn test_request_builder_keeps_arg_order() {
        let request = DeploymentRequest::new("Token", local())
            .with_arg("Name")
            .with_args(["SYM", "18"])
            .with_confirmations(2)
            .with_value(U256::from(5));

        assert_eq!(
            request.args,
            vec![
                serde_json::json!("Name"),
                serde_json::json!("SYM"),
                serde_json::json!("18")
            ]
        );
        assert_eq!(request.confirmations, 2);
        assert_eq!(request.value, Some(U256::from(5)));
    }

    #[test]
    fn test_status() {
        assert_eq!(DeploymentStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(DeploymentStatus::TimedOut.to_string(), "timedout");
    }
}
