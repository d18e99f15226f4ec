use std::fmt;
use std::time::Duration;

use alloy::primitives::B256;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Execution error: {}", execution_message(.tx_hash, .reason))]
    Execution {
        tx_hash: Option<B256>,
        reason: Option<String>,
    },

    #[error(
        "Timeout error: transaction {tx_hash} did not reach {confirmations} confirmation(s) within {timeout:?}; it may still be mined"
    )]
    Timeout {
        tx_hash: B256,
        confirmations: u64,
        timeout: Duration,
    },

    #[error("{}", cancelled_message(.tx_hash))]
    Cancelled { tx_hash: Option<B256> },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Revert or rejection of a creation transaction.
    pub fn execution(tx_hash: Option<B256>, reason: Option<String>) -> Self {
        Self::Execution { tx_hash, reason }
    }

    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::ArtifactNotFound(_) | Error::Serialization(_) => {
                ErrorKind::Configuration
            }
            Error::Validation(_) | Error::Abi(_) | Error::Hex(_) => ErrorKind::Validation,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Execution { .. } => ErrorKind::Execution,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Hash of the submitted transaction, if the failure happened after submission.
    ///
    /// A timed-out or cancelled deployment may still be mined; callers should
    /// check this hash before deciding to deploy again.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Error::Execution { tx_hash, .. } | Error::Cancelled { tx_hash } => *tx_hash,
            Error::Timeout { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }
}

fn execution_message(tx_hash: &Option<B256>, reason: &Option<String>) -> String {
    let reason = reason.as_deref().unwrap_or("reverted without a reason");
    match tx_hash {
        Some(hash) => format!("transaction {} failed: {}", hash, reason),
        None => format!("creation rejected before submission: {}", reason),
    }
}

fn cancelled_message(tx_hash: &Option<B256>) -> String {
    match tx_hash {
        Some(hash) => format!(
            "Deployment cancelled while waiting for {}; the transaction may still be mined",
            hash
        ),
        None => "Deployment cancelled before submission".to_string(),
    }
}

/// Coarse classification surfaced to callers and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Execution,
    Timeout,
    Transport,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Execution => "ExecutionError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
