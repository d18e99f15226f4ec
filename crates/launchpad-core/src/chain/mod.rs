//! Chain access for deployments
//!
//! The orchestrator talks to a network only through [`ChainClient`]. Signing,
//! nonce management and RPC transport live behind it; the default
//! implementation is [`AlloyChainClient`], an alloy HTTP provider.

mod http;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::bytecode::Bytecode;
use crate::error::{Error, Result};
use crate::types::{NetworkProfile, Url};

pub use http::AlloyChainClient;

// =============================================================================
// Types
// =============================================================================

/// Local signer bound to the endpoint of the profile it was resolved from
#[derive(Clone)]
pub struct DeploySigner {
    signer: PrivateKeySigner,
    rpc_url: Url,
}

impl DeploySigner {
    pub fn new(signer: PrivateKeySigner, rpc_url: Url) -> Self {
        Self { signer, rpc_url }
    }

    /// Resolve the profile's credential into a signer
    pub fn from_profile(profile: &NetworkProfile) -> Result<Self> {
        let credential = profile.credential.as_ref().ok_or_else(|| {
            Error::config(format!(
                "No account credential configured for network '{}'",
                profile.name
            ))
        })?;

        let signer: PrivateKeySigner = credential.expose().parse().map_err(|_| {
            Error::config(format!(
                "Invalid private key configured for network '{}'",
                profile.name
            ))
        })?;

        Ok(Self::new(signer, profile.rpc_url.clone()))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn inner(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl fmt::Debug for DeploySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploySigner")
            .field("address", &self.address())
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}

/// Handle to a submitted creation transaction
#[derive(Debug, Clone)]
pub struct PendingDeployment {
    pub tx_hash: B256,
    pub deployer: Address,
    pub rpc_url: Url,
    /// Creation bytecode followed by the encoded constructor arguments
    pub init_code: Bytes,
    pub value: Option<U256>,
}

/// Receipt of a mined creation transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    pub success: bool,
    pub revert_reason: Option<String>,
}

// =============================================================================
// Trait Definition
// =============================================================================

/// Interface to a blockchain network used by the orchestrator.
///
/// Implementations must serialize nonce assignment per account if they are
/// shared between concurrent deployments.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id reported by the endpoint. Fails with a transport error when
    /// the endpoint cannot be reached.
    async fn chain_id(&self, rpc_url: &Url) -> Result<u64>;

    /// Signer for the profile's configured account
    async fn get_signer(&self, profile: &NetworkProfile) -> Result<DeploySigner> {
        DeploySigner::from_profile(profile)
    }

    /// Sign and broadcast a contract creation transaction.
    ///
    /// `encoded_args` is appended to `bytecode` to form the init code.
    async fn send_contract_creation(
        &self,
        bytecode: &Bytecode,
        encoded_args: &[u8],
        value: Option<U256>,
        signer: &DeploySigner,
    ) -> Result<PendingDeployment>;

    /// Wait until `confirmations` blocks are built on top of the block that
    /// includes the transaction, or `timeout` elapses.
    async fn wait_for_confirmations(
        &self,
        pending: &PendingDeployment,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<DeploymentReceipt>;
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for Arc<T> {
    async fn chain_id(&self, rpc_url: &Url) -> Result<u64> {
        (**self).chain_id(rpc_url).await
    }

    async fn get_signer(&self, profile: &NetworkProfile) -> Result<DeploySigner> {
        (**self).get_signer(profile).await
    }

    async fn send_contract_creation(
        &self,
        bytecode: &Bytecode,
        encoded_args: &[u8],
        value: Option<U256>,
        signer: &DeploySigner,
    ) -> Result<PendingDeployment> {
        (**self)
            .send_contract_creation(bytecode, encoded_args, value, signer)
            .await
    }

    async fn wait_for_confirmations(
        &self,
        pending: &PendingDeployment,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<DeploymentReceipt> {
        (**self)
            .wait_for_confirmations(pending, confirmations, timeout)
            .await
    }
}
