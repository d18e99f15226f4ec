//! Deployment orchestration
//!
//! [`Orchestrator`] turns a [`DeploymentRequest`] into a confirmed
//! [`DeploymentResult`]:
//!
//! 1. load the artifact and encode the constructor arguments
//! 2. check the endpoint's chain id against the profile
//! 3. resolve a signer and submit the creation transaction
//! 4. wait for the requested confirmation depth, bounded by the request timeout
//!
//! Every call submits a new transaction. Nothing is retried: a timed-out or
//! cancelled deployment reports its transaction hash and leaves the decision
//! to resubmit to the caller.

use tokio_util::sync::CancellationToken;

use crate::artifact::{ArtifactSource, ContractArtifact};
use crate::bytecode::MAX_INIT_CODE_SIZE;
use crate::chain::{ChainClient, DeploymentReceipt};
use crate::error::{Error, Result};
use crate::types::{Address, DeploymentRequest, DeploymentResult, DeploymentStatus, NetworkProfile};

/// Validated artifact and encoded constructor arguments
struct Prepared {
    artifact: ContractArtifact,
    encoded_args: Vec<u8>,
}

/// Deploys contracts through a [`ChainClient`] using artifacts from an
/// [`ArtifactSource`].
#[derive(Debug, Clone)]
pub struct Orchestrator<C, A> {
    client: C,
    artifacts: A,
}

impl<C: ChainClient, A: ArtifactSource> Orchestrator<C, A> {
    pub fn new(client: C, artifacts: A) -> Self {
        Self { client, artifacts }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// Deploy a contract and wait for confirmation
    pub async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentResult> {
        self.deploy_until_cancelled(request, &CancellationToken::new())
            .await
    }

    /// Deploy a contract, abandoning the wait when `cancel` fires.
    ///
    /// Cancellation before submission returns `Cancelled` without a hash.
    /// Once the transaction is broadcast the submission itself is not
    /// interrupted; a later cancellation returns `Cancelled` with the hash of
    /// a transaction that may still be mined.
    #[tracing::instrument(
        name = "deploy",
        skip_all,
        fields(contract = %request.contract, network = %request.profile.name)
    )]
    pub async fn deploy_until_cancelled(
        &self,
        request: DeploymentRequest,
        cancel: &CancellationToken,
    ) -> Result<DeploymentResult> {
        let prepared = self.prepare(&request)?;

        let chain_id = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled { tx_hash: None }),
            chain_id = self.client.chain_id(&request.profile.rpc_url) => chain_id?,
        };
        verify_chain_id(&request.profile, chain_id)?;

        let signer = self.client.get_signer(&request.profile).await?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled { tx_hash: None });
        }

        tracing::info!(
            deployer = %signer.address(),
            chain_id,
            args = request.args.len(),
            "Submitting contract creation"
        );

        let pending = self
            .client
            .send_contract_creation(
                &prepared.artifact.bytecode,
                &prepared.encoded_args,
                request.value,
                &signer,
            )
            .await?;
        let tx_hash = pending.tx_hash;

        tracing::info!(
            %tx_hash,
            status = %DeploymentStatus::Pending,
            confirmations = request.confirmations,
            timeout = ?request.timeout,
            "Waiting for confirmation"
        );

        let wait = tokio::time::timeout(
            request.timeout,
            self.client
                .wait_for_confirmations(&pending, request.confirmations, request.timeout),
        );

        let receipt = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(%tx_hash, "Cancelled while waiting; transaction may still be mined");
                return Err(Error::Cancelled { tx_hash: Some(tx_hash) });
            }
            waited = wait => match waited {
                Ok(Ok(receipt)) => receipt,
                Ok(Err(e)) => {
                    if matches!(e, Error::Timeout { .. }) {
                        tracing::warn!(%tx_hash, status = %DeploymentStatus::TimedOut, "Confirmation deadline elapsed");
                    }
                    return Err(e);
                }
                Err(_) => {
                    tracing::warn!(%tx_hash, status = %DeploymentStatus::TimedOut, "Confirmation deadline elapsed");
                    return Err(Error::Timeout {
                        tx_hash,
                        confirmations: request.confirmations,
                        timeout: request.timeout,
                    });
                }
            },
        };

        into_result(request.contract, chain_id, signer.address(), receipt)
    }

    /// Deploy several contracts one after another, stopping at the first failure
    pub async fn deploy_all(
        &self,
        requests: impl IntoIterator<Item = DeploymentRequest>,
    ) -> Result<Vec<DeploymentResult>> {
        let mut results = Vec::new();
        for request in requests {
            results.push(self.deploy(request).await?);
        }
        Ok(results)
    }

    /// Load the artifact and validate everything that can be checked offline
    fn prepare(&self, request: &DeploymentRequest) -> Result<Prepared> {
        let artifact = self.artifacts.load_artifact(&request.contract)?;

        if !artifact.is_deployable() {
            return Err(Error::validation(format!(
                "Artifact '{}' has no bytecode (may be an interface or abstract contract)",
                request.contract
            )));
        }

        let encoded_args = artifact.abi.encode_constructor_args(&request.args)?;

        if request.value.is_some_and(|v| !v.is_zero()) && !artifact.abi.is_constructor_payable() {
            return Err(Error::validation(format!(
                "Cannot send value to '{}': constructor is not payable",
                request.contract
            )));
        }

        let init_code_size = artifact.bytecode.len() + encoded_args.len();
        if init_code_size > MAX_INIT_CODE_SIZE {
            tracing::warn!(
                init_code_size,
                limit = MAX_INIT_CODE_SIZE,
                "Init code exceeds the EIP-3860 limit; the network may reject it"
            );
        }

        Ok(Prepared {
            artifact,
            encoded_args,
        })
    }
}

fn verify_chain_id(profile: &NetworkProfile, actual: u64) -> Result<()> {
    match profile.chain_id {
        Some(expected) if expected != actual => Err(Error::config(format!(
            "Network '{}' expects chain id {} but {} reports {}",
            profile.name, expected, profile.rpc_url, actual
        ))),
        Some(_) => Ok(()),
        None => {
            tracing::debug!(chain_id = actual, "No chain id configured, using endpoint's");
            Ok(())
        }
    }
}

fn into_result(
    contract: String,
    chain_id: u64,
    deployer: Address,
    receipt: DeploymentReceipt,
) -> Result<DeploymentResult> {
    if !receipt.success {
        tracing::warn!(
            tx_hash = %receipt.tx_hash,
            status = %DeploymentStatus::Reverted,
            reason = receipt.revert_reason.as_deref().unwrap_or("unknown"),
            "Creation reverted"
        );
        return Err(Error::execution(
            Some(receipt.tx_hash),
            receipt.revert_reason,
        ));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        Error::execution(
            Some(receipt.tx_hash),
            Some("receipt carries no contract address".to_string()),
        )
    })?;

    tracing::info!(
        %address,
        tx_hash = %receipt.tx_hash,
        block = receipt.block_number,
        gas_used = receipt.gas_used,
        status = %DeploymentStatus::Confirmed,
        "Contract deployed"
    );

    Ok(DeploymentResult {
        contract,
        address,
        tx_hash: receipt.tx_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        deployer,
        chain_id,
    })
}
