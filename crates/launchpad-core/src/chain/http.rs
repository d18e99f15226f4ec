//! Alloy HTTP implementation of [`ChainClient`]

use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::eips::BlockId;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{
    PendingTransactionConfig, PendingTransactionError, Provider, ProviderBuilder, WatchTxError,
};
use alloy::rpc::json_rpc::ErrorPayload;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol_types::decode_revert_reason;
use alloy::transports::TransportError;
use async_trait::async_trait;

use super::{ChainClient, DeploySigner, DeploymentReceipt, PendingDeployment};
use crate::bytecode::Bytecode;
use crate::error::{Error, Result};
use crate::types::Url;

/// Chain client backed by alloy's HTTP provider.
///
/// Stateless: a provider is built per call from the URL carried by the signer
/// or the pending deployment. Nonce, gas and chain id are filled by alloy's
/// recommended fillers.
#[derive(Debug, Clone, Default)]
pub struct AlloyChainClient;

impl AlloyChainClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn chain_id(&self, rpc_url: &Url) -> Result<u64> {
        let provider = ProviderBuilder::new().connect_http(rpc_url.clone());
        provider
            .get_chain_id()
            .await
            .map_err(|e| Error::transport(format!("Failed to reach {}: {}", rpc_url, e)))
    }

    async fn send_contract_creation(
        &self,
        bytecode: &Bytecode,
        encoded_args: &[u8],
        value: Option<U256>,
        signer: &DeploySigner,
    ) -> Result<PendingDeployment> {
        let init_code = bytecode.init_code(encoded_args);
        let wallet = EthereumWallet::from(signer.inner().clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(signer.rpc_url().clone());

        let tx = creation_request(signer.address(), &init_code, value);

        tracing::debug!(
            deployer = %signer.address(),
            init_code_len = init_code.len(),
            ?value,
            "Sending contract creation"
        );

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(classify_send_error)?;

        Ok(PendingDeployment {
            tx_hash: *pending.tx_hash(),
            deployer: signer.address(),
            rpc_url: signer.rpc_url().clone(),
            init_code,
            value,
        })
    }

    async fn wait_for_confirmations(
        &self,
        pending: &PendingDeployment,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<DeploymentReceipt> {
        let provider = ProviderBuilder::new().connect_http(pending.rpc_url.clone());

        // alloy counts the inclusion block as the first confirmation
        let config = PendingTransactionConfig::new(pending.tx_hash)
            .with_required_confirmations(confirmations + 1)
            .with_timeout(Some(timeout));

        let watcher = provider
            .watch_pending_transaction(config)
            .await
            .map_err(|e| Error::transport(format!("Failed to watch transaction: {}", e)))?;

        match watcher.await {
            Ok(_) => {}
            Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout)) => {
                return Err(Error::Timeout {
                    tx_hash: pending.tx_hash,
                    confirmations,
                    timeout,
                });
            }
            Err(e) => {
                return Err(Error::transport(format!(
                    "Failed while waiting for {}: {}",
                    pending.tx_hash, e
                )));
            }
        }

        let receipt = provider
            .get_transaction_receipt(pending.tx_hash)
            .await
            .map_err(|e| Error::transport(format!("Failed to fetch receipt: {}", e)))?
            .ok_or_else(|| {
                Error::transport(format!(
                    "Receipt for {} unavailable after confirmation",
                    pending.tx_hash
                ))
            })?;

        let success = receipt.status();
        let revert_reason = if success {
            None
        } else {
            revert_reason(&provider, pending, &receipt).await
        };

        Ok(DeploymentReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            success,
            revert_reason,
        })
    }
}

fn creation_request(from: Address, init_code: &Bytes, value: Option<U256>) -> TransactionRequest {
    // CREATE transaction - no 'to' address
    let tx = TransactionRequest::default()
        .with_from(from)
        .with_deploy_code(init_code.clone());

    match value {
        Some(v) => tx.with_value(v),
        None => tx,
    }
}

/// A JSON-RPC error response means the node refused the creation (usually a
/// revert during gas estimation); anything else is a transport failure.
fn classify_send_error(err: TransportError) -> Error {
    match err.as_error_resp() {
        Some(payload) => Error::execution(None, Some(payload_reason(payload))),
        None => Error::transport(format!("Failed to send deployment transaction: {}", err)),
    }
}

fn payload_reason(payload: &ErrorPayload) -> String {
    payload
        .as_revert_data()
        .and_then(|data| decode_revert_reason(&data))
        .unwrap_or_else(|| payload.message.to_string())
}

/// Best-effort recovery of the revert reason of a mined, failed creation.
///
/// Replays the creation against the parent block state. If the replay
/// succeeds and all gas was consumed, the transaction ran out of gas.
async fn revert_reason(
    provider: &impl Provider,
    pending: &PendingDeployment,
    receipt: &TransactionReceipt,
) -> Option<String> {
    let block = receipt.block_number?;
    let tx = creation_request(pending.deployer, &pending.init_code, pending.value);

    match provider
        .call(tx)
        .block(BlockId::number(block.saturating_sub(1)))
        .await
    {
        Err(e) => e.as_error_resp().map(payload_reason),
        Ok(_) => {
            let sent = provider
                .get_transaction_by_hash(pending.tx_hash)
                .await
                .ok()
                .flatten()?;
            out_of_gas(receipt.gas_used, sent.gas_limit())
        }
    }
}

/// A failed creation that replays cleanly but used its whole gas limit ran out of gas
fn out_of_gas(gas_used: u64, gas_limit: u64) -> Option<String> {
    (gas_used >= gas_limit).then(|| "out of gas".to_string())
}
