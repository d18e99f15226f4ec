use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use color_eyre::eyre::{Result, WrapErr};
use launchpad_core::Url;

/// Fetch the chain ID from an RPC endpoint
pub async fn get_chain_id(rpc_url: &Url) -> Result<u64> {
    let provider = ProviderBuilder::new().connect_http(rpc_url.clone());
    let chain_id = provider
        .get_chain_id()
        .await
        .wrap_err_with(|| format!("Failed to reach {}", rpc_url))?;
    Ok(chain_id)
}

/// Fetch the balance of each address, in wei
pub async fn get_balances(rpc_url: &Url, addresses: &[Address]) -> Result<Vec<(Address, U256)>> {
    let provider = ProviderBuilder::new().connect_http(rpc_url.clone());

    let mut balances = Vec::with_capacity(addresses.len());
    for &address in addresses {
        let balance = provider
            .get_balance(address)
            .await
            .wrap_err_with(|| format!("Failed to fetch balance of {}", address))?;
        balances.push((address, balance));
    }
    Ok(balances)
}
