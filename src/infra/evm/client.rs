// Responsible for the connection to the EVM chain: provider, signer and receipts.

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, JsonRpcClient, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::ids::bytes32_hex;
use crate::domain::TxReceipt;
use crate::infra::config;

/// Provider + local signing wallet, shared by all contract bindings.
pub type EvmClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Builds the signing client from `RPC_URL`, `CHAIN_ID` and the configured wallet key.
pub async fn connect() -> anyhow::Result<Arc<EvmClient>> {
    let rpc_url = config::rpc_url();
    let provider = Provider::<Http>::try_from(rpc_url.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid RPC_URL {}: {}", rpc_url, e))?;
    let wallet = config::wallet_private_key()?
        .parse::<LocalWallet>()
        .map_err(|e| anyhow::anyhow!("Failed to parse wallet key: {}", e))?
        .with_chain_id(config::chain_id());

    info!(rpc = %rpc_url, signer = ?wallet.address(), "Connected EVM signer");
    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

/// Waits for a sent transaction to be mined and keeps the parts the services use.
pub(crate) async fn confirm<P: JsonRpcClient>(
    pending: PendingTransaction<'_, P>,
) -> anyhow::Result<TxReceipt> {
    let tx_hash = pending.tx_hash();
    debug!(tx = %bytes32_hex(&tx_hash), "Waiting for transaction receipt");
    let receipt = pending
        .await?
        .ok_or_else(|| anyhow::anyhow!("transaction {} dropped before it was mined", bytes32_hex(&tx_hash)))?;
    Ok(TxReceipt {
        transaction_hash: receipt.transaction_hash,
        logs: receipt.logs,
    })
}
