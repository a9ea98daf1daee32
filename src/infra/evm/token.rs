use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, H256, U256};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::client::{confirm, EvmClient};
use super::contracts::UsdfcToken;
use crate::domain::ports::{RawTransfer, TokenContract, TransferWatch};

/// USDFC ERC-20 contract reached through the signing client.
pub struct UsdfcTokenContract {
    contract: UsdfcToken<EvmClient>,
    signer: Address,
}

impl UsdfcTokenContract {
    pub fn new(address: Address, client: Arc<EvmClient>) -> Self {
        let signer = client.default_sender().unwrap_or_default();
        Self {
            contract: UsdfcToken::new(address, client),
            signer,
        }
    }
}

#[async_trait]
impl TokenContract for UsdfcTokenContract {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn balance_of(&self, owner: Address) -> anyhow::Result<U256> {
        Ok(self.contract.balance_of(owner).call().await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> anyhow::Result<U256> {
        Ok(self.contract.allowance(owner, spender).call().await?)
    }

    async fn decimals(&self) -> anyhow::Result<u8> {
        Ok(self.contract.decimals().call().await?)
    }

    async fn symbol(&self) -> anyhow::Result<String> {
        Ok(self.contract.symbol().call().await?)
    }

    async fn name(&self) -> anyhow::Result<String> {
        Ok(self.contract.name().call().await?)
    }

    async fn transfer(&self, to: Address, amount: U256) -> anyhow::Result<H256> {
        let call = self.contract.transfer(to, amount);
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }

    async fn approve(&self, spender: Address, amount: U256) -> anyhow::Result<H256> {
        let call = self.contract.approve(spender, amount);
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }

    async fn watch_transfers(&self, from: Address) -> anyhow::Result<TransferWatch> {
        let contract = self.contract.clone();
        let (tx, rx) = mpsc::channel(64);
        let (installed_tx, installed_rx) = oneshot::channel::<anyhow::Result<()>>();
        let task = tokio::spawn(async move {
            // The event stream borrows its filter, so both live in this task.
            let event = contract.transfer_filter().topic1(H256::from(from));
            let mut stream = match event.stream_with_meta().await {
                Ok(stream) => {
                    let _ = installed_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = installed_tx.send(Err(anyhow::Error::new(e).context("Failed to install Transfer filter")));
                    return;
                }
            };
            while let Some(item) = stream.next().await {
                match item {
                    Ok((transfer, meta)) => {
                        let raw = RawTransfer {
                            from: transfer.from,
                            to: transfer.to,
                            value: transfer.value,
                            transaction_hash: Some(meta.transaction_hash),
                        };
                        if tx.send(raw).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Transfer event decode failed: {}", e),
                }
            }
        });
        match installed_rx.await {
            Ok(Ok(())) => Ok(TransferWatch::new(rx, task)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(anyhow::anyhow!("Transfer watcher stopped before installing its filter")),
        }
    }
}
