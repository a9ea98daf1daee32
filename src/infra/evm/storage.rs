use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};
use std::sync::Arc;

use super::client::{confirm, EvmClient};
use super::contracts::PdpStorage;
use crate::domain::ports::{StorageContract, TxReceipt};

/// PDP provider contract reached through the signing client.
pub struct PdpStorageContract {
    contract: PdpStorage<EvmClient>,
}

impl PdpStorageContract {
    pub fn new(address: Address, client: Arc<EvmClient>) -> Self {
        Self {
            contract: PdpStorage::new(address, client),
        }
    }
}

#[async_trait]
impl StorageContract for PdpStorageContract {
    async fn store(&self, data: Vec<u8>) -> anyhow::Result<TxReceipt> {
        let call = self.contract.store(Bytes::from(data));
        let pending = call.send().await?;
        confirm(pending).await
    }

    async fn retrieve(&self, cid: H256) -> anyhow::Result<Vec<u8>> {
        let data = self.contract.retrieve(cid.0).call().await?;
        Ok(data.to_vec())
    }

    async fn storage_price(&self) -> anyhow::Result<U256> {
        Ok(self.contract.get_storage_price().call().await?)
    }

    async fn pay_for_storage(&self, cid: H256, amount: U256) -> anyhow::Result<H256> {
        let call = self.contract.pay_for_storage(cid.0, amount).value(amount);
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }
}
