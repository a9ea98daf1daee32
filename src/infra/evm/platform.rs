use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;

use super::client::{confirm, EvmClient};
use super::contracts::FilStreamPlatform;
use crate::domain::ports::{OnChainUser, OnChainVideo, PlatformContract, TxReceipt};

/// FilStream platform contract reached through the signing client.
pub struct FilStreamPlatformContract {
    contract: FilStreamPlatform<EvmClient>,
}

impl FilStreamPlatformContract {
    pub fn new(address: Address, client: Arc<EvmClient>) -> Self {
        Self {
            contract: FilStreamPlatform::new(address, client),
        }
    }
}

#[async_trait]
impl PlatformContract for FilStreamPlatformContract {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        cid: H256,
        price: U256,
    ) -> anyhow::Result<TxReceipt> {
        let call = self
            .contract
            .upload_video(title.to_string(), description.to_string(), cid.0, price);
        let pending = call.send().await?;
        confirm(pending).await
    }

    async fn get_video(&self, video_id: H256) -> anyhow::Result<OnChainVideo> {
        let (title, description, cid, price, creator, upload_time, is_active, total_views, total_earnings) =
            self.contract.get_video(video_id.0).call().await?;
        Ok(OnChainVideo {
            title,
            description,
            cid: H256::from(cid),
            price,
            creator,
            upload_time,
            is_active,
            total_views,
            total_earnings,
        })
    }

    async fn user_videos(&self, user: Address) -> anyhow::Result<Vec<H256>> {
        let ids = self.contract.get_user_videos(user).call().await?;
        Ok(ids.into_iter().map(H256::from).collect())
    }

    async fn pay_for_video(&self, video_id: H256) -> anyhow::Result<H256> {
        let call = self.contract.pay_for_video(video_id.0);
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }

    async fn user_earnings(&self, user: Address) -> anyhow::Result<U256> {
        Ok(self.contract.get_user_earnings(user).call().await?)
    }

    async fn video_earnings(&self, video_id: H256) -> anyhow::Result<U256> {
        Ok(self.contract.get_video_earnings(video_id.0).call().await?)
    }

    async fn withdraw_earnings(&self) -> anyhow::Result<H256> {
        let call = self.contract.withdraw_earnings();
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }

    async fn video_count(&self) -> anyhow::Result<U256> {
        Ok(self.contract.get_video_count().call().await?)
    }

    async fn register_user(&self) -> anyhow::Result<H256> {
        let call = self.contract.register_user();
        let pending = call.send().await?;
        Ok(confirm(pending).await?.transaction_hash)
    }

    async fn user(&self, user: Address) -> anyhow::Result<OnChainUser> {
        let (is_registered, earnings) = self.contract.users(user).call().await?;
        Ok(OnChainUser {
            is_registered,
            earnings,
        })
    }
}
