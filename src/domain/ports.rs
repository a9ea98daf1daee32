//! Seams over the three contracts FilStream talks to.
//!
//! The ethers-backed implementations live in `infra::evm`; the services in
//! `storage`, `payments` and `app` only ever see these traits, which keeps them
//! testable against in-memory doubles.

use async_trait::async_trait;
use ethers::types::{Address, Log, H256, U256};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the services need from a mined transaction.
#[derive(Debug, Clone, Default)]
pub struct TxReceipt {
    pub transaction_hash: H256,
    pub logs: Vec<Log>,
}

/// Raw `getVideo` tuple as returned by the platform contract.
#[derive(Debug, Clone, PartialEq)]
pub struct OnChainVideo {
    pub title: String,
    pub description: String,
    pub cid: H256,
    pub price: U256,
    pub creator: Address,
    pub upload_time: U256,
    pub is_active: bool,
    pub total_views: U256,
    pub total_earnings: U256,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnChainUser {
    pub is_registered: bool,
    pub earnings: U256,
}

/// A `Transfer` event in base units.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub transaction_hash: Option<H256>,
}

/// Receiving end of a transfer watch. Dropping it stops the background watcher.
pub struct TransferWatch {
    rx: mpsc::Receiver<RawTransfer>,
    task: JoinHandle<()>,
}

impl TransferWatch {
    pub fn new(rx: mpsc::Receiver<RawTransfer>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    pub async fn next(&mut self) -> Option<RawTransfer> {
        self.rx.recv().await
    }
}

impl Drop for TransferWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// PDP storage contract.
#[async_trait]
pub trait StorageContract: Send + Sync {
    async fn store(&self, data: Vec<u8>) -> anyhow::Result<TxReceipt>;
    async fn retrieve(&self, cid: H256) -> anyhow::Result<Vec<u8>>;
    async fn storage_price(&self) -> anyhow::Result<U256>;
    /// Sends `amount` as the call value.
    async fn pay_for_storage(&self, cid: H256, amount: U256) -> anyhow::Result<H256>;
}

/// ERC-20 surface of the USDFC token, bound to a signing account.
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn signer_address(&self) -> Address;
    async fn balance_of(&self, owner: Address) -> anyhow::Result<U256>;
    async fn allowance(&self, owner: Address, spender: Address) -> anyhow::Result<U256>;
    async fn decimals(&self) -> anyhow::Result<u8>;
    async fn symbol(&self) -> anyhow::Result<String>;
    async fn name(&self) -> anyhow::Result<String>;
    async fn transfer(&self, to: Address, amount: U256) -> anyhow::Result<H256>;
    async fn approve(&self, spender: Address, amount: U256) -> anyhow::Result<H256>;
    /// Streams `Transfer` events whose sender is `from`. Resolves once the event filter is
    /// installed, so a failed subscription is an error rather than an empty stream.
    async fn watch_transfers(&self, from: Address) -> anyhow::Result<TransferWatch>;
}

/// FilStream platform contract.
#[async_trait]
pub trait PlatformContract: Send + Sync {
    fn address(&self) -> Address;
    async fn upload_video(
        &self,
        title: &str,
        description: &str,
        cid: H256,
        price: U256,
    ) -> anyhow::Result<TxReceipt>;
    async fn get_video(&self, video_id: H256) -> anyhow::Result<OnChainVideo>;
    async fn user_videos(&self, user: Address) -> anyhow::Result<Vec<H256>>;
    async fn pay_for_video(&self, video_id: H256) -> anyhow::Result<H256>;
    async fn user_earnings(&self, user: Address) -> anyhow::Result<U256>;
    async fn video_earnings(&self, video_id: H256) -> anyhow::Result<U256>;
    async fn withdraw_earnings(&self) -> anyhow::Result<H256>;
    async fn video_count(&self) -> anyhow::Result<U256>;
    async fn register_user(&self) -> anyhow::Result<H256>;
    async fn user(&self, user: Address) -> anyhow::Result<OnChainUser>;
}
