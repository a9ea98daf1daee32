//! USDFC token payments and balances.
//!
//! Amounts cross this API as decimal strings in whole tokens; conversion to and
//! from base units uses the token's own `decimals()`.

use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::ids::{address_hex, bytes32_hex};
use crate::domain::ports::{PlatformContract, RawTransfer, TokenContract, TransferWatch};
use crate::domain::pricing::STORAGE_PRICE_PER_WEEK_USDFC;
use crate::domain::units::{format_units, parse_units};
use crate::domain::video::{TokenInfo, TransferNotice};
use crate::error::{FilStreamError, ProviderContext, Result};

#[derive(Clone)]
pub struct UsdfcService {
    token: Arc<dyn TokenContract>,
}

impl UsdfcService {
    pub fn new(token: Arc<dyn TokenContract>) -> Self {
        Self { token }
    }

    pub fn signer_address(&self) -> Address {
        self.token.signer_address()
    }

    async fn to_base_units(&self, amount: &str) -> anyhow::Result<U256> {
        let decimals = self.token.decimals().await?;
        parse_units(amount, u32::from(decimals))
            .map_err(|e| FilStreamError::InvalidAmount(format!("{amount} ({e})")).into())
    }

    async fn to_decimal(&self, amount: U256) -> anyhow::Result<String> {
        let decimals = self.token.decimals().await?;
        Ok(format_units(amount, u32::from(decimals))?)
    }

    pub async fn get_balance(&self, address: Address) -> Result<String> {
        let result = async {
            let balance = self.token.balance_of(address).await?;
            self.to_decimal(balance).await
        }
        .await;
        result.map_err(|e| {
            error!(address = %address_hex(&address), "Error getting USDFC balance: {:#}", e);
            FilStreamError::provider("Failed to get balance", e)
        })
    }

    pub async fn get_current_user_balance(&self) -> Result<String> {
        self.get_balance(self.token.signer_address()).await
    }

    pub async fn transfer(&self, to: Address, amount: &str) -> Result<String> {
        info!("Transferring {} USDFC to {}", amount, address_hex(&to));
        let result = async {
            let amount = self.to_base_units(amount).await?;
            self.token.transfer(to, amount).await
        }
        .await;
        let tx_hash = result.map_err(|e| {
            error!("Error transferring USDFC: {:#}", e);
            FilStreamError::provider("USDFC transfer failed", e)
        })?;
        info!("USDFC transfer successful");
        Ok(bytes32_hex(&tx_hash))
    }

    pub async fn approve(&self, spender: Address, amount: &str) -> Result<String> {
        info!("Approving {} USDFC for {}", amount, address_hex(&spender));
        let result = async {
            let amount = self.to_base_units(amount).await?;
            self.token.approve(spender, amount).await
        }
        .await;
        let tx_hash = result.map_err(|e| {
            error!("Error approving USDFC: {:#}", e);
            FilStreamError::provider("USDFC approval failed", e)
        })?;
        info!("USDFC approval successful");
        Ok(bytes32_hex(&tx_hash))
    }

    pub async fn get_allowance(&self, owner: Address, spender: Address) -> Result<String> {
        let result = async {
            let allowance = self.token.allowance(owner, spender).await?;
            self.to_decimal(allowance).await
        }
        .await;
        result.map_err(|e| {
            error!("Error getting allowance: {:#}", e);
            FilStreamError::provider("Failed to get allowance", e)
        })
    }

    /// Approves one week of storage for the platform contract, then pays for `video_id`.
    pub async fn pay_for_video(&self, platform: &dyn PlatformContract, video_id: H256) -> Result<String> {
        info!(video_id = %bytes32_hex(&video_id), "Processing video payment");
        let result = async {
            self.approve(platform.address(), STORAGE_PRICE_PER_WEEK_USDFC).await?;
            anyhow::Ok(platform.pay_for_video(video_id).await?)
        }
        .await;
        let tx_hash = result.map_err(|e| {
            error!("Error paying for video: {:#}", e);
            FilStreamError::provider("Video payment failed", e)
        })?;
        info!("Video payment successful");
        Ok(bytes32_hex(&tx_hash))
    }

    pub async fn get_token_info(&self) -> Result<TokenInfo> {
        let (name, symbol, decimals) =
            tokio::try_join!(self.token.name(), self.token.symbol(), self.token.decimals())
                .provider_context("Failed to get token info")?;
        Ok(TokenInfo {
            name,
            symbol,
            decimals: decimals.to_string(),
        })
    }

    /// Exact comparison in base units. Any failure reads as "not enough".
    pub async fn has_sufficient_balance(&self, amount: &str) -> bool {
        let result = async {
            let required = self.to_base_units(amount).await?;
            let balance = self.token.balance_of(self.token.signer_address()).await?;
            anyhow::Ok(balance >= required)
        }
        .await;
        match result {
            Ok(sufficient) => sufficient,
            Err(e) => {
                warn!("Error checking balance sufficiency: {:#}", e);
                false
            }
        }
    }

    /// `"<amount> <symbol>"`, or `"0 USDFC"` when the token cannot be read.
    pub async fn format_price(&self, amount_wei: U256) -> String {
        let result = async {
            let (decimals, symbol) = tokio::try_join!(self.token.decimals(), self.token.symbol())?;
            let amount = format_units(amount_wei, u32::from(decimals))?;
            anyhow::Ok(format!("{amount} {symbol}"))
        }
        .await;
        result.unwrap_or_else(|e| {
            warn!("Error formatting price: {:#}", e);
            "0 USDFC".to_string()
        })
    }

    /// Follows `Transfer` events sent from `address`, with amounts in whole tokens.
    pub async fn watch_transfers(&self, address: Address) -> Result<TransferFeed> {
        let decimals = self
            .token
            .decimals()
            .await
            .provider_context("Failed to watch transfers")?;
        let watch = self
            .token
            .watch_transfers(address)
            .await
            .provider_context("Failed to watch transfers")?;
        Ok(TransferFeed { watch, decimals })
    }
}

/// Formatted stream of USDFC transfers. Dropping it stops the watch.
pub struct TransferFeed {
    watch: TransferWatch,
    decimals: u8,
}

impl TransferFeed {
    pub async fn next(&mut self) -> Option<TransferNotice> {
        let raw = self.watch.next().await?;
        Some(notice(raw, self.decimals))
    }
}

fn notice(raw: RawTransfer, decimals: u8) -> TransferNotice {
    TransferNotice {
        from: address_hex(&raw.from),
        to: address_hex(&raw.to),
        amount: format_units(raw.value, u32::from(decimals)).unwrap_or_else(|_| raw.value.to_string()),
        transaction_hash: raw.transaction_hash.as_ref().map(bytes32_hex),
    }
}
