//! x402 payment requirements and the facilitator client.
//!
//! FilStream only plays the resource-server role: it advertises what a route costs
//! and asks a facilitator to verify and settle the payment a client attaches in the
//! `X-PAYMENT` header. Signature checks and on-chain settlement stay with the
//! facilitator.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::domain::units::parse_units;
use crate::error::FilStreamError;

pub const X402_VERSION: u32 = 1;
pub const PAYMENT_HEADER: &str = "X-PAYMENT";
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// USDC uses 6 decimals on every supported network.
const USDC_DECIMALS: u32 = 6;
const MAX_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    BaseSepolia,
    Base,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::BaseSepolia => "base-sepolia",
            Network::Base => "base",
        }
    }

    /// USDC contract used as the payment asset.
    pub fn usdc_address(&self) -> &'static str {
        match self {
            Network::BaseSepolia => "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
            Network::Base => "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        }
    }

    /// Wallet-facing chain description, as used for `wallet_addEthereumChain`.
    pub fn info(&self) -> ChainInfo {
        match self {
            Network::BaseSepolia => ChainInfo {
                chain_id: 84532,
                chain_name: "Base Sepolia",
                native_currency: NativeCurrency {
                    name: "ETH",
                    symbol: "ETH",
                    decimals: 18,
                },
                rpc_urls: &["https://sepolia.base.org"],
                block_explorer_urls: &["https://sepolia.basescan.org"],
            },
            Network::Base => ChainInfo {
                chain_id: 8453,
                chain_name: "Base",
                native_currency: NativeCurrency {
                    name: "ETH",
                    symbol: "ETH",
                    decimals: 18,
                },
                rpc_urls: &["https://mainnet.base.org"],
                block_explorer_urls: &["https://basescan.org"],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: &'static [&'static str],
    pub block_explorer_urls: &'static [&'static str],
}

impl ChainInfo {
    /// Hex chain id, the form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "base-sepolia" => Ok(Network::BaseSepolia),
            "base" => Ok(Network::Base),
            other => Err(anyhow::anyhow!("Unsupported x402 network: {}", other)),
        }
    }
}

/// Converts a dollar price such as `"$0.01"` into USDC base units (`"10000"`).
pub fn usd_price_to_atomic(price: &str) -> Result<String, FilStreamError> {
    let trimmed = price.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let atomic = parse_units(amount, USDC_DECIMALS)
        .map_err(|e| FilStreamError::InvalidAmount(format!("{price} ({e})")))?;
    Ok(atomic.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    pub max_amount_required: String,
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<JsonValue>,
}

impl PaymentRequirements {
    /// `exact`-scheme requirements for `price` dollars, paid in USDC to `pay_to`.
    pub fn exact_usdc(
        network: Network,
        price: &str,
        pay_to: &str,
        resource: &str,
        description: &str,
    ) -> Result<Self, FilStreamError> {
        Ok(Self {
            scheme: "exact".into(),
            network: network.as_str().into(),
            max_amount_required: usd_price_to_atomic(price)?,
            resource: resource.into(),
            description: description.into(),
            mime_type: "application/json".into(),
            pay_to: pay_to.into(),
            max_timeout_seconds: MAX_TIMEOUT_SECONDS,
            asset: network.usdc_address().into(),
            extra: Some(json!({ "name": "USDC", "version": "2" })),
        })
    }
}

/// Body of a 402 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    pub x402_version: u32,
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}

/// Decoded `X-PAYMENT` header. The scheme payload is opaque to FilStream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    pub payload: JsonValue,
}

impl PaymentPayload {
    pub fn from_header(value: &str) -> anyhow::Result<Self> {
        let bytes = BASE64
            .decode(value.trim())
            .map_err(|e| anyhow::anyhow!("X-PAYMENT header is not base64: {}", e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| anyhow::anyhow!("X-PAYMENT header is not a payment payload: {}", e))
    }

    pub fn to_header(&self) -> anyhow::Result<String> {
        Ok(BASE64.encode(serde_json::to_vec(self)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl SettleResponse {
    /// Value of the `X-PAYMENT-RESPONSE` header.
    pub fn to_header(&self) -> anyhow::Result<String> {
        Ok(BASE64.encode(serde_json::to_vec(self)?))
    }
}

#[derive(Clone)]
pub struct FacilitatorClient {
    base_url: String,
    http: reqwest::Client,
}

impl FacilitatorClient {
    pub fn new(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> anyhow::Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "Calling x402 facilitator");
        let body = json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payload,
            "paymentRequirements": requirements,
        });
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("facilitator {} returned {}: {}", endpoint, status, text.trim()));
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> anyhow::Result<VerifyResponse> {
        self.post("verify", payload, requirements).await
    }

    pub async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> anyhow::Result<SettleResponse> {
        self.post("settle", payload, requirements).await
    }
}
