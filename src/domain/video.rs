//! Records handed back to callers. Hashes and addresses are rendered as hex strings
//! and token amounts as decimal strings, the same shapes the HTTP API returns.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
}

/// Content stored on PDP.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredContent {
    pub cid: String,
    pub size: u64,
    pub transaction_hash: String,
}

/// A PDP upload made through [`crate::storage::pdp::PdpService::upload_video`].
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredVideo {
    pub cid: String,
    pub size: u64,
    pub url: String,
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub title: String,
    pub description: String,
    pub size: u64,
    pub upload_time: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub success: bool,
    pub video_id: String,
    pub cid: String,
    pub cdn_url: String,
    pub payment_tx: String,
    pub metadata: UploadSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub cid: String,
    /// USDFC, decimal.
    pub price: String,
    pub creator: String,
    pub upload_time: String,
    pub is_active: bool,
    pub total_views: String,
    /// USDFC, decimal.
    pub total_earnings: String,
    pub cdn_url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_videos: String,
    pub platform_fees: String,
    pub storage_price: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferNotice {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub transaction_hash: Option<String>,
}
