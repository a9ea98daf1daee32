use crate::app::FilStreamManager;
use crate::transport::x402::PaymentGate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<FilStreamManager>,
    pub payment_gate: PaymentGate,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Multipart body of `POST /api/video/upload`.
#[allow(dead_code)]
#[derive(Debug, ToSchema)]
pub struct VideoUploadForm {
    pub title: String,
    pub description: String,
    /// The video file. Between 1 KiB and 500 MiB.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoListQuery {
    /// Creator address.
    pub user: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CdnUrlQuery {
    /// IPFS CID or a 32-byte hex content id.
    pub cid: String,
}

/// Every FilCDN URL form for one piece of content.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CdnUrls {
    pub cid: String,
    pub cdn_url: String,
    pub stream_url: String,
    pub thumbnail_url: String,
    pub hls_url: String,
    pub dash_url: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoList {
    pub user: String,
    pub video_ids: Vec<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct Earnings {
    pub address: String,
    /// USDFC, decimal.
    pub earnings: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct Balance {
    pub address: String,
    /// USDFC, decimal.
    pub balance: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PayReport {
    pub message: String,
    pub value: u32,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PaidContent {
    pub report: PayReport,
}
