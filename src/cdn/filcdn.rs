//! FilCDN content delivery.
//!
//! URL builders are pure string templates over the CDN base URL; the remaining
//! operations are single HTTP calls against the CDN's REST surface.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::error::{FilStreamError, ProviderContext, Result};
use crate::infra::config;

/// Region used when the CDN cannot suggest one.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    pub quality: String,
    pub format: String,
    pub region: String,
    pub cache: bool,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            quality: "auto".into(),
            format: "mp4".into(),
            region: "auto".into(),
            cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub quality: String,
    pub format: String,
    pub adaptive: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            quality: "auto".into(),
            format: "mp4".into(),
            adaptive: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    /// Offset into the video, `HH:MM:SS`.
    pub time: String,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            time: "00:00:05".into(),
        }
    }
}

/// Options shared by the HLS playlist and DASH manifest URLs.
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    pub quality: String,
    pub region: String,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            quality: "auto".into(),
            region: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreloadOptions {
    pub regions: Vec<String>,
    pub priority: String,
}

impl Default for PreloadOptions {
    fn default() -> Self {
        Self {
            regions: vec!["us-east-1".into(), "us-west-1".into(), "eu-west-1".into()],
            priority: "normal".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenOptions {
    /// Seconds.
    pub expires_in: u64,
    pub permissions: Vec<String>,
}

impl Default for AccessTokenOptions {
    fn default() -> Self {
        Self {
            expires_in: 3600,
            permissions: vec!["read".into()],
        }
    }
}

#[derive(Clone)]
pub struct FilCdnService {
    base_url: Url,
    http: Client,
}

impl FilCdnService {
    pub fn new(base_url: &str, http: Client) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid FilCDN base URL {}: {}", base_url, e))?;
        Ok(Self { base_url, http })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(&config::filcdn_base_url(), config::http_client()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub fn generate_url(&self, cid: &str, options: &ContentOptions) -> String {
        let mut url = self.endpoint(&format!("/content/{cid}"));
        url.query_pairs_mut()
            .append_pair("quality", &options.quality)
            .append_pair("format", &options.format)
            .append_pair("region", &options.region)
            .append_pair("cache", &options.cache.to_string());
        url.to_string()
    }

    pub fn get_video_stream_url(&self, cid: &str, options: &StreamOptions) -> String {
        let mut url = self.endpoint(&format!("/stream/{cid}"));
        url.query_pairs_mut()
            .append_pair("quality", &options.quality)
            .append_pair("format", &options.format)
            .append_pair("adaptive", &options.adaptive.to_string());
        url.to_string()
    }

    pub fn get_thumbnail_url(&self, cid: &str, options: &ThumbnailOptions) -> String {
        let mut url = self.endpoint(&format!("/thumbnail/{cid}"));
        url.query_pairs_mut()
            .append_pair("width", &options.width.to_string())
            .append_pair("height", &options.height.to_string())
            .append_pair("time", &options.time);
        url.to_string()
    }

    pub fn get_hls_playlist_url(&self, cid: &str, options: &ManifestOptions) -> String {
        let mut url = self.endpoint(&format!("/hls/{cid}/playlist.m3u8"));
        url.query_pairs_mut()
            .append_pair("quality", &options.quality)
            .append_pair("region", &options.region);
        url.to_string()
    }

    pub fn get_dash_manifest_url(&self, cid: &str, options: &ManifestOptions) -> String {
        let mut url = self.endpoint(&format!("/dash/{cid}/manifest.mpd"));
        url.query_pairs_mut()
            .append_pair("quality", &options.quality)
            .append_pair("region", &options.region);
        url.to_string()
    }

    async fn read_json(response: reqwest::Response) -> anyhow::Result<JsonValue> {
        let status = response.status();
        if !status.is_success() {
            return Err(FilStreamError::HttpStatus(status.as_u16()).into());
        }
        Ok(response.json::<JsonValue>().await?)
    }

    async fn get_json(&self, url: Url) -> anyhow::Result<JsonValue> {
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json(&self, url: Url, body: &JsonValue) -> anyhow::Result<JsonValue> {
        let response = self.http.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    pub async fn get_video_metadata(&self, cid: &str) -> Result<JsonValue> {
        let url = self.endpoint(&format!("/metadata/{cid}"));
        self.get_json(url).await.map_err(|e| {
            error!(cid, "Error fetching video metadata: {:#}", e);
            FilStreamError::provider("Failed to get video metadata", e)
        })
    }

    /// True only when the CDN answers 2xx with `"available": true`.
    pub async fn is_content_available(&self, cid: &str) -> bool {
        let url = self.endpoint(&format!("/status/{cid}"));
        match self.get_json(url).await {
            Ok(body) => body.get("available").and_then(JsonValue::as_bool) == Some(true),
            Err(e) => {
                warn!(cid, "Error checking content availability: {:#}", e);
                false
            }
        }
    }

    pub async fn get_delivery_stats(&self, cid: &str) -> Result<JsonValue> {
        let url = self.endpoint(&format!("/stats/{cid}"));
        self.get_json(url).await.map_err(|e| {
            error!(cid, "Error fetching delivery stats: {:#}", e);
            FilStreamError::provider("Failed to get delivery stats", e)
        })
    }

    pub async fn preload_content(&self, cid: &str, options: &PreloadOptions) -> Result<JsonValue> {
        let url = self.endpoint(&format!("/preload/{cid}"));
        let body = json!({ "regions": options.regions, "priority": options.priority });
        self.post_json(url, &body).await.map_err(|e| {
            error!(cid, "Error preloading content: {:#}", e);
            FilStreamError::provider("Failed to preload content", e)
        })
    }

    /// Falls back to [`DEFAULT_REGION`] on any failure.
    pub async fn get_optimal_region(&self, user_ip: Option<&str>) -> String {
        let mut url = self.endpoint("/region/optimal");
        if let Some(ip) = user_ip {
            url.query_pairs_mut().append_pair("ip", ip);
        }
        let region = self.get_json(url).await.and_then(|body| {
            body.get("region")
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("response has no region"))
        });
        match region {
            Ok(region) => region,
            Err(e) => {
                warn!("Error getting optimal region, using {}: {:#}", DEFAULT_REGION, e);
                DEFAULT_REGION.to_string()
            }
        }
    }

    pub async fn get_access_token(&self, cid: &str, options: &AccessTokenOptions) -> Result<String> {
        let url = self.endpoint(&format!("/token/{cid}"));
        let body = serde_json::to_value(options).provider_context("Failed to get access token")?;
        let result = self.post_json(url, &body).await.and_then(|body| {
            body.get("token")
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("response has no token"))
        });
        result.map_err(|e| {
            error!(cid, "Error getting access token: {:#}", e);
            FilStreamError::provider("Failed to get access token", e)
        })
    }
}

/// True when `url` parses and its host belongs to FilCDN.
pub fn is_valid_cdn_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.contains("filcdn.io") || h.contains("filcdn.com")))
        .unwrap_or(false)
}
