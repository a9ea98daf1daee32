//! Minimal client for an IPFS node's HTTP RPC (`/api/v0`).

use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::cid;
use crate::error::{FilStreamError, Result};
use crate::infra::config;

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Clone)]
pub struct IpfsClient {
    api_url: Url,
    http: Client,
    credentials: Option<(String, String)>,
}

impl IpfsClient {
    pub fn new(api_url: &str, http: Client, credentials: Option<(String, String)>) -> anyhow::Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| anyhow::anyhow!("Invalid IPFS API URL {}: {}", api_url, e))?;
        Ok(Self {
            api_url,
            http,
            credentials,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(&config::ipfs_api_url(), config::http_client()?, config::ipfs_credentials())
    }

    fn rpc(&self, command: &str) -> RequestBuilder {
        let mut url = self.api_url.clone();
        url.set_path(&format!("/api/v0/{command}"));
        let request = self.http.post(url);
        match &self.credentials {
            Some((id, secret)) => request.basic_auth(id, Some(secret)),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("IPFS node returned {}: {}", status, body.trim()));
        }
        Ok(response)
    }

    /// Adds `bytes` as a single file and returns its CID.
    pub async fn add(&self, bytes: Vec<u8>, file_name: &str, content_type: &str, pin: bool) -> anyhow::Result<String> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);
        let request = self
            .rpc("add")
            .query(&[("pin", pin.to_string())])
            .multipart(form);
        let text = Self::send(request).await?.text().await?;

        // The node answers with one JSON object per line; the last one is the root.
        let line = text
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("empty response from IPFS add"))?;
        let parsed: AddResponse = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("unexpected IPFS add response {}: {}", line, e))?;
        Ok(parsed.hash)
    }

    pub async fn cat(&self, cid: &str) -> anyhow::Result<Vec<u8>> {
        let request = self.rpc("cat").query(&[("arg", cid)]);
        Ok(Self::send(request).await?.bytes().await?.to_vec())
    }

    pub async fn pin_content(&self, cid: &str) -> Result<()> {
        let request = self.rpc("pin/add").query(&[("arg", cid)]);
        Self::send(request).await.map_err(|e| {
            error!(cid, "Error pinning content to IPFS: {:#}", e);
            FilStreamError::provider("Failed to pin content to IPFS", e)
        })?;
        info!(cid, "Content pinned to IPFS");
        Ok(())
    }

    pub async fn unpin_content(&self, cid: &str) -> Result<()> {
        let request = self.rpc("pin/rm").query(&[("arg", cid)]);
        Self::send(request).await.map_err(|e| {
            error!(cid, "Error unpinning content from IPFS: {:#}", e);
            FilStreamError::provider("Failed to unpin content from IPFS", e)
        })?;
        info!(cid, "Content unpinned from IPFS");
        Ok(())
    }

    pub fn is_valid_cid(&self, cid: &str) -> bool {
        cid::is_valid_cid(cid)
    }
}

/// `{gateway}/ipfs/{cid}`.
pub fn gateway_url(cid: &str, gateway: &str) -> String {
    format!("{}/ipfs/{}", gateway.trim_end_matches('/'), cid)
}
