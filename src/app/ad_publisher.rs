//! Advertisement packages on IPFS: video, thumbnail and a JSON metadata document
//! that references both through `ipfs://` URIs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::domain::cid::ipfs_uri;
use crate::error::{FilStreamError, Result};
use crate::storage::ipfs::{gateway_url, IpfsClient};

pub const METADATA_VERSION: &str = "1.0.0";
pub const PLATFORM_NAME: &str = "FilStream";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    pub age_range: String,
    pub interests: Vec<String>,
    pub location: String,
}

/// An ad as submitted by an advertiser.
#[derive(Debug, Clone, Default)]
pub struct AdCampaign {
    pub title: String,
    pub description: String,
    pub category: String,
    pub advertiser_address: String,
    /// USDFC.
    pub budget: String,
    pub target_audience: TargetAudience,
    /// Seconds.
    pub duration: u32,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Local files uploaded by [`AdPublisher::upload_complete_ad`].
    pub video_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
}

/// The JSON document stored on IPFS for an ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdMetadata {
    pub name: String,
    pub description: String,
    pub category: String,
    pub advertiser: String,
    pub budget: String,
    pub target_audience: TargetAudience,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub created_at: String,
    pub version: String,
    pub platform: String,
}

impl AdMetadata {
    fn from_campaign(ad: &AdCampaign) -> Self {
        Self {
            name: ad.title.clone(),
            description: ad.description.clone(),
            category: ad.category.clone(),
            advertiser: ad.advertiser_address.clone(),
            budget: ad.budget.clone(),
            target_audience: ad.target_audience.clone(),
            duration: ad.duration,
            video_url: ad.video_url.clone(),
            thumbnail_url: ad.thumbnail_url.clone(),
            created_at: Utc::now().to_rfc3339(),
            version: METADATA_VERSION.to_string(),
            platform: PLATFORM_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPackage {
    pub video_cid: Option<String>,
    pub thumbnail_cid: Option<String>,
    pub metadata_cid: String,
}

impl AdPackage {
    /// Every CID in the package, video first.
    pub fn cids(&self) -> Vec<&str> {
        self.video_cid
            .iter()
            .chain(self.thumbnail_cid.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.metadata_cid.as_str()))
            .collect()
    }
}

#[derive(Clone)]
pub struct AdPublisher {
    ipfs: IpfsClient,
    gateway: String,
}

impl AdPublisher {
    pub fn new(ipfs: IpfsClient, gateway: impl Into<String>) -> Self {
        Self {
            ipfs,
            gateway: gateway.into(),
        }
    }

    pub fn ipfs(&self) -> &IpfsClient {
        &self.ipfs
    }

    pub fn gateway_url(&self, cid: &str) -> String {
        gateway_url(cid, &self.gateway)
    }

    pub async fn upload_ad_metadata(&self, ad: &AdCampaign) -> Result<String> {
        let result = async {
            let metadata = AdMetadata::from_campaign(ad);
            let bytes = serde_json::to_vec_pretty(&metadata)?;
            self.ipfs.add(bytes, "metadata.json", "application/json", true).await
        }
        .await;
        let cid = result.map_err(|e| {
            error!("Error uploading ad metadata to IPFS: {:#}", e);
            FilStreamError::provider("Failed to upload ad metadata to IPFS", e)
        })?;
        info!(cid = %cid, "Ad metadata uploaded to IPFS");
        Ok(cid)
    }

    async fn upload_file(&self, path: &Path, content_type: &str) -> anyhow::Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        self.ipfs.add(bytes, &name, content_type, true).await
    }

    pub async fn upload_ad_video(&self, path: &Path) -> Result<String> {
        let cid = self.upload_file(path, "video/mp4").await.map_err(|e| {
            error!("Error uploading ad video to IPFS: {:#}", e);
            FilStreamError::provider("Failed to upload ad video to IPFS", e)
        })?;
        info!(cid = %cid, "Ad video uploaded to IPFS");
        Ok(cid)
    }

    pub async fn upload_ad_thumbnail(&self, path: &Path) -> Result<String> {
        let cid = self.upload_file(path, "image/jpeg").await.map_err(|e| {
            error!("Error uploading ad thumbnail to IPFS: {:#}", e);
            FilStreamError::provider("Failed to upload ad thumbnail to IPFS", e)
        })?;
        info!(cid = %cid, "Ad thumbnail uploaded to IPFS");
        Ok(cid)
    }

    /// Uploads the optional video and thumbnail, points the metadata at them, then
    /// uploads the metadata.
    pub async fn upload_complete_ad(&self, ad: &AdCampaign) -> Result<AdPackage> {
        let result = async {
            let video_cid = match &ad.video_path {
                Some(path) => Some(self.upload_ad_video(path).await?),
                None => None,
            };
            let thumbnail_cid = match &ad.thumbnail_path {
                Some(path) => Some(self.upload_ad_thumbnail(path).await?),
                None => None,
            };

            let mut with_urls = ad.clone();
            if let Some(cid) = &video_cid {
                with_urls.video_url = Some(ipfs_uri(cid));
            }
            if let Some(cid) = &thumbnail_cid {
                with_urls.thumbnail_url = Some(ipfs_uri(cid));
            }
            let metadata_cid = self.upload_ad_metadata(&with_urls).await?;

            Ok::<_, FilStreamError>(AdPackage {
                video_cid,
                thumbnail_cid,
                metadata_cid,
            })
        }
        .await;

        let package = result.map_err(|e| {
            error!("Error uploading complete ad package: {}", e);
            FilStreamError::provider("Failed to upload complete ad package to IPFS", e)
        })?;
        info!(package = ?package, "Complete ad package uploaded to IPFS");
        Ok(package)
    }

    pub async fn get_ad_metadata(&self, cid: &str) -> Result<AdMetadata> {
        let result = async {
            let bytes = self.ipfs.cat(cid).await?;
            anyhow::Ok(serde_json::from_slice::<AdMetadata>(&bytes)?)
        }
        .await;
        result.map_err(|e| {
            error!(cid, "Error retrieving ad metadata from IPFS: {:#}", e);
            FilStreamError::provider("Failed to retrieve ad metadata from IPFS", e)
        })
    }
}
