//! FilStreamManager: the orchestrator for video operations.
//!
//! Uploading a video is five remote steps executed in a fixed order:
//! 1.  Store the bytes on Filecoin PDP.
//! 2.  Build the FilCDN URL for the stored content.
//! 3.  Check the signer holds one week of storage in USDFC.
//! 4.  Register the video on the FilStream contract.
//! 5.  Approve and pay for the video.
//!
//! There is no compensation: a failure after step 1 leaves earlier effects in place.
//! The returned [`FilStreamError::UploadFailed`] lists what had already committed.

use chrono::{DateTime, Utc};
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cdn::filcdn::{ContentOptions, FilCdnService, StreamOptions, ThumbnailOptions};
use crate::domain::events::{extract_video_id, VIDEO_UPLOADED_EVENT};
use crate::domain::ids::{address_hex, bytes32_hex};
use crate::domain::ports::{PlatformContract, StorageContract, TokenContract};
use crate::domain::pricing::{storage_price_per_week, STORAGE_PRICE_PER_WEEK_USDFC};
use crate::domain::units::{format_units, USDFC_DECIMALS};
use crate::domain::video::{PlatformStats, UploadReceipt, UploadSummary, VideoDetails, VideoMetadata};
use crate::error::{FilStreamError, ProviderContext, Result, UploadStep};
use crate::infra::{config, evm};
use crate::payments::UsdfcService;
use crate::storage::PdpService;

pub struct FilStreamManager {
    platform: Arc<dyn PlatformContract>,
    pdp: PdpService,
    usdfc: UsdfcService,
    cdn: FilCdnService,
}

fn upload_aborted(step: UploadStep, completed: &[UploadStep], source: FilStreamError) -> FilStreamError {
    error!(%step, completed = ?completed, "Video upload failed: {}", source);
    FilStreamError::UploadFailed {
        step,
        completed: completed.to_vec(),
        source: Box::new(source),
    }
}

fn wei_to_usdfc(amount: U256) -> Result<String> {
    format_units(amount, USDFC_DECIMALS).map_err(|e| FilStreamError::InvalidAmount(e.to_string()))
}

fn unix_to_rfc3339(seconds: U256) -> Result<String> {
    if seconds > U256::from(i64::MAX as u64) {
        return Err(FilStreamError::InvalidAmount(format!("upload time {seconds} out of range")));
    }
    DateTime::<Utc>::from_timestamp(seconds.as_u64() as i64, 0)
        .map(|t| t.to_rfc3339())
        .ok_or_else(|| FilStreamError::InvalidAmount(format!("upload time {seconds} out of range")))
}

impl FilStreamManager {
    pub fn new(
        platform: Arc<dyn PlatformContract>,
        storage: Arc<dyn StorageContract>,
        token: Arc<dyn TokenContract>,
        cdn: FilCdnService,
    ) -> Self {
        Self {
            platform,
            pdp: PdpService::new(storage, cdn.clone()),
            usdfc: UsdfcService::new(token),
            cdn,
        }
    }

    /// Connects all three contracts through one signing client built from the environment.
    pub async fn from_env() -> anyhow::Result<Self> {
        let client = evm::connect().await?;
        let platform = evm::FilStreamPlatformContract::new(config::filstream_contract_address()?, client.clone());
        let storage = evm::PdpStorageContract::new(config::pdp_provider_address()?, client.clone());
        let token = evm::UsdfcTokenContract::new(config::usdfc_address()?, client);
        Ok(Self::new(
            Arc::new(platform),
            Arc::new(storage),
            Arc::new(token),
            FilCdnService::from_env()?,
        ))
    }

    pub fn pdp(&self) -> &PdpService {
        &self.pdp
    }

    pub fn usdfc(&self) -> &UsdfcService {
        &self.usdfc
    }

    pub fn cdn(&self) -> &FilCdnService {
        &self.cdn
    }

    pub fn contract_address(&self) -> Address {
        self.platform.address()
    }

    /// Cheap read used by health checks.
    pub async fn ping(&self) -> Result<()> {
        self.platform
            .video_count()
            .await
            .provider_context("Contract unreachable")?;
        Ok(())
    }

    /// Complete video upload process.
    pub async fn upload_video(&self, data: Vec<u8>, metadata: VideoMetadata) -> Result<UploadReceipt> {
        info!(title = %metadata.title, bytes = data.len(), "Starting video upload process");
        let mut completed = Vec::with_capacity(5);

        info!("Step 1: Uploading to Filecoin PDP");
        let (cid, stored) = self
            .pdp
            .upload_video_bytes(data)
            .await
            .map_err(|e| upload_aborted(UploadStep::StoreContent, &completed, e))?;
        completed.push(UploadStep::StoreContent);

        info!("Step 2: Generating FilCDN URL");
        let cdn_url = self.cdn.generate_url(&stored.cid, &ContentOptions::default());
        completed.push(UploadStep::GenerateCdnUrl);

        info!("Step 3: Checking USDFC balance");
        if !self.usdfc.has_sufficient_balance(STORAGE_PRICE_PER_WEEK_USDFC).await {
            let insufficient = FilStreamError::InsufficientBalance {
                required: STORAGE_PRICE_PER_WEEK_USDFC.to_string(),
            };
            return Err(upload_aborted(UploadStep::CheckBalance, &completed, insufficient));
        }
        completed.push(UploadStep::CheckBalance);

        info!("Step 4: Registering video on blockchain");
        let video_id = self
            .register_video_on_chain(&metadata.title, &metadata.description, cid, storage_price_per_week())
            .await
            .map_err(|e| upload_aborted(UploadStep::Register, &completed, e))?;
        completed.push(UploadStep::Register);

        info!("Step 5: Processing payment");
        let payment_tx = self
            .usdfc
            .pay_for_video(self.platform.as_ref(), video_id)
            .await
            .map_err(|e| upload_aborted(UploadStep::Pay, &completed, e))?;

        info!(video_id = %bytes32_hex(&video_id), "Video upload completed successfully");
        Ok(UploadReceipt {
            success: true,
            video_id: bytes32_hex(&video_id),
            cid: stored.cid,
            cdn_url,
            payment_tx,
            metadata: UploadSummary {
                title: metadata.title,
                description: metadata.description,
                size: stored.size,
                upload_time: Utc::now().to_rfc3339(),
            },
        })
    }

    /// Sends `uploadVideo` and returns the id from the `VideoUploaded` event.
    pub async fn register_video_on_chain(
        &self,
        title: &str,
        description: &str,
        cid: H256,
        price: U256,
    ) -> Result<H256> {
        let result = async {
            let receipt = self.platform.upload_video(title, description, cid, price).await?;
            let video_id = extract_video_id(&receipt.logs).ok_or(FilStreamError::MissingEvent {
                event: VIDEO_UPLOADED_EVENT,
            })?;
            anyhow::Ok(video_id)
        }
        .await;
        result.map_err(|e| {
            error!("Error registering video on chain: {:#}", e);
            FilStreamError::provider("Failed to register video", e)
        })
    }

    pub async fn get_video(&self, video_id: H256) -> Result<VideoDetails> {
        let result = async {
            let video = self.platform.get_video(video_id).await?;
            let cid = bytes32_hex(&video.cid);
            anyhow::Ok(VideoDetails {
                video_id: bytes32_hex(&video_id),
                title: video.title,
                description: video.description,
                cdn_url: self.cdn.generate_url(&cid, &ContentOptions::default()),
                thumbnail_url: self.cdn.get_thumbnail_url(&cid, &ThumbnailOptions::default()),
                cid,
                price: wei_to_usdfc(video.price)?,
                creator: address_hex(&video.creator),
                upload_time: unix_to_rfc3339(video.upload_time)?,
                is_active: video.is_active,
                total_views: video.total_views.to_string(),
                total_earnings: wei_to_usdfc(video.total_earnings)?,
            })
        }
        .await;
        result.map_err(|e| {
            error!("Error getting video: {:#}", e);
            FilStreamError::provider("Failed to get video", e)
        })
    }

    pub async fn get_user_videos(&self, user: Address) -> Result<Vec<H256>> {
        self.platform.user_videos(user).await.map_err(|e| {
            error!("Error getting user videos: {:#}", e);
            FilStreamError::provider("Failed to get user videos", e)
        })
    }

    pub async fn pay_to_watch(&self, video_id: H256) -> Result<String> {
        info!(video_id = %bytes32_hex(&video_id), "Paying to watch video");
        let tx_hash = self.platform.pay_for_video(video_id).await.map_err(|e| {
            error!("Error paying for video: {:#}", e);
            FilStreamError::provider("Payment failed", e)
        })?;
        info!("Payment successful");
        Ok(bytes32_hex(&tx_hash))
    }

    /// Earnings in USDFC.
    pub async fn get_user_earnings(&self, user: Address) -> Result<String> {
        let result = async {
            let earnings = self.platform.user_earnings(user).await?;
            anyhow::Ok(wei_to_usdfc(earnings)?)
        }
        .await;
        result.map_err(|e| {
            error!("Error getting user earnings: {:#}", e);
            FilStreamError::provider("Failed to get earnings", e)
        })
    }

    /// Earnings of a single video in USDFC.
    pub async fn get_video_earnings(&self, video_id: H256) -> Result<String> {
        let result = async {
            let earnings = self.platform.video_earnings(video_id).await?;
            anyhow::Ok(wei_to_usdfc(earnings)?)
        }
        .await;
        result.map_err(|e| {
            error!("Error getting video earnings: {:#}", e);
            FilStreamError::provider("Failed to get video earnings", e)
        })
    }

    pub async fn withdraw_earnings(&self) -> Result<String> {
        info!("Withdrawing earnings");
        let tx_hash = self.platform.withdraw_earnings().await.map_err(|e| {
            error!("Error withdrawing earnings: {:#}", e);
            FilStreamError::provider("Withdrawal failed", e)
        })?;
        info!("Earnings withdrawn successfully");
        Ok(bytes32_hex(&tx_hash))
    }

    pub async fn get_video_stream_url(&self, video_id: H256, options: &StreamOptions) -> Result<String> {
        let video = self.get_video(video_id).await.map_err(|e| {
            error!("Error getting stream URL: {}", e);
            FilStreamError::provider("Failed to get stream URL", e)
        })?;
        Ok(self.cdn.get_video_stream_url(&video.cid, options))
    }

    /// The platform contract keeps no watch history, so this is always `false`.
    pub async fn has_watched_video(&self, video_id: H256, user: Address) -> bool {
        debug!(
            video_id = %bytes32_hex(&video_id),
            user = %address_hex(&user),
            "Watch history is not tracked on chain"
        );
        false
    }

    pub async fn get_platform_stats(&self) -> Result<PlatformStats> {
        let (total_videos, platform_fees) = tokio::try_join!(
            async {
                self.platform
                    .video_count()
                    .await
                    .provider_context("Failed to get video count")
            },
            self.usdfc.get_balance(self.platform.address()),
        )
        .map_err(|e| {
            error!("Error getting platform stats: {}", e);
            FilStreamError::provider("Failed to get platform stats", e)
        })?;

        Ok(PlatformStats {
            total_videos: total_videos.to_string(),
            platform_fees,
            storage_price: wei_to_usdfc(storage_price_per_week())?,
        })
    }

    pub async fn register_user(&self) -> Result<String> {
        info!("Registering user on platform");
        let tx_hash = self.platform.register_user().await.map_err(|e| {
            error!("Error registering user: {:#}", e);
            FilStreamError::provider("Registration failed", e)
        })?;
        info!("User registered successfully");
        Ok(bytes32_hex(&tx_hash))
    }

    /// Any failure reads as "not registered".
    pub async fn is_user_registered(&self, user: Address) -> bool {
        match self.platform.user(user).await {
            Ok(record) => record.is_registered,
            Err(e) => {
                warn!(user = %address_hex(&user), "Error checking user registration: {:#}", e);
                false
            }
        }
    }
}
