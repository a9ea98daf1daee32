//! PDP (Provider Data Protocol) storage on Filecoin.
//!
//! Data goes to the PDP contract as a `store(bytes)` transaction; the content id the
//! contract assigns is read back from the receipt's `DataStored` log.

use ethers::types::{H256, U256};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cdn::filcdn::{ContentOptions, FilCdnService};
use crate::domain::events::{extract_content_id, DATA_STORED_EVENT};
use crate::domain::ids::bytes32_hex;
use crate::domain::ports::StorageContract;
use crate::domain::pricing::{file_size_allowed, MAX_FILE_SIZE, MIN_FILE_SIZE};
use crate::domain::video::{StoredContent, StoredVideo};
use crate::error::{FilStreamError, ProviderContext, Result};

#[derive(Clone)]
pub struct PdpService {
    contract: Arc<dyn StorageContract>,
    cdn: FilCdnService,
}

impl PdpService {
    pub fn new(contract: Arc<dyn StorageContract>, cdn: FilCdnService) -> Self {
        Self { contract, cdn }
    }

    /// Stores `data` and returns the content id assigned by the contract.
    pub async fn upload_data(&self, data: Vec<u8>) -> Result<(H256, StoredContent)> {
        info!(bytes = data.len(), "Uploading data to Filecoin PDP");
        let size = data.len() as u64;
        let result = async {
            let receipt = self.contract.store(data).await?;
            let cid = extract_content_id(&receipt.logs).ok_or(FilStreamError::MissingEvent {
                event: DATA_STORED_EVENT,
            })?;
            anyhow::Ok((cid, receipt.transaction_hash))
        }
        .await;

        match result {
            Ok((cid, tx_hash)) => {
                info!(cid = %bytes32_hex(&cid), "Data uploaded successfully");
                Ok((
                    cid,
                    StoredContent {
                        cid: bytes32_hex(&cid),
                        size,
                        transaction_hash: bytes32_hex(&tx_hash),
                    },
                ))
            }
            Err(e) => {
                error!("Error uploading to PDP: {:#}", e);
                Err(FilStreamError::provider("PDP upload failed", e))
            }
        }
    }

    pub async fn retrieve_data(&self, cid: H256) -> Result<Vec<u8>> {
        info!(cid = %bytes32_hex(&cid), "Retrieving data from Filecoin PDP");
        let data = self.contract.retrieve(cid).await.map_err(|e| {
            error!("Error retrieving from PDP: {:#}", e);
            FilStreamError::provider("PDP retrieval failed", e)
        })?;
        info!(bytes = data.len(), "Data retrieved successfully");
        Ok(data)
    }

    /// Storage price in wei, as a decimal string.
    pub async fn get_storage_price(&self) -> Result<String> {
        let price = self
            .contract
            .storage_price()
            .await
            .provider_context("Failed to get storage price")?;
        Ok(price.to_string())
    }

    pub async fn pay_for_storage(&self, cid: H256, amount: U256) -> Result<String> {
        info!(cid = %bytes32_hex(&cid), amount = %amount, "Paying for storage");
        let tx_hash = self.contract.pay_for_storage(cid, amount).await.map_err(|e| {
            error!("Error paying for storage: {:#}", e);
            FilStreamError::provider("Storage payment failed", e)
        })?;
        info!("Storage payment successful");
        Ok(bytes32_hex(&tx_hash))
    }

    /// Size-checked upload of an in-memory video. Returns the raw content id as well
    /// so callers can hand it straight to the platform contract.
    pub async fn upload_video_bytes(&self, data: Vec<u8>) -> Result<(H256, StoredVideo)> {
        let size = data.len() as u64;
        if !file_size_allowed(size) {
            warn!(size, "Rejected video outside the accepted size range");
            return Err(FilStreamError::FileSize {
                context: "Video upload failed",
                size,
                min: MIN_FILE_SIZE,
                max: MAX_FILE_SIZE,
            });
        }

        let (cid, stored) = self.upload_data(data).await.map_err(|e| {
            error!("Error uploading video: {}", e);
            FilStreamError::provider("Video upload failed", e)
        })?;
        let url = self.cdn.generate_url(&stored.cid, &ContentOptions::default());
        Ok((
            cid,
            StoredVideo {
                cid: stored.cid,
                size: stored.size,
                url,
                transaction_hash: stored.transaction_hash,
            },
        ))
    }

    pub async fn upload_video(&self, path: &Path) -> Result<StoredVideo> {
        info!(path = %path.display(), "Uploading video to Filecoin PDP");
        let data = tokio::fs::read(path)
            .await
            .provider_context("Video upload failed")?;
        let (_, stored) = self.upload_video_bytes(data).await?;
        Ok(stored)
    }

    /// Retrieves `cid` and compares it byte for byte. A failed retrieval counts as a mismatch.
    pub async fn verify_data_integrity(&self, cid: H256, original: &[u8]) -> bool {
        match self.retrieve_data(cid).await {
            Ok(retrieved) => retrieved == original,
            Err(e) => {
                warn!("Error verifying data integrity: {}", e);
                false
            }
        }
    }
}
