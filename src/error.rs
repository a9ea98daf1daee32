//! Error type shared by the FilStream services.
//!
//! Every wrapper around an external provider turns a provider failure into
//! [`FilStreamError::Provider`], whose message starts with a fixed, operation-specific
//! prefix (e.g. `"Payment failed: ..."`).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilStreamError>;

/// The five side-effecting steps of the video upload flow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStep {
    StoreContent,
    GenerateCdnUrl,
    CheckBalance,
    Register,
    Pay,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStep::StoreContent => "store content on PDP",
            UploadStep::GenerateCdnUrl => "generate FilCDN URL",
            UploadStep::CheckBalance => "check USDFC balance",
            UploadStep::Register => "register video on chain",
            UploadStep::Pay => "pay for video",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FilStreamError {
    /// An external call (contract, IPFS node, CDN, facilitator) failed.
    #[error("{context}: {message}")]
    Provider {
        context: &'static str,
        message: String,
    },

    #[error("Insufficient USDFC balance. Need {required} USDFC for storage.")]
    InsufficientBalance { required: String },

    #[error("Invalid CID: {0}")]
    InvalidCid(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Rejected before any upload; `context` is the operation prefix.
    #[error("{context}: File size {size} bytes is outside the allowed range {min}..={max}")]
    FileSize {
        context: &'static str,
        size: u64,
        min: u64,
        max: u64,
    },

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("{event} event not found in transaction receipt")]
    MissingEvent { event: &'static str },

    /// The upload flow stopped at `step`; the steps in `completed` were already
    /// committed and are not rolled back.
    #[error("Upload failed: {source}")]
    UploadFailed {
        step: UploadStep,
        completed: Vec<UploadStep>,
        #[source]
        source: Box<FilStreamError>,
    },
}

impl FilStreamError {
    pub fn provider(context: &'static str, err: impl fmt::Display) -> Self {
        FilStreamError::Provider {
            context,
            message: format!("{err:#}"),
        }
    }
}

/// Attaches an operation prefix to any displayable failure.
pub trait ProviderContext<T> {
    fn provider_context(self, context: &'static str) -> Result<T>;
}

impl<T, E: fmt::Display> ProviderContext<T> for std::result::Result<T, E> {
    fn provider_context(self, context: &'static str) -> Result<T> {
        self.map_err(|e| FilStreamError::provider(context, e))
    }
}
