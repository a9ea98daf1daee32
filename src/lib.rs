pub mod app;
pub mod cdn;
pub mod domain;
pub mod error;
pub mod infra;
pub mod payments;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::ad_publisher::{AdCampaign, AdPublisher};
pub use app::filstream_manager::FilStreamManager;
pub use cdn::FilCdnService;
pub use error::{FilStreamError, UploadStep};
pub use payments::UsdfcService;
pub use storage::{IpfsClient, PdpService};
