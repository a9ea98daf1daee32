pub mod ad_publisher;
pub mod filstream_manager;

pub use ad_publisher::{AdCampaign, AdPublisher};
pub use filstream_manager::FilStreamManager;
