//! Types and pure helpers shared by the services: record views, unit conversion,
//! identifier parsing and the seams over the external contracts.

pub mod cid;
pub mod events;
pub mod ids;
pub mod ports;
pub mod pricing;
pub mod units;
pub mod video;

pub use ports::{PlatformContract, StorageContract, TokenContract, TransferWatch, TxReceipt};
