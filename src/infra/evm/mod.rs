//! ethers-backed implementations of the contract seams in `domain::ports`.

pub mod client;
pub mod contracts;
pub mod platform;
pub mod storage;
pub mod token;

pub use client::{connect, EvmClient};
pub use platform::FilStreamPlatformContract;
pub use storage::PdpStorageContract;
pub use token::UsdfcTokenContract;
