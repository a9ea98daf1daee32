//! USDFC token payments and x402 payment-gated access.

pub mod usdfc;
pub mod x402;

pub use usdfc::{TransferFeed, UsdfcService};
