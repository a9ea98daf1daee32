pub mod http;
pub mod x402;

pub use x402::{require_payment, PaymentGate};
