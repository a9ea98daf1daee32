//! Payment-protected resources. The x402 gate in front of these routes has already
//! verified the payment by the time a handler runs.

use crate::transport::http::types::{PaidContent, PayReport};
use axum::Json;

pub const PAID_MESSAGE: &str = "You have accessed a payment-protected resource!";

fn report() -> Json<PaidContent> {
    Json(PaidContent {
        report: PayReport {
            message: PAID_MESSAGE.to_string(),
            value: 42,
        },
    })
}

#[utoipa::path(
    get,
    path = "/api/pay",
    responses(
        (status = 200, description = "Paid content ($0.01)", body = PaidContent),
        (status = 402, description = "x402 payment required")
    )
)]
pub async fn pay_handler() -> Json<PaidContent> {
    report()
}

#[utoipa::path(
    get,
    path = "/api/pay/session",
    responses(
        (status = 200, description = "24-hour session tier ($1.00)", body = PaidContent),
        (status = 402, description = "x402 payment required")
    )
)]
pub async fn pay_session_handler() -> Json<PaidContent> {
    report()
}

#[utoipa::path(
    get,
    path = "/api/pay/onetime",
    responses(
        (status = 200, description = "One-time access ($0.10)", body = PaidContent),
        (status = 402, description = "x402 payment required")
    )
)]
pub async fn pay_onetime_handler() -> Json<PaidContent> {
    report()
}
