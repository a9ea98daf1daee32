//! x402 payment gate for axum routes.
//!
//! Requests to a priced route must carry an `X-PAYMENT` header. Without one (or with
//! one the facilitator rejects) the route answers `402 Payment Required` with the
//! accepted payment requirements. A verified payment lets the handler run; on a
//! successful response the payment is settled and the settlement is returned in
//! `X-PAYMENT-RESPONSE`.

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ethers::types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::ids::address_hex;
use crate::infra::config;
use crate::payments::x402::{
    FacilitatorClient, Network, PaymentPayload, PaymentRequired, PaymentRequirements, PAYMENT_HEADER,
    PAYMENT_RESPONSE_HEADER, X402_VERSION,
};

#[derive(Debug, Clone)]
pub struct PricedRoute {
    /// Dollar price, e.g. `"$0.01"`.
    pub price: String,
    pub description: String,
}

#[derive(Clone)]
pub struct PaymentGate {
    routes: Arc<HashMap<String, PricedRoute>>,
    pay_to: String,
    network: Network,
    facilitator: FacilitatorClient,
}

impl PaymentGate {
    pub fn new(pay_to: Address, network: Network, facilitator: FacilitatorClient) -> Self {
        Self {
            routes: Arc::new(HashMap::new()),
            pay_to: address_hex(&pay_to),
            network,
            facilitator,
        }
    }

    /// FilStream's priced routes: pay-protected content, a 24-hour session tier and
    /// a one-time tier.
    pub fn with_filstream_routes(self) -> Self {
        self.with_route("/api/pay", "$0.01", "Access to pay-protected content")
            .with_route("/api/pay/session", "$1.00", "24-hour session access")
            .with_route("/api/pay/onetime", "$0.10", "One-time access")
    }

    pub fn with_route(mut self, path: &str, price: &str, description: &str) -> Self {
        Arc::make_mut(&mut self.routes).insert(
            path.to_string(),
            PricedRoute {
                price: price.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let network = config::x402_network().parse::<Network>()?;
        let facilitator = FacilitatorClient::new(&config::facilitator_url(), config::http_client()?);
        Ok(Self::new(config::payee_address()?, network, facilitator).with_filstream_routes())
    }

    pub fn price_of(&self, path: &str) -> Option<&PricedRoute> {
        self.routes.get(path)
    }

    fn requirements(&self, path: &str, route: &PricedRoute, headers: &HeaderMap) -> anyhow::Result<PaymentRequirements> {
        let host = headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("http");
        let resource = format!("{scheme}://{host}{path}");
        Ok(PaymentRequirements::exact_usdc(
            self.network,
            &route.price,
            &self.pay_to,
            &resource,
            &route.description,
        )?)
    }
}

fn payment_required(error: impl Into<String>, requirements: PaymentRequirements) -> Response {
    let body = PaymentRequired {
        x402_version: X402_VERSION,
        error: error.into(),
        accepts: vec![requirements],
    };
    (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
}

pub async fn require_payment(State(gate): State<PaymentGate>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let Some(route) = gate.price_of(&path).cloned() else {
        return next.run(request).await;
    };

    let requirements = match gate.requirements(&path, &route, request.headers()) {
        Ok(r) => r,
        Err(e) => {
            error!(%path, "Invalid price configuration: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Some(header) = request.headers().get(PAYMENT_HEADER) else {
        return payment_required("X-PAYMENT header is required", requirements);
    };
    let payload = match header
        .to_str()
        .map_err(anyhow::Error::from)
        .and_then(PaymentPayload::from_header)
    {
        Ok(p) => p,
        Err(e) => return payment_required(e.to_string(), requirements),
    };

    match gate.facilitator.verify(&payload, &requirements).await {
        Ok(v) if v.is_valid => {
            info!(%path, payer = ?v.payer, "x402 payment verified");
        }
        Ok(v) => {
            let reason = v.invalid_reason.unwrap_or_else(|| "payment rejected".to_string());
            warn!(%path, %reason, "x402 payment invalid");
            return payment_required(reason, requirements);
        }
        Err(e) => {
            warn!(%path, "x402 verification failed: {:#}", e);
            return payment_required(format!("Payment verification failed: {e}"), requirements);
        }
    }

    let mut response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let settlement = match gate.facilitator.settle(&payload, &requirements).await {
        Ok(s) if s.success => s,
        Ok(s) => {
            let reason = s.error_reason.unwrap_or_else(|| "settlement failed".to_string());
            warn!(%path, %reason, "x402 settlement rejected");
            return payment_required(reason, requirements);
        }
        Err(e) => {
            warn!(%path, "x402 settlement failed: {:#}", e);
            return payment_required(format!("Payment settlement failed: {e}"), requirements);
        }
    };

    match settlement
        .to_header()
        .map_err(anyhow::Error::from)
        .and_then(|v| HeaderValue::from_str(&v).map_err(anyhow::Error::from))
    {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-payment-response"), value);
        }
        Err(e) => error!("Failed to encode {} header: {:#}", PAYMENT_RESPONSE_HEADER, e),
    }
    info!(%path, tx = %settlement.transaction, "x402 payment settled");
    response
}
