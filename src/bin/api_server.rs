// src/bin/api_server.rs

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use filstream::domain::ids::address_hex;
use filstream::infra::config;
use filstream::transport;
use filstream::transport::PaymentGate;
use filstream::FilStreamManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Service Initialization ---
    info!("Connecting FilStream contracts...");
    let manager = FilStreamManager::from_env().await?;
    info!(
        contract = %address_hex(&manager.contract_address()),
        signer = %address_hex(&manager.usdfc().signer_address()),
        "FilStreamManager initialized"
    );
    if let Err(e) = manager.ping().await {
        // The health route reports this too; serving continues so the API can be inspected.
        error!("Startup contract check failed: {}", e);
    }

    let payment_gate = PaymentGate::from_env()?;
    info!(
        facilitator = %config::facilitator_url(),
        network = %config::x402_network(),
        "x402 payment gate configured for /api/pay routes"
    );

    let app_state = transport::http::AppState {
        manager: Arc::new(manager),
        payment_gate,
    };

    // --- API Server Initialization ---
    let port = config::server_port();
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);
    info!("Swagger UI available at http://localhost:{}/swagger-ui", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received, draining connections");
        })
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}
