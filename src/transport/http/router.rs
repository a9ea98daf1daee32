use crate::domain::pricing::MAX_FILE_SIZE;
use crate::domain::video::{PlatformStats, UploadReceipt, UploadSummary, VideoDetails};
use crate::transport::http::handlers::{cdn, health, pay, tokens, videos};
use crate::transport::http::types::{
    ApiResponse, AppState, Balance, CdnUrls, Earnings, PaidContent, PayReport, VideoList, VideoUploadForm,
};
use crate::transport::x402::require_payment;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Room for the multipart framing and text fields around the largest accepted video.
const UPLOAD_BODY_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        videos::upload_video_handler,
        videos::list_videos_handler,
        videos::get_video_handler,
        videos::stream_url_handler,
        videos::user_earnings_handler,
        videos::platform_stats_handler,
        cdn::get_cdn_url_handler,
        tokens::balance_handler,
        pay::pay_handler,
        pay::pay_session_handler,
        pay::pay_onetime_handler
    ),
    components(schemas(
        ApiResponse,
        VideoUploadForm,
        UploadReceipt,
        UploadSummary,
        VideoDetails,
        VideoList,
        PlatformStats,
        Earnings,
        Balance,
        CdnUrls,
        PaidContent,
        PayReport
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let paid = Router::new()
        .route("/api/pay", get(pay::pay_handler))
        .route("/api/pay/session", get(pay::pay_session_handler))
        .route("/api/pay/onetime", get(pay::pay_onetime_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.payment_gate.clone(),
            require_payment,
        ));

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/video/upload",
            post(videos::upload_video_handler)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE as usize + UPLOAD_BODY_OVERHEAD)),
        )
        .route("/api/video/list", get(videos::list_videos_handler))
        .route("/api/video/:id", get(videos::get_video_handler))
        .route("/api/video/:id/stream-url", get(videos::stream_url_handler))
        .route("/api/users/:address/earnings", get(videos::user_earnings_handler))
        .route("/api/stats", get(videos::platform_stats_handler))
        .route("/api/filcdn/get-url", get(cdn::get_cdn_url_handler))
        .route("/api/usdfc/balance/:address", get(tokens::balance_handler))
        .merge(paid)
        .with_state(app_state)
}
