use crate::cdn::filcdn::StreamOptions;
use crate::domain::ids::{address_hex, bytes32_hex, parse_address, parse_bytes32};
use crate::domain::video::{PlatformStats, UploadReceipt, VideoDetails, VideoMetadata};
use crate::transport::http::handlers::common::{error_message, error_response, ok};
use crate::transport::http::types::{ApiResponse, AppState, Earnings, VideoList, VideoListQuery, VideoUploadForm};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use tracing::info;

#[utoipa::path(
    post,
    path = "/api/video/upload",
    request_body(content = VideoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored, registered and paid for", body = UploadReceipt),
        (status = 400, description = "Missing field or file size out of range", body = ApiResponse),
        (status = 402, description = "Signer cannot cover one week of storage", body = ApiResponse),
        (status = 502, description = "A provider call failed; `data` lists committed steps", body = ApiResponse)
    )
)]
pub async fn upload_video_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut file: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_message(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {}", e)),
        };
        let name = field.name().unwrap_or_default().to_string();
        let result = match name.as_str() {
            "title" => field.text().await.map(|t| title = Some(t)),
            "description" => field.text().await.map(|d| description = d),
            "file" => field.bytes().await.map(|b| file = Some(b.to_vec())),
            _ => Ok(()),
        };
        if let Err(e) = result {
            return error_message(StatusCode::BAD_REQUEST, format!("Invalid field '{}': {}", name, e));
        }
    }

    let Some(title) = title.filter(|t| !t.trim().is_empty()) else {
        return error_message(StatusCode::BAD_REQUEST, "title is required");
    };
    let Some(file) = file else {
        return error_message(StatusCode::BAD_REQUEST, "file is required");
    };

    info!(%title, bytes = file.len(), "Received video upload");
    match state
        .manager
        .upload_video(file, VideoMetadata { title, description })
        .await
    {
        Ok(receipt) => ok(receipt),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/video/list",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Video ids created by the user", body = VideoList),
        (status = 400, description = "Invalid address", body = ApiResponse),
        (status = 502, description = "Contract call failed", body = ApiResponse)
    )
)]
pub async fn list_videos_handler(State(state): State<AppState>, Query(query): Query<VideoListQuery>) -> Response {
    let user = match parse_address(&query.user) {
        Ok(a) => a,
        Err(e) => return error_response(e),
    };
    match state.manager.get_user_videos(user).await {
        Ok(ids) => ok(VideoList {
            user: address_hex(&user),
            video_ids: ids.iter().map(bytes32_hex).collect(),
        }),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/video/{id}",
    params(("id" = String, Path, description = "bytes32 video id")),
    responses(
        (status = 200, description = "Video record with CDN and thumbnail URLs", body = VideoDetails),
        (status = 400, description = "Invalid video id", body = ApiResponse),
        (status = 502, description = "Contract call failed", body = ApiResponse)
    )
)]
pub async fn get_video_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let video_id = match parse_bytes32(&id) {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };
    match state.manager.get_video(video_id).await {
        Ok(video) => ok(video),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/video/{id}/stream-url",
    params(
        ("id" = String, Path, description = "bytes32 video id"),
        ("quality" = Option<String>, Query, description = "Defaults to `auto`"),
        ("format" = Option<String>, Query, description = "Defaults to `mp4`"),
        ("adaptive" = Option<bool>, Query, description = "Defaults to `true`")
    ),
    responses(
        (status = 200, description = "FilCDN streaming URL", body = ApiResponse),
        (status = 400, description = "Invalid video id", body = ApiResponse),
        (status = 502, description = "Contract call failed", body = ApiResponse)
    )
)]
pub async fn stream_url_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(options): Query<StreamOptions>,
) -> Response {
    let video_id = match parse_bytes32(&id) {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };
    match state.manager.get_video_stream_url(video_id, &options).await {
        Ok(url) => ok(serde_json::json!({ "videoId": bytes32_hex(&video_id), "streamUrl": url })),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{address}/earnings",
    params(("address" = String, Path, description = "Creator address")),
    responses(
        (status = 200, description = "Accumulated earnings in USDFC", body = Earnings),
        (status = 400, description = "Invalid address", body = ApiResponse),
        (status = 502, description = "Contract call failed", body = ApiResponse)
    )
)]
pub async fn user_earnings_handler(State(state): State<AppState>, Path(address): Path<String>) -> Response {
    let user = match parse_address(&address) {
        Ok(a) => a,
        Err(e) => return error_response(e),
    };
    match state.manager.get_user_earnings(user).await {
        Ok(earnings) => ok(Earnings {
            address: address_hex(&user),
            earnings,
        }),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Platform totals", body = PlatformStats),
        (status = 502, description = "Contract call failed", body = ApiResponse)
    )
)]
pub async fn platform_stats_handler(State(state): State<AppState>) -> Response {
    match state.manager.get_platform_stats().await {
        Ok(stats) => ok(stats),
        Err(e) => error_response(e),
    }
}
