use crate::cdn::filcdn::{ContentOptions, ManifestOptions, StreamOptions, ThumbnailOptions};
use crate::domain::cid::is_valid_cid;
use crate::domain::ids::{bytes32_hex, parse_bytes32};
use crate::error::FilStreamError;
use crate::transport::http::handlers::common::{error_response, ok};
use crate::transport::http::types::{ApiResponse, AppState, CdnUrlQuery, CdnUrls};
use axum::extract::{Query, State};
use axum::response::Response;

#[utoipa::path(
    get,
    path = "/api/filcdn/get-url",
    params(CdnUrlQuery),
    responses(
        (status = 200, description = "Content, stream, thumbnail, HLS and DASH URLs", body = CdnUrls),
        (status = 400, description = "Not an IPFS CID or 32-byte hex id", body = ApiResponse)
    )
)]
pub async fn get_cdn_url_handler(State(state): State<AppState>, Query(query): Query<CdnUrlQuery>) -> Response {
    let cid = query.cid.trim();
    let cid = if is_valid_cid(cid) {
        cid.to_string()
    } else {
        match parse_bytes32(cid) {
            Ok(id) => bytes32_hex(&id),
            Err(_) => return error_response(FilStreamError::InvalidCid(query.cid.clone())),
        }
    };

    let cdn = state.manager.cdn();
    let manifest = ManifestOptions::default();
    ok(CdnUrls {
        cdn_url: cdn.generate_url(&cid, &ContentOptions::default()),
        stream_url: cdn.get_video_stream_url(&cid, &StreamOptions::default()),
        thumbnail_url: cdn.get_thumbnail_url(&cid, &ThumbnailOptions::default()),
        hls_url: cdn.get_hls_playlist_url(&cid, &manifest),
        dash_url: cdn.get_dash_manifest_url(&cid, &manifest),
        cid,
    })
}
