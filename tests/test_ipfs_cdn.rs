//! IPFS ad packages and FilCDN REST calls against stub servers on ephemeral ports.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use filstream::app::ad_publisher::TargetAudience;
use filstream::cdn::filcdn::{AccessTokenOptions, PreloadOptions, DEFAULT_REGION};
use filstream::{AdCampaign, AdPublisher, FilCdnService, IpfsClient};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Content-addressed in name only: CIDs are handed out from a counter.
#[derive(Clone, Default)]
struct IpfsNode {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pinned: Arc<Mutex<Vec<String>>>,
}

fn fake_cid(n: usize) -> String {
    format!("Qm{:0>44}", n)
}

async fn add(State(node): State<IpfsNode>, mut multipart: Multipart) -> (StatusCode, String) {
    let Ok(Some(field)) = multipart.next_field().await else {
        return (StatusCode::BAD_REQUEST, "no file".to_string());
    };
    let name = field.file_name().unwrap_or_default().to_string();
    let Ok(bytes) = field.bytes().await else {
        return (StatusCode::BAD_REQUEST, "bad file".to_string());
    };
    let mut blobs = node.blobs.lock().unwrap();
    let cid = fake_cid(blobs.len() + 1);
    let size = bytes.len();
    blobs.insert(cid.clone(), bytes.to_vec());
    // Newline-delimited JSON, as the real node streams it.
    (
        StatusCode::OK,
        format!("{}\n", json!({ "Name": name, "Hash": cid, "Size": size.to_string() })),
    )
}

async fn cat(State(node): State<IpfsNode>, Query(q): Query<HashMap<String, String>>) -> (StatusCode, Vec<u8>) {
    let arg = q.get("arg").cloned().unwrap_or_default();
    match node.blobs.lock().unwrap().get(&arg) {
        Some(bytes) => (StatusCode::OK, bytes.clone()),
        None => (StatusCode::INTERNAL_SERVER_ERROR, b"merkledag: not found".to_vec()),
    }
}

async fn pin_add(State(node): State<IpfsNode>, Query(q): Query<HashMap<String, String>>) -> Json<JsonValue> {
    let arg = q.get("arg").cloned().unwrap_or_default();
    node.pinned.lock().unwrap().push(arg.clone());
    Json(json!({ "Pins": [arg] }))
}

async fn pin_rm() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "not pinned or pinned indirectly")
}

async fn ipfs_publisher() -> (AdPublisher, IpfsNode) {
    let node = IpfsNode::default();
    let url = serve(
        Router::new()
            .route("/api/v0/add", post(add))
            .route("/api/v0/cat", post(cat))
            .route("/api/v0/pin/add", post(pin_add))
            .route("/api/v0/pin/rm", post(pin_rm))
            .with_state(node.clone()),
    )
    .await;
    let client = IpfsClient::new(&url, reqwest::Client::new(), None).unwrap();
    (AdPublisher::new(client, "https://ipfs.io/"), node)
}

fn campaign() -> AdCampaign {
    AdCampaign {
        title: "Summer Sale - 50% Off Everything!".to_string(),
        description: "Our biggest sale of the year.".to_string(),
        category: "Retail".to_string(),
        advertiser_address: "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6".to_string(),
        budget: "1000".to_string(),
        target_audience: TargetAudience {
            age_range: "18-45".to_string(),
            interests: vec!["shopping".to_string(), "fashion".to_string()],
            location: "Global".to_string(),
        },
        duration: 30,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn complete_ad_links_media_into_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let (publisher, node) = ipfs_publisher().await;
    let dir = tempfile::tempdir()?;
    let video = dir.path().join("ad-video.mp4");
    let thumbnail = dir.path().join("ad-thumbnail.jpg");
    std::fs::write(&video, vec![1u8; 4096])?;
    std::fs::write(&thumbnail, vec![2u8; 512])?;

    let ad = AdCampaign {
        video_path: Some(video),
        thumbnail_path: Some(thumbnail),
        ..campaign()
    };
    let package = publisher.upload_complete_ad(&ad).await?;

    assert_eq!(package.video_cid.as_deref(), Some(fake_cid(1).as_str()));
    assert_eq!(package.thumbnail_cid.as_deref(), Some(fake_cid(2).as_str()));
    assert_eq!(package.metadata_cid, fake_cid(3));
    assert_eq!(node.blobs.lock().unwrap()[&fake_cid(1)].len(), 4096);

    let metadata = publisher.get_ad_metadata(&package.metadata_cid).await?;
    assert_eq!(metadata.name, "Summer Sale - 50% Off Everything!");
    assert_eq!(metadata.video_url, Some(format!("ipfs://{}", fake_cid(1))));
    assert_eq!(metadata.thumbnail_url, Some(format!("ipfs://{}", fake_cid(2))));
    assert_eq!(metadata.platform, "FilStream");
    assert_eq!(metadata.target_audience.interests, vec!["shopping", "fashion"]);

    assert_eq!(
        publisher.gateway_url(&package.metadata_cid),
        format!("https://ipfs.io/ipfs/{}", fake_cid(3))
    );
    for cid in package.cids() {
        publisher.ipfs().pin_content(cid).await?;
    }
    assert_eq!(node.pinned.lock().unwrap().len(), 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn metadata_only_ads_keep_their_urls() -> Result<(), Box<dyn std::error::Error>> {
    let (publisher, node) = ipfs_publisher().await;
    let ad = AdCampaign {
        video_url: Some("ipfs://QmVideoCID123456789".to_string()),
        ..campaign()
    };
    let package = publisher.upload_complete_ad(&ad).await?;
    assert_eq!(package.video_cid, None);
    assert_eq!(package.cids(), vec![package.metadata_cid.as_str()]);

    let metadata = publisher.get_ad_metadata(&package.metadata_cid).await?;
    assert_eq!(metadata.video_url.as_deref(), Some("ipfs://QmVideoCID123456789"));
    assert_eq!(metadata.thumbnail_url, None);

    // Absent media URLs are left out of the stored document, not written as null.
    let stored: JsonValue = serde_json::from_slice(&node.blobs.lock().unwrap()[&package.metadata_cid])?;
    assert_eq!(stored["videoUrl"], "ipfs://QmVideoCID123456789");
    assert!(stored.get("thumbnailUrl").is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ipfs_failures_carry_their_prefixes() {
    let (publisher, _node) = ipfs_publisher().await;

    let err = publisher.get_ad_metadata(&fake_cid(99)).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Failed to retrieve ad metadata from IPFS: IPFS node returned 500"));

    let err = publisher.ipfs().unpin_content(&fake_cid(1)).await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to unpin content from IPFS: "));

    let ad = AdCampaign {
        video_path: Some("/definitely/not/here.mp4".into()),
        ..campaign()
    };
    let err = publisher.upload_complete_ad(&ad).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Failed to upload complete ad package to IPFS: Failed to upload ad video to IPFS: "));
}

#[derive(Clone, Default)]
struct CdnRecorder {
    bodies: Arc<Mutex<Vec<JsonValue>>>,
}

async fn cdn_status(Path(cid): Path<String>) -> Json<JsonValue> {
    Json(json!({ "cid": cid, "available": cid.starts_with("Qm") }))
}

async fn cdn_metadata(Path(cid): Path<String>) -> (StatusCode, Json<JsonValue>) {
    if cid == "missing" {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
    } else {
        (StatusCode::OK, Json(json!({ "duration": 42, "cid": cid })))
    }
}

async fn cdn_region(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<JsonValue>) {
    match q.get("ip").map(String::as_str) {
        Some("10.0.0.1") => (StatusCode::OK, Json(json!({ "region": "eu-west-1" }))),
        _ => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
    }
}

async fn cdn_preload(State(rec): State<CdnRecorder>, Json(body): Json<JsonValue>) -> Json<JsonValue> {
    rec.bodies.lock().unwrap().push(body);
    Json(json!({ "queued": true }))
}

async fn cdn_token(State(rec): State<CdnRecorder>, Json(body): Json<JsonValue>) -> Json<JsonValue> {
    rec.bodies.lock().unwrap().push(body);
    Json(json!({ "token": "tok_123" }))
}

async fn cdn_service() -> (FilCdnService, CdnRecorder) {
    let recorder = CdnRecorder::default();
    let url = serve(
        Router::new()
            .route("/status/:cid", get(cdn_status))
            .route("/metadata/:cid", get(cdn_metadata))
            .route("/region/optimal", get(cdn_region))
            .route("/preload/:cid", post(cdn_preload))
            .route("/token/:cid", post(cdn_token))
            .with_state(recorder.clone()),
    )
    .await;
    (FilCdnService::new(&url, reqwest::Client::new()).unwrap(), recorder)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cdn_reads_and_fallbacks() {
    let (cdn, _) = cdn_service().await;

    assert!(cdn.is_content_available("QmAvailable").await);
    assert!(!cdn.is_content_available("bafyPending").await);

    let metadata = cdn.get_video_metadata("QmAvailable").await.unwrap();
    assert_eq!(metadata["duration"], 42);
    let err = cdn.get_video_metadata("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get video metadata: HTTP error! status: 404");

    // No stats route on the stub: the 404 surfaces with the prefix.
    let err = cdn.get_delivery_stats("QmAvailable").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get delivery stats: HTTP error! status: 404");

    assert_eq!(cdn.get_optimal_region(Some("10.0.0.1")).await, "eu-west-1");
    assert_eq!(cdn.get_optimal_region(None).await, DEFAULT_REGION);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cdn_writes_send_their_option_bodies() {
    let (cdn, recorder) = cdn_service().await;

    let queued = cdn.preload_content("QmAvailable", &PreloadOptions::default()).await.unwrap();
    assert_eq!(queued["queued"], true);
    let token = cdn
        .get_access_token("QmAvailable", &AccessTokenOptions::default())
        .await
        .unwrap();
    assert_eq!(token, "tok_123");

    let bodies = recorder.bodies.lock().unwrap().clone();
    assert_eq!(
        bodies[0],
        json!({ "regions": ["us-east-1", "us-west-1", "eu-west-1"], "priority": "normal" })
    );
    assert_eq!(bodies[1], json!({ "expiresIn": 3600, "permissions": ["read"] }));
}
