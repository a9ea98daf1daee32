//! Uploads an ad package (video, thumbnail, metadata) to IPFS and pins it.
//!
//! ```text
//! cargo run --bin ad_upload -- --title "Summer Sale" --video ad.mp4 --thumbnail ad.jpg
//! cargo run --bin ad_upload -- --metadata <cid>
//! ```

use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use filstream::app::ad_publisher::TargetAudience;
use filstream::domain::cid::is_valid_cid;
use filstream::infra::config;
use filstream::{AdCampaign, AdPublisher, IpfsClient};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage:\n\
           ad_upload --title <title> [--description <text>] [--category <name>]\n\
                     [--advertiser <address>] [--budget <usdfc>] [--duration <secs>]\n\
                     [--video <path>] [--thumbnail <path>]\n\
           ad_upload --metadata <cid>\n\
         \n\
         Env vars: IPFS_API_URL, IPFS_GATEWAY_URL,\n\
           INFURA_IPFS_PROJECT_ID / INFURA_IPFS_PROJECT_SECRET (optional)\n"
    );
    std::process::exit(2);
}

fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let publisher = AdPublisher::new(IpfsClient::from_env()?, config::ipfs_gateway_url());

    if let Some(cid) = flag(&args, "--metadata") {
        if !is_valid_cid(&cid) {
            return Err(anyhow::anyhow!("Invalid CID format: {}", cid));
        }
        let metadata = publisher.get_ad_metadata(&cid).await?;
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    let Some(title) = flag(&args, "--title") else {
        usage_and_exit();
    };
    let duration = match flag(&args, "--duration") {
        Some(d) => d
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("--duration must be whole seconds: {}", e))?,
        None => 30,
    };

    let ad = AdCampaign {
        title,
        description: flag(&args, "--description").unwrap_or_default(),
        category: flag(&args, "--category").unwrap_or_else(|| "General".to_string()),
        advertiser_address: flag(&args, "--advertiser").unwrap_or_default(),
        budget: flag(&args, "--budget").unwrap_or_else(|| "0".to_string()),
        target_audience: TargetAudience {
            age_range: "18+".to_string(),
            interests: Vec::new(),
            location: "Global".to_string(),
        },
        duration,
        video_path: flag(&args, "--video").map(PathBuf::from),
        thumbnail_path: flag(&args, "--thumbnail").map(PathBuf::from),
        ..Default::default()
    };

    info!(title = %ad.title, "Starting ad upload to IPFS");
    let package = publisher.upload_complete_ad(&ad).await?;

    println!("> Upload results:");
    println!("  Video CID:     {}", package.video_cid.as_deref().unwrap_or("-"));
    println!("  Thumbnail CID: {}", package.thumbnail_cid.as_deref().unwrap_or("-"));
    println!("  Metadata CID:  {}", package.metadata_cid);

    println!("> Gateway URLs:");
    for cid in package.cids() {
        println!("  {}", publisher.gateway_url(cid));
    }

    for cid in package.cids() {
        publisher.ipfs().pin_content(cid).await?;
    }
    println!("> Content pinned to IPFS");
    Ok(())
}
