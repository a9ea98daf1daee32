//! Centralized configuration (environment variables + defaults).

use ethers::types::Address;
use std::time::Duration;

use crate::payments::x402::Network;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn required_address(key: &str) -> anyhow::Result<Address> {
    let raw = std::env::var(key).map_err(|_| anyhow::anyhow!("{} must be set", key))?;
    raw.trim()
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("{} is not a valid address ({}): {}", key, raw, e))
}

/// JSON-RPC endpoint (defaults to Base Sepolia).
pub fn rpc_url() -> String {
    env_or("RPC_URL", Network::BaseSepolia.info().rpc_urls[0])
}

pub fn chain_id() -> u64 {
    std::env::var("CHAIN_ID")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(Network::BaseSepolia.info().chain_id)
}

/// FilStream platform contract address (required).
pub fn filstream_contract_address() -> anyhow::Result<Address> {
    required_address("FILSTREAM_CONTRACT_ADDRESS")
}

/// USDFC token contract address (required).
pub fn usdfc_address() -> anyhow::Result<Address> {
    required_address("USDFC_ADDRESS")
}

/// PDP storage provider contract address (required).
pub fn pdp_provider_address() -> anyhow::Result<Address> {
    required_address("PDP_PROVIDER_ADDRESS")
}

/// Hex private key of the signing wallet.
///
/// Read from `PRIVATE_KEY`, or else from the key file at `WALLET_KEY_PATH`
/// (default `~/.config/filstream/key`).
pub fn wallet_private_key() -> anyhow::Result<String> {
    if let Ok(key) = std::env::var("PRIVATE_KEY") {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }
    let path = env_or("WALLET_KEY_PATH", "~/.config/filstream/key");
    let expanded = shellexpand::tilde(&path).to_string();
    let key = std::fs::read_to_string(&expanded)
        .map_err(|e| anyhow::anyhow!("Failed to read wallet key file {}: {}", expanded, e))?;
    Ok(key.trim().to_string())
}

pub fn filcdn_base_url() -> String {
    env_or("FILCDN_BASE_URL", "https://filcdn.io")
}

/// IPFS HTTP RPC endpoint (defaults to Infura).
pub fn ipfs_api_url() -> String {
    env_or("IPFS_API_URL", "https://ipfs.infura.io:5001")
}

/// Basic-auth credentials for the IPFS endpoint, if both halves are set.
pub fn ipfs_credentials() -> Option<(String, String)> {
    let id = std::env::var("INFURA_IPFS_PROJECT_ID").ok()?;
    let secret = std::env::var("INFURA_IPFS_PROJECT_SECRET").ok()?;
    Some((id, secret))
}

pub fn ipfs_gateway_url() -> String {
    env_or("IPFS_GATEWAY_URL", "https://ipfs.io")
}

pub fn facilitator_url() -> String {
    env_or("FACILITATOR_URL", "https://x402.org/facilitator")
}

/// x402 network name (`base-sepolia` or `base`).
pub fn x402_network() -> String {
    env_or("NETWORK", "base-sepolia")
}

/// Wallet that receives x402 payments (required).
pub fn payee_address() -> anyhow::Result<Address> {
    required_address("ADDRESS")
}

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3001)
}

/// Timeout applied to outgoing HTTP requests (IPFS, FilCDN, facilitator).
pub fn http_timeout() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    Duration::from_secs(secs.max(1))
}

/// Shared reqwest client with the configured timeout.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(http_timeout()).build()?)
}
