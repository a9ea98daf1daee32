use ethers::providers::Middleware;
use ethers::types::Address;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use filstream::domain::ids::address_hex;
use filstream::domain::units::format_units;
use filstream::infra::config;
use filstream::infra::evm::{self, EvmClient, UsdfcTokenContract};
use filstream::payments::x402::Network;
use filstream::UsdfcService;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Requires env vars:\n\
           FILSTREAM_CONTRACT_ADDRESS, USDFC_ADDRESS, PDP_PROVIDER_ADDRESS, ADDRESS\n\
         Optional:\n\
           RPC_URL (default https://sepolia.base.org), CHAIN_ID (default 84532)\n\
         And a signer key in PRIVATE_KEY or at WALLET_KEY_PATH\n\
           (default ~/.config/filstream/key)\n"
    );
    std::process::exit(2);
}

/// A contract address is usable only if code is deployed there.
async fn check_code(client: &EvmClient, label: &str, address: Address) -> anyhow::Result<()> {
    let code = client
        .get_code(address, None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read code at {} ({}): {}", label, address_hex(&address), e))?;
    if code.as_ref().is_empty() {
        return Err(anyhow::anyhow!(
            "{} has no contract code at {}",
            label,
            address_hex(&address)
        ));
    }
    println!("  {} deployed at {} ({} bytes)", label, address_hex(&address), code.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let rpc_url = config::rpc_url();
    let expected_chain = config::chain_id();
    let platform = config::filstream_contract_address()?;
    let usdfc = config::usdfc_address()?;
    let pdp = config::pdp_provider_address()?;
    let payee = config::payee_address()?;

    println!("> Preflight:");
    println!("  RPC_URL={}", rpc_url);
    println!("  CHAIN_ID={}", expected_chain);
    let network: Network = config::x402_network().parse()?;
    let chain = network.info();
    println!("  x402 payee={} network={}", address_hex(&payee), network);
    println!(
        "  x402 chain: {} (id {}), explorer {}",
        chain.chain_name,
        chain.chain_id_hex(),
        chain.block_explorer_urls.join(", ")
    );

    let client = evm::connect().await?;

    // Basic RPC connectivity
    let chain_id = client.get_chainid().await?;
    println!("  RPC chain id: {}", chain_id);
    if chain_id.as_u64() != expected_chain {
        return Err(anyhow::anyhow!(
            "RPC reports chain id {} but CHAIN_ID is {}",
            chain_id,
            expected_chain
        ));
    }

    // Signer balance
    let signer = client.address();
    let balance = client.get_balance(signer, None).await?;
    println!("  Signer: {}", address_hex(&signer));
    println!("  Signer balance: {} ETH", format_units(balance, 18)?);
    if balance.is_zero() {
        eprintln!("  Warning: signer has no gas; transactions will fail.");
    }

    // Contract code
    check_code(&client, "FilStream contract", platform).await?;
    check_code(&client, "USDFC token", usdfc).await?;
    check_code(&client, "PDP provider", pdp).await?;

    // Token readable
    let service = UsdfcService::new(Arc::new(UsdfcTokenContract::new(usdfc, client.clone())));
    let info = service.get_token_info().await?;
    println!("  Token: {} ({}), {} decimals", info.name, info.symbol, info.decimals);
    let usdfc_balance = service.get_current_user_balance().await?;
    println!("  Signer USDFC balance: {} {}", usdfc_balance, info.symbol);

    println!("> Preflight OK.");
    Ok(())
}
