//! USDFC service behavior over an in-memory token.

mod common;

use common::{usdfc, CallLog, FakePlatform, FakeToken};
use ethers::types::{Address, H256, U256};
use filstream::domain::ports::RawTransfer;
use filstream::domain::ids::bytes32_hex;
use filstream::UsdfcService;
use std::sync::Arc;

fn fake_token(balance: U256, broken: bool) -> (FakeToken, CallLog, Address) {
    let log = CallLog::default();
    let signer = Address::repeat_byte(0xaa);
    let fake = FakeToken {
        log: log.clone(),
        signer,
        balance,
        broken,
        transfers: vec![
            RawTransfer {
                from: signer,
                to: Address::repeat_byte(0x01),
                value: U256::exp10(17) * 15,
                transaction_hash: Some(H256::repeat_byte(0x44)),
            },
            RawTransfer {
                from: Address::repeat_byte(0x02),
                to: signer,
                value: usdfc(9),
                transaction_hash: None,
            },
        ],
        refuse_filters: false,
    };
    (fake, log, signer)
}

fn token(balance: U256, broken: bool) -> (UsdfcService, CallLog, Address) {
    let (fake, log, signer) = fake_token(balance, broken);
    (UsdfcService::new(Arc::new(fake)), log, signer)
}

#[tokio::test]
async fn balances_render_as_decimal_tokens() {
    let (service, _, signer) = token(usdfc(42) + U256::exp10(16) * 25, false);
    assert_eq!(service.get_balance(signer).await.unwrap(), "42.25");
    assert_eq!(service.get_current_user_balance().await.unwrap(), "42.25");
    assert_eq!(service.get_allowance(signer, Address::zero()).await.unwrap(), "20.0");
}

#[tokio::test]
async fn sufficiency_is_an_exact_base_unit_comparison() {
    let (service, _, _) = token(usdfc(20), false);
    assert!(service.has_sufficient_balance("20").await);
    assert!(!service.has_sufficient_balance("20.000000000000000001").await);

    let (service, _, _) = token(usdfc(20) - U256::one(), false);
    assert!(!service.has_sufficient_balance("20").await);
}

#[tokio::test]
async fn sufficiency_and_price_formatting_degrade_on_failure() {
    let (service, _, _) = token(usdfc(100), true);
    assert!(!service.has_sufficient_balance("1").await);
    assert_eq!(service.format_price(usdfc(5)).await, "0 USDFC");

    let (service, _, _) = token(usdfc(100), false);
    assert_eq!(service.format_price(usdfc(5)).await, "5.0 USDFC");
    // A malformed amount reads as "not enough" as well.
    assert!(!service.has_sufficient_balance("twenty").await);
}

#[tokio::test]
async fn writes_convert_amounts_and_wrap_failures() {
    let (service, log, _) = token(usdfc(100), false);
    let to = Address::repeat_byte(0x05);
    let tx = service.transfer(to, "1.5").await.unwrap();
    assert_eq!(tx, bytes32_hex(&H256::repeat_byte(0x21)));
    assert_eq!(log.calls(), vec![format!("transfer:{to:?}:{}", U256::exp10(17) * 15)]);

    let (broken, _, signer) = token(usdfc(100), true);
    let err = broken.transfer(to, "1").await.unwrap_err();
    assert_eq!(err.to_string(), "USDFC transfer failed: execution reverted");
    let err = broken.approve(to, "1").await.unwrap_err();
    assert_eq!(err.to_string(), "USDFC approval failed: execution reverted");
    let err = broken.get_balance(signer).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get balance: execution reverted");
    let err = broken.get_token_info().await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to get token info: "));
}

#[tokio::test]
async fn token_info_reads_name_symbol_and_decimals() {
    let (service, _, _) = token(usdfc(1), false);
    let info = service.get_token_info().await.unwrap();
    assert_eq!(info.name, "USD for Filecoin Community");
    assert_eq!(info.symbol, "USDFC");
    assert_eq!(info.decimals, "18");
}

#[tokio::test]
async fn video_payment_approves_one_week_then_pays() {
    let (service, log, signer) = token(usdfc(100), false);
    let platform = FakePlatform {
        log: log.clone(),
        address: Address::repeat_byte(0xbb),
        video_id: H256::repeat_byte(0x77),
        emit_event: true,
        fail_writes: false,
        fail_payment: false,
        video: common::sample_video(signer),
    };

    let tx = service.pay_for_video(&platform, H256::repeat_byte(0x77)).await.unwrap();

    assert_eq!(tx, bytes32_hex(&H256::repeat_byte(0x32)));
    assert_eq!(
        log.calls(),
        vec![
            format!("approve:{}", usdfc(20)),
            format!("pay_for_video:{:?}", H256::repeat_byte(0x77)),
        ]
    );
}

#[tokio::test]
async fn transfer_watch_yields_only_outgoing_transfers() {
    let (service, _, signer) = token(usdfc(1), false);
    let mut feed = service.watch_transfers(signer).await.unwrap();

    let notice = feed.next().await.unwrap();
    assert_eq!(notice.amount, "1.5");
    assert_eq!(notice.to, "0x0101010101010101010101010101010101010101");
    assert_eq!(notice.transaction_hash, Some(bytes32_hex(&H256::repeat_byte(0x44))));

    // The fake sends its backlog and closes; the incoming transfer was filtered out.
    assert!(feed.next().await.is_none());
}

#[tokio::test]
async fn transfer_watch_reports_a_refused_subscription() {
    let (fake, _, signer) = fake_token(usdfc(1), false);
    let service = UsdfcService::new(Arc::new(FakeToken {
        refuse_filters: true,
        ..fake
    }));

    let err = match service.watch_transfers(signer).await {
        Ok(_) => panic!("a refused filter must not yield an empty feed"),
        Err(e) => e,
    };
    assert_eq!(
        err.to_string(),
        "Failed to watch transfers: eth_newFilter: connection refused"
    );
}
