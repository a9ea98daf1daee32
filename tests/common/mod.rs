//! In-memory doubles of the three contract seams, recording every state-changing call.
#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, Log, H256, U256};
use ethers::utils::keccak256;
use filstream::domain::events::{event_topic, DATA_STORED_EVENT, VIDEO_UPLOADED_EVENT};
use filstream::domain::ports::{
    OnChainUser, OnChainVideo, PlatformContract, RawTransfer, StorageContract, TokenContract, TransferWatch,
    TxReceipt,
};
use filstream::app::FilStreamManager;
use filstream::FilCdnService;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const CDN_BASE: &str = "https://filcdn.io";

pub fn usdfc(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

/// Shared, ordered record of contract calls.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

fn receipt(tag: u8, topics: Option<Vec<H256>>) -> TxReceipt {
    TxReceipt {
        transaction_hash: H256::repeat_byte(tag),
        logs: topics
            .map(|topics| {
                vec![Log {
                    topics,
                    ..Default::default()
                }]
            })
            .unwrap_or_default(),
    }
}

pub struct FakeStorage {
    pub log: CallLog,
    pub emit_event: bool,
}

#[async_trait]
impl StorageContract for FakeStorage {
    async fn store(&self, data: Vec<u8>) -> anyhow::Result<TxReceipt> {
        self.log.push("store");
        let cid = H256::from(keccak256(&data));
        let topics = self.emit_event.then(|| vec![event_topic(DATA_STORED_EVENT), cid]);
        Ok(receipt(0x11, topics))
    }

    async fn retrieve(&self, _cid: H256) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::anyhow!("not stored"))
    }

    async fn storage_price(&self) -> anyhow::Result<U256> {
        Ok(usdfc(20))
    }

    async fn pay_for_storage(&self, _cid: H256, _amount: U256) -> anyhow::Result<H256> {
        self.log.push("pay_for_storage");
        Ok(H256::repeat_byte(0x12))
    }
}

pub struct FakeToken {
    pub log: CallLog,
    pub signer: Address,
    pub balance: U256,
    /// Every call reverts.
    pub broken: bool,
    pub transfers: Vec<RawTransfer>,
    /// The node refuses to install event filters; plain calls still work.
    pub refuse_filters: bool,
}

impl FakeToken {
    fn check(&self) -> anyhow::Result<()> {
        if self.broken {
            Err(anyhow::anyhow!("execution reverted"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenContract for FakeToken {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn balance_of(&self, owner: Address) -> anyhow::Result<U256> {
        self.check()?;
        self.log.push("balance_of");
        Ok(if owner == self.signer { self.balance } else { usdfc(3) })
    }

    async fn allowance(&self, _owner: Address, _spender: Address) -> anyhow::Result<U256> {
        self.check()?;
        Ok(usdfc(20))
    }

    async fn decimals(&self) -> anyhow::Result<u8> {
        self.check()?;
        Ok(18)
    }

    async fn symbol(&self) -> anyhow::Result<String> {
        self.check()?;
        Ok("USDFC".to_string())
    }

    async fn name(&self) -> anyhow::Result<String> {
        self.check()?;
        Ok("USD for Filecoin Community".to_string())
    }

    async fn transfer(&self, to: Address, amount: U256) -> anyhow::Result<H256> {
        self.check()?;
        self.log.push(format!("transfer:{to:?}:{amount}"));
        Ok(H256::repeat_byte(0x21))
    }

    async fn approve(&self, _spender: Address, amount: U256) -> anyhow::Result<H256> {
        self.check()?;
        self.log.push(format!("approve:{amount}"));
        Ok(H256::repeat_byte(0x22))
    }

    async fn watch_transfers(&self, from: Address) -> anyhow::Result<TransferWatch> {
        self.check()?;
        if self.refuse_filters {
            return Err(anyhow::anyhow!("eth_newFilter: connection refused"));
        }
        let (tx, rx) = mpsc::channel(8);
        let transfers: Vec<RawTransfer> = self.transfers.iter().filter(|t| t.from == from).cloned().collect();
        let task = tokio::spawn(async move {
            for transfer in transfers {
                if tx.send(transfer).await.is_err() {
                    break;
                }
            }
        });
        Ok(TransferWatch::new(rx, task))
    }
}

pub struct FakePlatform {
    pub log: CallLog,
    pub address: Address,
    pub video_id: H256,
    pub emit_event: bool,
    pub fail_writes: bool,
    /// Only `payForVideo` reverts.
    pub fail_payment: bool,
    pub video: OnChainVideo,
}

impl FakePlatform {
    fn write(&self, call: String) -> anyhow::Result<()> {
        if self.fail_writes {
            return Err(anyhow::anyhow!("execution reverted: not allowed"));
        }
        self.log.push(call);
        Ok(())
    }
}

#[async_trait]
impl PlatformContract for FakePlatform {
    fn address(&self) -> Address {
        self.address
    }

    async fn upload_video(&self, title: &str, _description: &str, _cid: H256, price: U256) -> anyhow::Result<TxReceipt> {
        self.write(format!("upload_video:{title}:{price}"))?;
        let topics = self
            .emit_event
            .then(|| vec![event_topic(VIDEO_UPLOADED_EVENT), self.video_id, H256::from(self.address)]);
        Ok(receipt(0x31, topics))
    }

    async fn get_video(&self, _video_id: H256) -> anyhow::Result<OnChainVideo> {
        Ok(self.video.clone())
    }

    async fn user_videos(&self, _user: Address) -> anyhow::Result<Vec<H256>> {
        Ok(vec![self.video_id])
    }

    async fn pay_for_video(&self, video_id: H256) -> anyhow::Result<H256> {
        if self.fail_payment {
            return Err(anyhow::anyhow!("execution reverted: insufficient allowance"));
        }
        self.write(format!("pay_for_video:{video_id:?}"))?;
        Ok(H256::repeat_byte(0x32))
    }

    async fn user_earnings(&self, _user: Address) -> anyhow::Result<U256> {
        Ok(usdfc(5) + U256::exp10(17) * 5)
    }

    async fn video_earnings(&self, _video_id: H256) -> anyhow::Result<U256> {
        Ok(self.video.total_earnings)
    }

    async fn withdraw_earnings(&self) -> anyhow::Result<H256> {
        self.write("withdraw_earnings".to_string())?;
        Ok(H256::repeat_byte(0x33))
    }

    async fn video_count(&self) -> anyhow::Result<U256> {
        Ok(U256::from(7u64))
    }

    async fn register_user(&self) -> anyhow::Result<H256> {
        self.write("register_user".to_string())?;
        Ok(H256::repeat_byte(0x34))
    }

    async fn user(&self, _user: Address) -> anyhow::Result<OnChainUser> {
        if self.fail_writes {
            return Err(anyhow::anyhow!("rpc unavailable"));
        }
        Ok(OnChainUser {
            is_registered: true,
            earnings: U256::zero(),
        })
    }
}

/// Knobs for [`fixture`].
pub struct FixtureOptions {
    pub balance: U256,
    pub emit_video_event: bool,
    pub emit_data_event: bool,
    pub fail_platform_writes: bool,
    pub fail_payment: bool,
    pub broken_token: bool,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            balance: usdfc(100),
            emit_video_event: true,
            emit_data_event: true,
            fail_platform_writes: false,
            fail_payment: false,
            broken_token: false,
        }
    }
}

pub struct Fixture {
    pub log: CallLog,
    pub manager: FilStreamManager,
    pub signer: Address,
    pub platform: Address,
    pub video_id: H256,
}

pub fn sample_video(creator: Address) -> OnChainVideo {
    OnChainVideo {
        title: "Sunset".to_string(),
        description: "Timelapse".to_string(),
        cid: H256::repeat_byte(0xcd),
        price: usdfc(20),
        creator,
        upload_time: U256::from(1_700_000_000u64),
        is_active: true,
        total_views: U256::from(12u64),
        total_earnings: usdfc(2),
    }
}

pub fn fixture(options: FixtureOptions) -> Fixture {
    let log = CallLog::default();
    let signer = Address::repeat_byte(0xaa);
    let platform = Address::repeat_byte(0xbb);
    let video_id = H256::repeat_byte(0x77);

    let storage = FakeStorage {
        log: log.clone(),
        emit_event: options.emit_data_event,
    };
    let token = FakeToken {
        log: log.clone(),
        signer,
        balance: options.balance,
        broken: options.broken_token,
        transfers: Vec::new(),
        refuse_filters: false,
    };
    let contract = FakePlatform {
        log: log.clone(),
        address: platform,
        video_id,
        emit_event: options.emit_video_event,
        fail_writes: options.fail_platform_writes,
        fail_payment: options.fail_payment,
        video: sample_video(signer),
    };
    let cdn = FilCdnService::new(CDN_BASE, reqwest::Client::new()).unwrap();
    let manager = FilStreamManager::new(Arc::new(contract), Arc::new(storage), Arc::new(token), cdn);

    Fixture {
        log,
        manager,
        signer,
        platform,
        video_id,
    }
}

/// `len` bytes of fake video data.
pub fn video_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
