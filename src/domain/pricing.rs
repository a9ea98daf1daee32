//! Platform pricing constants.

use ethers::types::U256;

/// Weekly storage price in whole USDFC. CDN delivery is included.
pub const STORAGE_PRICE_PER_WEEK_USDFC: &str = "20";

/// Accepted upload sizes in bytes (1 KiB ..= 500 MiB).
pub const MIN_FILE_SIZE: u64 = 1024;
pub const MAX_FILE_SIZE: u64 = 524_288_000;

/// Weekly storage price in wei (18 decimals).
pub fn storage_price_per_week() -> U256 {
    U256::from(20u64) * U256::exp10(18)
}

pub fn file_size_allowed(size: u64) -> bool {
    (MIN_FILE_SIZE..=MAX_FILE_SIZE).contains(&size)
}
