//! wei <-> decimal conversion.
//!
//! Formatting follows the usual wallet convention: trailing zeros are dropped but at
//! least one fractional digit is kept (`20000000000000000000` wei -> `"20.0"`).

use ethers::types::U256;
use ethers::utils::{self, ConversionError};

/// Decimals of the USDFC token and of the FilStream contract's price fields.
pub const USDFC_DECIMALS: u32 = 18;

pub fn format_units(amount: U256, decimals: u32) -> Result<String, ConversionError> {
    let raw = utils::format_units(amount, decimals)?;
    Ok(trim_fraction(&raw))
}

pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, ConversionError> {
    Ok(utils::parse_units(amount.trim(), decimals)?.into())
}

fn trim_fraction(raw: &str) -> String {
    match raw.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{raw}.0"),
    }
}
