//! Hex identifiers used by the contracts: bytes32 video/content ids and addresses.

use ethers::types::{Address, H256};
use ethers::utils::to_checksum;

use crate::error::FilStreamError;

/// Parses a 32-byte hex string, with or without the `0x` prefix.
pub fn parse_bytes32(s: &str) -> Result<H256, FilStreamError> {
    let s = s.trim();
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|_| FilStreamError::InvalidCid(s.to_string()))?;
    if bytes.len() != 32 {
        return Err(FilStreamError::InvalidCid(s.to_string()));
    }
    Ok(H256::from_slice(&bytes))
}

/// Full `0x`-prefixed lowercase hex.
pub fn bytes32_hex(value: &H256) -> String {
    format!("0x{}", hex::encode(value.as_bytes()))
}

pub fn parse_address(s: &str) -> Result<Address, FilStreamError> {
    s.trim()
        .parse::<Address>()
        .map_err(|_| FilStreamError::InvalidAddress(s.to_string()))
}

/// EIP-55 checksummed form.
pub fn address_hex(address: &Address) -> String {
    to_checksum(address, None)
}
