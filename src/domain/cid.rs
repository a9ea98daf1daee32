//! IPFS content identifier shape check.
//!
//! This is a superficial format check only: CIDv0 (`Qm` + 44 base58 characters) or
//! CIDv1 in base32 (`bafy` + 55 characters). Multihash contents are never decoded.

use once_cell::sync::Lazy;
use regex::Regex;

static CID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Qm[1-9A-HJ-NP-Za-km-z]{44}|bafy[a-z2-7]{55})$").expect("valid CID regex")
});

pub fn is_valid_cid(cid: &str) -> bool {
    CID_PATTERN.is_match(cid)
}

/// `ipfs://` URI form used inside ad metadata.
pub fn ipfs_uri(cid: &str) -> String {
    format!("ipfs://{cid}")
}
