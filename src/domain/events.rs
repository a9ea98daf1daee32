//! Scraping ids out of transaction receipt logs.
//!
//! Both the FilStream platform contract and the PDP contract report the id they
//! assigned through the first indexed parameter of an event, so the value is
//! `topics[1]` of the first log whose `topics[0]` is the event's signature hash.

use ethers::types::{Log, H256};
use ethers::utils::keccak256;

pub const VIDEO_UPLOADED_EVENT: &str = "VideoUploaded(bytes32,address,string,bytes32)";
pub const DATA_STORED_EVENT: &str = "DataStored(bytes32,address)";

pub fn event_topic(signature: &str) -> H256 {
    H256::from(keccak256(signature.as_bytes()))
}

pub fn first_indexed_topic(logs: &[Log], signature: &str) -> Option<H256> {
    let topic0 = event_topic(signature);
    logs.iter()
        .find(|log| log.topics.first() == Some(&topic0))
        .and_then(|log| log.topics.get(1).copied())
}

pub fn extract_video_id(logs: &[Log]) -> Option<H256> {
    first_indexed_topic(logs, VIDEO_UPLOADED_EVENT)
}

pub fn extract_content_id(logs: &[Log]) -> Option<H256> {
    first_indexed_topic(logs, DATA_STORED_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;

    fn log_with(topics: Vec<H256>) -> Log {
        Log {
            topics,
            ..Default::default()
        }
    }

    #[test]
    fn topic_is_keccak_of_signature() {
        assert_eq!(
            event_topic(""),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
                .parse::<H256>()
                .unwrap()
        );
    }

    #[test]
    fn finds_video_id_among_unrelated_logs() {
        let video_id = H256::repeat_byte(7);
        let creator = H256::from(Address::repeat_byte(1));
        let logs = vec![
            log_with(vec![event_topic("Approval(address,address,uint256)"), H256::repeat_byte(9)]),
            log_with(vec![event_topic(VIDEO_UPLOADED_EVENT), video_id, creator]),
        ];
        assert_eq!(extract_video_id(&logs), Some(video_id));
        assert_eq!(extract_content_id(&logs), None);
    }

    #[test]
    fn first_matching_log_wins() {
        let first = H256::repeat_byte(1);
        let logs = vec![
            log_with(vec![event_topic(DATA_STORED_EVENT), first]),
            log_with(vec![event_topic(DATA_STORED_EVENT), H256::repeat_byte(2)]),
        ];
        assert_eq!(extract_content_id(&logs), Some(first));
    }

    #[test]
    fn missing_indexed_topic_yields_none() {
        let logs = vec![log_with(vec![event_topic(DATA_STORED_EVENT)])];
        assert_eq!(extract_content_id(&logs), None);
        assert_eq!(extract_content_id(&[]), None);
    }
}
