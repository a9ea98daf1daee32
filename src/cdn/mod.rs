pub mod filcdn;

pub use filcdn::{is_valid_cdn_url, FilCdnService};
