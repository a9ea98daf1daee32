//! Content storage backends: the Filecoin PDP contract and an IPFS node.

pub mod ipfs;
pub mod pdp;

pub use ipfs::IpfsClient;
pub use pdp::PdpService;
