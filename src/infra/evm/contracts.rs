//! Contract bindings generated from human-readable ABIs.

use ethers::contract::abigen;

abigen!(
    FilStreamPlatform,
    r#"[
        function uploadVideo(string title, string description, bytes32 cid, uint256 price) external
        function payForVideo(bytes32 videoId) external payable
        function getVideo(bytes32 videoId) external view returns (string, string, bytes32, uint256, address, uint256, bool, uint256, uint256)
        function getUserVideos(address user) external view returns (bytes32[])
        function withdrawEarnings() external
        function getVideoEarnings(bytes32 videoId) external view returns (uint256)
        function getUserEarnings(address user) external view returns (uint256)
        function getVideoCount() external view returns (uint256)
        function registerUser() external
        function users(address user) external view returns (bool, uint256)
        event VideoUploaded(bytes32 indexed videoId, address indexed creator, string title, bytes32 cid)
    ]"#
);

abigen!(
    PdpStorage,
    r#"[
        function store(bytes data) external returns (bytes32)
        function retrieve(bytes32 cid) external view returns (bytes)
        function getStoragePrice() external view returns (uint256)
        function payForStorage(bytes32 cid, uint256 amount) external payable
        event DataStored(bytes32 indexed cid, address indexed owner)
    ]"#
);

abigen!(
    UsdfcToken,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function transfer(address to, uint256 amount) external returns (bool)
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
        function name() external view returns (string)
        event Transfer(address indexed from, address indexed to, uint256 value)
    ]"#
);
