pub mod router;
pub mod types;
pub mod handlers {
    pub mod cdn;
    pub mod common;
    pub mod health;
    pub mod pay;
    pub mod tokens;
    pub mod videos;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
