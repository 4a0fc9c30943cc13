pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod shell;
pub mod store;

pub use config::Config;
pub use error::RelayError;

use std::sync::Arc;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub store: store::TokenStore,
    pub crypto: crypto::CryptoEngine,
}

pub type SharedState = Arc<AppState>;
