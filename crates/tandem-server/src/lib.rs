//! # tandem-server
//!
//! HTTP server for the Tandem authorization service: configuration
//! loading, tracing setup, storage backend selection, and the axum router
//! over the `tandem-auth` endpoints.

pub mod config;
pub mod observability;
pub mod router;
pub mod state;

pub use config::{ConfigError, ServerConfig, load_config, resolve_config_path};
pub use router::build_router;
pub use state::AppState;
