//! # Session Gateway Library
//!
//! Cross-origin session bridge and request-proxy gateway core library.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod server;
pub mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{GatewayError, Result};
