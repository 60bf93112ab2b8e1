//! Error types for the federation crate

use thiserror::Error;

/// Federation error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type for federation operations
pub type Result<T> = std::result::Result<T, Error>;
