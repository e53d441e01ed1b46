//! Error types for the relay core library.

use thiserror::Error;

/// Result type alias using the core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for relay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid upstream or logging configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
