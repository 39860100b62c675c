//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("State not found: {0}")]
    StateNotFound(String),

    #[error("Mount failed: {0}")]
    MountFailed(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Engine already running")]
    AlreadyRunning,

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}
