//! Error types for remote-wake core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Wake error: {0}")]
    Wake(#[from] WakeError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A hardware address that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid MAC address '{input}': {reason}")]
pub struct MacParseError {
    pub input: String,
    pub reason: String,
}

/// Wake-on-LAN errors
#[derive(Debug, Error)]
pub enum WakeError {
    #[error(transparent)]
    MalformedMac(#[from] MacParseError),

    #[error("Failed to send magic packet to {target}: {source}")]
    Send {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Discovery strategy errors. Never surfaced past the orchestrator.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{strategy} unavailable: {reason}")]
    Unavailable {
        strategy: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn unavailable(strategy: &'static str, reason: impl Into<String>) -> Self {
        ScanError::Unavailable {
            strategy,
            reason: reason.into(),
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage directory: {0}")]
    DirectoryAccess(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    InvalidMac(#[from] MacParseError),

    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
