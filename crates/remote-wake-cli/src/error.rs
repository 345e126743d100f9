//! Error types for the remote-wake CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use remote_wake_core::error::CoreError;
use thiserror::Error;

// Re-export core error types so command modules can use them via crate::error
pub use remote_wake_core::error::{StorageError, WakeError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No registered device matches '{0}'")]
    DeviceNotFound(String),

    #[error("'{query}' matches {count} devices; use the device id")]
    Ambiguous { query: String, count: usize },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Storage(StorageError::NotFound(_)) => exit_codes::DEVICE_ERROR,
                CoreError::Storage(
                    StorageError::InvalidName(_)
                    | StorageError::InvalidAddress(_)
                    | StorageError::InvalidMac(_),
                ) => exit_codes::INVALID_ARGS,
                CoreError::Storage(_) => exit_codes::GENERAL_ERROR,
                CoreError::Wake(WakeError::MalformedMac(_)) => exit_codes::INVALID_ARGS,
                CoreError::Wake(WakeError::Send { .. }) => exit_codes::NETWORK_ERROR,
                CoreError::Scan(_) => exit_codes::NETWORK_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::DeviceNotFound(_) => exit_codes::DEVICE_ERROR,
            CliError::Ambiguous { .. } => exit_codes::DEVICE_ERROR,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}

impl From<WakeError> for CliError {
    fn from(e: WakeError) -> Self {
        CliError::Core(CoreError::Wake(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use remote_wake_core::error::MacParseError;

    fn bad_mac() -> MacParseError {
        MacParseError {
            input: "zz".to_string(),
            reason: "expected 12 hex digits".to_string(),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(StorageError::NotFound("x".into())).exit_code(),
            exit_codes::DEVICE_ERROR
        );
        assert_eq!(
            CliError::from(StorageError::InvalidMac(bad_mac())).exit_code(),
            exit_codes::INVALID_ARGS
        );
        assert_eq!(
            CliError::from(WakeError::MalformedMac(bad_mac())).exit_code(),
            exit_codes::INVALID_ARGS
        );
        assert_eq!(
            CliError::from(WakeError::Send {
                target: "255.255.255.255:9".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
            .exit_code(),
            exit_codes::NETWORK_ERROR
        );
        assert_eq!(
            CliError::Ambiguous {
                query: "pc".into(),
                count: 2
            }
            .exit_code(),
            exit_codes::DEVICE_ERROR
        );
    }

    #[test]
    fn test_malformed_mac_message() {
        let err = CliError::from(WakeError::MalformedMac(bad_mac()));
        assert!(err
            .to_string()
            .ends_with("Invalid MAC address 'zz': expected 12 hex digits"));
    }
}
