//! Error types for the Snapmaker CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use snapmaker_core::error::CoreError;
use thiserror::Error;

pub use snapmaker_core::error::{DeviceError, StorageError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const AUTH_REQUIRED: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No devices found")]
    NoDevicesFound,

    #[error("{0} did not answer discovery")]
    DeviceOffline(String),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(CoreError::Device(e)) => match e {
                DeviceError::Unreachable { .. } | DeviceError::Timeout { .. } => {
                    exit_codes::NETWORK_ERROR
                }
                DeviceError::AuthRequired { .. } => exit_codes::AUTH_REQUIRED,
                DeviceError::ProtocolError { .. } => exit_codes::DEVICE_ERROR,
            },
            CliError::Core(CoreError::Storage(StorageError::InvalidHost(_))) => {
                exit_codes::INVALID_ARGS
            }
            CliError::Core(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoDevicesFound => exit_codes::GENERAL_ERROR,
            CliError::DeviceOffline(_) => exit_codes::NETWORK_ERROR,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::Core(CoreError::Device(e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_exit_codes() {
        let host = "192.168.1.100";
        let cases = [
            (DeviceError::unreachable(host, "refused"), exit_codes::NETWORK_ERROR),
            (DeviceError::timeout(host, "discovery"), exit_codes::NETWORK_ERROR),
            (DeviceError::auth_required(host, "401"), exit_codes::AUTH_REQUIRED),
            (DeviceError::protocol(host, "HTTP 500"), exit_codes::DEVICE_ERROR),
        ];

        for (error, code) in cases {
            assert_eq!(CliError::from(error).exit_code(), code);
        }
    }

    #[test]
    fn test_storage_error_exit_codes() {
        let invalid = CliError::from(StorageError::InvalidHost("../x".to_string()));
        assert_eq!(invalid.exit_code(), exit_codes::INVALID_ARGS);

        let missing = CliError::from(StorageError::NotFound("10.0.0.1".to_string()));
        assert_eq!(missing.exit_code(), exit_codes::GENERAL_ERROR);
    }

    #[test]
    fn test_device_error_message_passes_through() {
        let err = CliError::from(DeviceError::auth_required("10.0.0.1", "HTTP 401 from status API"));
        assert!(err.to_string().contains("10.0.0.1"));
    }
}
