//! Error types for the Snapmaker core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why an `update()` call ended with the device offline.
///
/// Closed set: every I/O or parse failure in the polling chain is converted
/// into one of these at the stage where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Discovery found nothing or the API port refused connections.
    #[error("Device {host} is unreachable: {reason}")]
    Unreachable { host: String, reason: String },

    /// The device rejected or never issued a session token.
    #[error("Device {host} requires authorization: {reason}")]
    AuthRequired { host: String, reason: String },

    /// The device answered, but not with something we understand.
    #[error("Invalid response from {host}: {message}")]
    ProtocolError { host: String, message: String },

    /// An I/O operation exceeded its deadline.
    #[error("Timed out waiting for {host} during {stage}")]
    Timeout { host: String, stage: String },
}

impl DeviceError {
    pub fn unreachable(host: &str, reason: impl Into<String>) -> Self {
        DeviceError::Unreachable {
            host: host.to_string(),
            reason: reason.into(),
        }
    }

    pub fn auth_required(host: &str, reason: impl Into<String>) -> Self {
        DeviceError::AuthRequired {
            host: host.to_string(),
            reason: reason.into(),
        }
    }

    pub fn protocol(host: &str, message: impl Into<String>) -> Self {
        DeviceError::ProtocolError {
            host: host.to_string(),
            message: message.into(),
        }
    }

    pub fn timeout(host: &str, stage: impl Into<String>) -> Self {
        DeviceError::Timeout {
            host: host.to_string(),
            stage: stage.into(),
        }
    }

    /// True when the host should start a re-authorization flow instead of retrying.
    pub fn is_auth(&self) -> bool {
        matches!(self, DeviceError::AuthRequired { .. })
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage directory: {0}")]
    DirectoryAccess(String),

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
