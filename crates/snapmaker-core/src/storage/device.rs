//! Paired device storage.
//!
//! One JSON file per host, holding the session token the device issued.

use crate::error::StorageError;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Hostnames and IPv4 literals; must not start with a dot.
const HOST_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$";

const MAX_HOST_LENGTH: usize = 253;

/// A device the user has paired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDevice {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub updated_at: String,
}

impl SavedDevice {
    pub fn new(host: impl Into<String>, token: Option<String>, model: Option<String>) -> Self {
        Self {
            host: host.into(),
            token,
            model,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Device storage service.
///
/// Takes a `PathBuf` so the CLI and tests can each choose where entries live.
pub struct DeviceStore {
    device_dir: PathBuf,
    host_regex: Regex,
}

impl DeviceStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::DirectoryAccess(format!("{}: {}", dir.display(), e)))?;

        let host_regex = Regex::new(HOST_PATTERN)
            .map_err(|e| StorageError::InvalidHost(format!("bad host pattern: {}", e)))?;

        Ok(Self {
            device_dir: dir,
            host_regex,
        })
    }

    fn validate_host(&self, host: &str) -> Result<(), StorageError> {
        if host.is_empty() {
            return Err(StorageError::InvalidHost("Host cannot be empty".to_string()));
        }

        if host.len() > MAX_HOST_LENGTH {
            return Err(StorageError::InvalidHost(format!(
                "Host exceeds maximum length of {} characters",
                MAX_HOST_LENGTH
            )));
        }

        if !self.host_regex.is_match(host) || host.contains("..") {
            return Err(StorageError::InvalidHost(format!(
                "'{}' is not a hostname or IP address",
                host
            )));
        }

        Ok(())
    }

    fn get_path(&self, host: &str) -> PathBuf {
        self.device_dir.join(format!("{}.json", host))
    }

    /// All stored devices, sorted by host. Unreadable files are skipped.
    pub async fn list(&self) -> Result<Vec<SavedDevice>, StorageError> {
        let mut devices = Vec::new();
        let mut entries = fs::read_dir(&self.device_dir).await?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            if let Ok(content) = fs::read_to_string(&path).await {
                if let Ok(device) = serde_json::from_str::<SavedDevice>(&content) {
                    devices.push(device);
                }
            }
        }

        devices.sort_by(|a, b| a.host.cmp(&b.host));

        Ok(devices)
    }

    pub async fn get(&self, host: &str) -> Result<Option<SavedDevice>, StorageError> {
        self.validate_host(host)?;

        let path = self.get_path(host);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let device: SavedDevice = serde_json::from_str(&content)?;

        Ok(Some(device))
    }

    pub async fn save(&self, device: &SavedDevice) -> Result<(), StorageError> {
        self.validate_host(&device.host)?;

        let content = serde_json::to_string_pretty(device)?;
        fs::write(self.get_path(&device.host), content).await?;

        Ok(())
    }

    /// Replace the token of a stored device, creating the entry if needed.
    pub async fn update_token(&self, host: &str, token: &str) -> Result<SavedDevice, StorageError> {
        let mut device = self
            .get(host)
            .await?
            .unwrap_or_else(|| SavedDevice::new(host, None, None));

        device.token = Some(token.to_string());
        device.updated_at = Utc::now().to_rfc3339();
        self.save(&device).await?;

        Ok(device)
    }

    pub async fn delete(&self, host: &str) -> Result<(), StorageError> {
        self.validate_host(host)?;

        let path = self.get_path(host);

        if !path.exists() {
            return Err(StorageError::NotFound(host.to_string()));
        }

        fs::remove_file(&path).await?;

        Ok(())
    }
}
