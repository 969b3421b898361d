//! Persistent storage for paired devices.

pub mod device;

pub use device::{DeviceStore, SavedDevice};

/// Platform data directory for the Snapmaker link tools.
pub fn default_data_dir() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "snapmaker-link", "snapmaker-link")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
