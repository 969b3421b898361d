//! Core library for talking to Snapmaker devices on the local network.
//!
//! UDP discovery, a TCP reachability precheck, the two-phase token handshake
//! and reconciliation of the status API into canonical [`Telemetry`].

pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod status;
pub mod storage;
pub mod types;

pub use config::ClientConfig;
pub use device::SnapmakerDevice;
pub use discovery::DiscoveryClient;
pub use error::{CoreError, DeviceError, Result, StorageError};
pub use storage::{DeviceStore, SavedDevice};
pub use types::{DiscoveryRecord, LinkState, Telemetry, TelemetryValue, TokenUpdate};
