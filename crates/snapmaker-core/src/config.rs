//! Client tuning knobs.
//!
//! Defaults match what the device firmware expects; tests shrink the timeouts
//! and point the broadcast address at loopback.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::{API_PORT, DISCOVERY_PORT};

/// Timeouts, retry bounds and ports used by a [`SnapmakerDevice`](crate::device::SnapmakerDevice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// UDP port the discovery probe is sent to.
    pub discovery_port: u16,
    /// Destination of the discovery probe.
    pub broadcast_address: String,
    /// Deadline for a single datagram read.
    #[serde(with = "millis")]
    pub receive_timeout: Duration,
    /// Probe attempts before the device is declared offline.
    pub discovery_retries: u32,
    /// Pause between probe attempts.
    #[serde(with = "millis")]
    pub discovery_retry_delay: Duration,
    /// HTTP API port.
    pub api_port: u16,
    /// Deadline for a whole HTTP request.
    #[serde(with = "millis")]
    pub http_timeout: Duration,
    /// Deadline for one TCP connect during the reachability precheck.
    #[serde(with = "millis")]
    pub connect_timeout: Duration,
    /// TCP connect attempts during the reachability precheck.
    pub reachability_retries: u32,
    /// First backoff delay; doubles after each failed attempt.
    #[serde(with = "millis")]
    pub reachability_backoff_base: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            discovery_port: DISCOVERY_PORT,
            broadcast_address: "255.255.255.255".to_string(),
            receive_timeout: Duration::from_secs(1),
            discovery_retries: 5,
            discovery_retry_delay: Duration::from_millis(500),
            api_port: API_PORT,
            http_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
            reachability_retries: 2,
            reachability_backoff_base: Duration::from_secs(1),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
