//! Protocol layer for device communication.
//!
//! Wire constants, response parsing and the toolhead lookup table for
//! Snapmaker devices.

pub mod response;
pub mod toolhead;

/// UDP port the device listens on for discovery probes.
pub const DISCOVERY_PORT: u16 = 20054;

/// Literal discovery probe payload.
pub const DISCOVER_MESSAGE: &[u8] = b"discover";

/// HTTP API port.
pub const API_PORT: u16 = 8080;

/// Token handshake endpoint (request and validation share it).
pub const CONNECT_PATH: &str = "/api/v1/connect";

/// Status endpoint. The token travels as a query parameter.
pub const STATUS_PATH: &str = "/api/v1/status";

/// Discovery datagrams never exceed this on the wire.
pub const DISCOVERY_BUFFER_SIZE: usize = 1024;
