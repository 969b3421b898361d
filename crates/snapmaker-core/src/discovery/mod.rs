//! UDP device discovery module.
//!
//! Broadcasts the `discover` probe, parses replies and matches them to a host.

pub mod reply;
pub mod service;

pub use reply::{parse_reply, ReplyError};
pub use service::{DiscoveryClient, DiscoveryFailure, DiscoveryOutcome};
