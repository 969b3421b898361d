//! Device communication layer.
//!
//! Reachability precheck, token session and the polling state machine.

pub mod client;
pub mod reachability;
pub mod session;

pub use client::SnapmakerDevice;
pub use reachability::ReachabilityProbe;
pub use session::AuthSession;
