//! Status payload reconciliation.
//!
//! Turns the vendor-cased `/api/v1/status` object into canonical [`Telemetry`](crate::types::Telemetry).

pub mod format;
pub mod reconcile;

pub use reconcile::{reconcile, Reconciled};
