//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use snapmaker_core::{DiscoveryRecord, SavedDevice, Telemetry};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format discovery results
    fn format_devices(&self, devices: &[DiscoveryRecord]) -> String;

    /// Format one telemetry snapshot
    fn format_telemetry(&self, telemetry: &Telemetry) -> String;

    /// Format a freshly paired device. Never includes the token.
    fn format_paired(&self, device: &SavedDevice) -> String;

    /// Format the stored devices. Never includes tokens.
    fn format_saved_devices(&self, devices: &[SavedDevice]) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;

    /// Format an error
    fn format_error(&self, error: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
