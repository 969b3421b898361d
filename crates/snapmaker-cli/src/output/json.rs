//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;
use snapmaker_core::{DiscoveryRecord, SavedDevice, Telemetry};

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[DiscoveryRecord]) -> String {
        Self::to_json(&json!({
            "devices": devices,
            "count": devices.len()
        }))
    }

    fn format_telemetry(&self, telemetry: &Telemetry) -> String {
        Self::to_json(&telemetry.to_map())
    }

    fn format_paired(&self, device: &SavedDevice) -> String {
        Self::to_json(&json!({
            "host": device.host,
            "model": device.model,
            "paired": device.token.is_some(),
            "updatedAt": device.updated_at
        }))
    }

    fn format_saved_devices(&self, devices: &[SavedDevice]) -> String {
        let items: Vec<_> = devices
            .iter()
            .map(|d| {
                json!({
                    "host": d.host,
                    "model": d.model,
                    "hasToken": d.token.is_some(),
                    "updatedAt": d.updated_at
                })
            })
            .collect();

        Self::to_json(&json!({
            "devices": items,
            "count": devices.len()
        }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::to_json(&json!({ "error": error }))
    }
}
