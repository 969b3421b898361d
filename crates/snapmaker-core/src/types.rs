//! Shared data types exposed to hosts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status string used whenever the device cannot be reached.
pub const OFFLINE_STATUS: &str = "OFFLINE";

/// Placeholder for string fields with no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Duration shown while online when the device omits a time field.
pub const ZERO_DURATION: &str = "00:00:00";

/// A device that answered a discovery probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub host: String,
    pub model: String,
    pub status: String,
}

/// Connection lifecycle of a [`SnapmakerDevice`](crate::device::SnapmakerDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkState {
    /// Constructed, `update()` never ran.
    #[default]
    Uninitialized,
    /// Discovery matched, HTTP not yet confirmed.
    Online,
    /// Token validated and status fetched.
    Authenticated,
    Offline,
}

/// Sent to the owner of persisted configuration whenever a new token is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUpdate {
    pub host: String,
    pub token: String,
}

/// A single named telemetry value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    /// `None` means unknown, never zero.
    Number(Option<f64>),
    /// `None` means unknown; absent text keeps the `Text` variant.
    Text(Option<String>),
    Bool(bool),
}

impl TelemetryValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TelemetryValue::Number(n) => *n,
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TelemetryValue::Text(s) => s.as_deref(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TelemetryValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Canonical telemetry for one device.
///
/// Numeric fields are `None` when unknown. The CNC/laser fields are only
/// `Some` when the device reported them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub ip: String,
    pub model: Option<String>,
    pub status: String,
    pub tool_head: String,

    pub nozzle_temperature: Option<f64>,
    pub nozzle_target_temperature: Option<f64>,
    pub nozzle1_temperature: Option<f64>,
    pub nozzle1_target_temperature: Option<f64>,
    pub nozzle2_temperature: Option<f64>,
    pub nozzle2_target_temperature: Option<f64>,
    pub heated_bed_temperature: Option<f64>,
    pub heated_bed_target_temperature: Option<f64>,

    pub file_name: String,
    pub progress: Option<f64>,
    pub elapsed_time: Option<String>,
    pub remaining_time: Option<String>,
    pub estimated_time: Option<String>,

    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub homing: Option<String>,

    pub is_filament_out: bool,
    pub is_door_open: bool,
    pub has_enclosure: bool,
    pub has_rotary_module: bool,
    pub has_emergency_stop: bool,
    pub has_air_purifier: bool,

    pub total_lines: Option<u64>,
    pub current_line: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spindle_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laser_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laser_focal_length: Option<f64>,
}

impl Telemetry {
    /// Telemetry for an unreachable device: every measurement unknown.
    pub fn offline(host: &str, model: Option<&str>) -> Self {
        Self {
            ip: host.to_string(),
            model: model.map(str::to_string),
            status: OFFLINE_STATUS.to_string(),
            tool_head: NOT_AVAILABLE.to_string(),
            nozzle_temperature: None,
            nozzle_target_temperature: None,
            nozzle1_temperature: None,
            nozzle1_target_temperature: None,
            nozzle2_temperature: None,
            nozzle2_target_temperature: None,
            heated_bed_temperature: None,
            heated_bed_target_temperature: None,
            file_name: NOT_AVAILABLE.to_string(),
            progress: None,
            elapsed_time: None,
            remaining_time: None,
            estimated_time: None,
            x: None,
            y: None,
            z: None,
            homing: None,
            is_filament_out: false,
            is_door_open: false,
            has_enclosure: false,
            has_rotary_module: false,
            has_emergency_stop: false,
            has_air_purifier: false,
            total_lines: None,
            current_line: None,
            spindle_speed: None,
            laser_power: None,
            laser_focal_length: None,
        }
    }

    /// Named view of the telemetry, keyed by canonical name.
    pub fn to_map(&self) -> BTreeMap<&'static str, TelemetryValue> {
        use TelemetryValue::{Bool, Number, Text};

        let text = |v: &str| Text(Some(v.to_string()));
        let optional_text = |v: &Option<String>| Text(v.clone());
        let count = |v: Option<u64>| Number(v.map(|n| n as f64));

        let mut map = BTreeMap::new();
        map.insert("ip", text(&self.ip));
        map.insert("model", text(self.model.as_deref().unwrap_or(NOT_AVAILABLE)));
        map.insert("status", text(&self.status));
        map.insert("tool_head", text(&self.tool_head));

        map.insert("nozzle_temperature", Number(self.nozzle_temperature));
        map.insert("nozzle_target_temperature", Number(self.nozzle_target_temperature));
        map.insert("nozzle1_temperature", Number(self.nozzle1_temperature));
        map.insert("nozzle1_target_temperature", Number(self.nozzle1_target_temperature));
        map.insert("nozzle2_temperature", Number(self.nozzle2_temperature));
        map.insert("nozzle2_target_temperature", Number(self.nozzle2_target_temperature));
        map.insert("heated_bed_temperature", Number(self.heated_bed_temperature));
        map.insert(
            "heated_bed_target_temperature",
            Number(self.heated_bed_target_temperature),
        );

        map.insert("file_name", text(&self.file_name));
        map.insert("progress", Number(self.progress));
        map.insert("elapsed_time", optional_text(&self.elapsed_time));
        map.insert("remaining_time", optional_text(&self.remaining_time));
        map.insert("estimated_time", optional_text(&self.estimated_time));

        map.insert("x", Number(self.x));
        map.insert("y", Number(self.y));
        map.insert("z", Number(self.z));
        map.insert("homing", optional_text(&self.homing));

        map.insert("is_filament_out", Bool(self.is_filament_out));
        map.insert("is_door_open", Bool(self.is_door_open));
        map.insert("has_enclosure", Bool(self.has_enclosure));
        map.insert("has_rotary_module", Bool(self.has_rotary_module));
        map.insert("has_emergency_stop", Bool(self.has_emergency_stop));
        map.insert("has_air_purifier", Bool(self.has_air_purifier));

        map.insert("total_lines", count(self.total_lines));
        map.insert("current_line", count(self.current_line));

        if let Some(v) = self.spindle_speed {
            map.insert("spindle_speed", Number(Some(v)));
        }
        if let Some(v) = self.laser_power {
            map.insert("laser_power", Number(Some(v)));
        }
        if let Some(v) = self.laser_focal_length {
            map.insert("laser_focal_length", Number(Some(v)));
        }

        map
    }

    /// Look up one value by canonical name.
    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
        self.to_map().remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_uses_unknown_markers() {
        let t = Telemetry::offline("192.168.1.100", Some("Snapmaker A350"));
        assert_eq!(t.status, "OFFLINE");
        assert_eq!(t.ip, "192.168.1.100");
        assert_eq!(t.model.as_deref(), Some("Snapmaker A350"));
        assert_eq!(t.nozzle_temperature, None);
        assert_eq!(t.heated_bed_temperature, None);
        assert_eq!(t.progress, None);
        assert_eq!(t.x, None);
        assert_eq!(t.total_lines, None);
        assert_eq!(t.elapsed_time, None);
        assert_eq!(t.file_name, "N/A");
        assert_eq!(t.tool_head, "N/A");
        assert!(!t.is_filament_out);
    }

    #[test]
    fn test_map_omits_conditional_fields() {
        let t = Telemetry::offline("h", None);
        let map = t.to_map();
        assert!(!map.contains_key("spindle_speed"));
        assert!(!map.contains_key("laser_power"));
        assert!(!map.contains_key("laser_focal_length"));
        assert_eq!(map["nozzle_temperature"], TelemetryValue::Number(None));
        assert_eq!(map["model"], TelemetryValue::Text(Some("N/A".to_string())));
    }

    #[test]
    fn test_map_unknown_text_stays_text() {
        let t = Telemetry::offline("h", None);
        let map = t.to_map();
        assert_eq!(map["homing"], TelemetryValue::Text(None));
        assert_eq!(map["elapsed_time"], TelemetryValue::Text(None));
        assert_eq!(map["elapsed_time"].as_text(), None);

        let mut online = t.clone();
        online.elapsed_time = Some("0:05:00".to_string());
        assert_eq!(online.get("elapsed_time").unwrap().as_text(), Some("0:05:00"));
    }

    #[test]
    fn test_get_conditional_field() {
        let mut t = Telemetry::offline("h", None);
        t.spindle_speed = Some(12000.0);
        assert_eq!(t.get("spindle_speed").and_then(|v| v.as_number()), Some(12000.0));
        assert!(t.get("laser_power").is_none());
    }

    #[test]
    fn test_serialized_offline_numbers_are_null() {
        let t = Telemetry::offline("h", None);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json["nozzle_temperature"].is_null());
        assert!(json.get("spindle_speed").is_none());
        assert_eq!(json["status"], "OFFLINE");
    }
}
