//! Payload -> telemetry reconciliation.

use serde_json::{Map, Value};
use tracing::debug;

use super::format::{format_duration, progress_percent};
use crate::protocol::toolhead::{is_printing_head, ToolHead, DUAL_EXTRUDER_NAME, SINGLE_EXTRUDER};
use crate::types::{DiscoveryRecord, Telemetry, NOT_AVAILABLE, ZERO_DURATION};

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub telemetry: Telemetry,
    pub dual_extruder: bool,
    /// Set when the toolhead identifier is not in the lookup table.
    pub unknown_tool_head: Option<String>,
    /// Dual extruder inferred from the single-extruder inconsistency.
    pub dual_fallback: bool,
}

/// Build canonical telemetry from one status payload.
///
/// `identity` supplies the address, model and a fallback status from
/// discovery. `prior_dual` is kept only when the payload says nothing about
/// nozzles or the toolhead.
pub fn reconcile(identity: &DiscoveryRecord, raw: &Map<String, Value>, prior_dual: bool) -> Reconciled {
    let raw_tool_head = raw.get("toolHead").and_then(Value::as_str);
    let (dual_extruder, dual_fallback) = detect_dual_extruder(raw, raw_tool_head, prior_dual);

    if dual_fallback {
        debug!(
            "{}: {} without nozzleTemperature but with nozzle1Temperature, treating as dual extruder",
            identity.host, SINGLE_EXTRUDER
        );
    }

    let (tool_head, unknown_tool_head) = match raw_tool_head {
        None => (NOT_AVAILABLE.to_string(), None),
        Some(raw_id) if dual_extruder && is_printing_head(raw_id) => {
            (DUAL_EXTRUDER_NAME.to_string(), None)
        }
        Some(raw_id) => {
            let head = ToolHead::lookup(raw_id);
            let unknown = (!head.is_known()).then(|| raw_id.to_string());
            (head.display_name().to_string(), unknown)
        }
    };

    let mut telemetry = Telemetry::offline(&identity.host, Some(&identity.model));
    telemetry.status = text(raw, "status").unwrap_or_else(|| identity.status.clone());
    telemetry.tool_head = tool_head;

    if dual_extruder {
        telemetry.nozzle1_temperature = number(raw, "nozzle1Temperature");
        telemetry.nozzle1_target_temperature = number(raw, "nozzle1TargetTemperature");
        telemetry.nozzle2_temperature = number(raw, "nozzle2Temperature");
        telemetry.nozzle2_target_temperature = number(raw, "nozzle2TargetTemperature");
    } else {
        telemetry.nozzle_temperature = number(raw, "nozzleTemperature");
        telemetry.nozzle_target_temperature = number(raw, "nozzleTargetTemperature");
    }
    telemetry.heated_bed_temperature = number(raw, "heatedBedTemperature");
    telemetry.heated_bed_target_temperature = number(raw, "heatedBedTargetTemperature");

    telemetry.file_name = text(raw, "fileName").unwrap_or_else(|| NOT_AVAILABLE.to_string());
    telemetry.progress = number(raw, "progress").map(progress_percent);
    telemetry.elapsed_time = Some(duration(raw, "elapsedTime"));
    telemetry.remaining_time = Some(duration(raw, "remainingTime"));
    telemetry.estimated_time = Some(duration(raw, "estimatedTime"));

    telemetry.x = number(raw, "x");
    telemetry.y = number(raw, "y");
    telemetry.z = number(raw, "z");
    telemetry.homing = text(raw, "homing");

    telemetry.is_filament_out = flag(raw, "isFilamentOut");
    telemetry.is_door_open = flag(raw, "isDoorOpen");
    telemetry.has_enclosure = flag(raw, "enclosure");
    telemetry.has_rotary_module = flag(raw, "rotaryModule");
    telemetry.has_emergency_stop = flag(raw, "emergencyStop");
    telemetry.has_air_purifier = flag(raw, "airPurifier");

    telemetry.total_lines = count(raw, "totalLines");
    telemetry.current_line = count(raw, "currentLine");

    telemetry.spindle_speed = number(raw, "spindleSpeed");
    telemetry.laser_power = number(raw, "laserPower");
    telemetry.laser_focal_length = number(raw, "laserFocalLength");

    Reconciled {
        telemetry,
        dual_extruder,
        unknown_tool_head,
        dual_fallback,
    }
}

/// Returns `(dual, via_fallback)`.
fn detect_dual_extruder(
    raw: &Map<String, Value>,
    raw_tool_head: Option<&str>,
    prior_dual: bool,
) -> (bool, bool) {
    let has_single = raw.contains_key("nozzleTemperature");
    let has_first = raw.contains_key("nozzle1Temperature");
    let has_second = raw.contains_key("nozzle2Temperature");

    if has_first && has_second {
        return (true, false);
    }

    if raw_tool_head == Some(SINGLE_EXTRUDER) && !has_single && has_first {
        return (true, true);
    }

    if raw_tool_head.is_none() && !has_single && !has_first && !has_second {
        return (prior_dual, false);
    }

    (false, false)
}

fn number(raw: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = raw.get(key)?;
    let n = value.as_f64();
    if n.is_none() && !value.is_null() {
        debug!("Ignoring non-numeric {}: {}", key, value);
    }
    n
}

fn count(raw: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = raw.get(key)?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

fn text(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn flag(raw: &Map<String, Value>, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn duration(raw: &Map<String, Value>, key: &str) -> String {
    number(raw, key)
        .and_then(format_duration)
        .unwrap_or_else(|| ZERO_DURATION.to_string())
}
