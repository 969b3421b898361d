//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use snapmaker_core::{DiscoveryRecord, SavedDevice, Telemetry};

use super::OutputFormatter;

/// Shown for measurements the device did not report.
const UNKNOWN: &str = "-";

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn status_color(status: &str) -> Color {
        match status {
            "OFFLINE" => Color::Red,
            "RUNNING" => Color::Green,
            "PAUSED" => Color::Yellow,
            _ => Color::Reset,
        }
    }

    fn colored_status(status: &str) -> ColoredString {
        match status {
            "OFFLINE" => status.red(),
            "RUNNING" => status.green(),
            "PAUSED" => status.yellow(),
            _ => status.normal(),
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn temperature(current: Option<f64>, target: Option<f64>) -> Option<String> {
    match (current, target) {
        (None, None) => None,
        (current, target) => Some(format!(
            "{} / {} °C",
            current.map_or(UNKNOWN.to_string(), |t| format!("{:.1}", t)),
            target.map_or(UNKNOWN.to_string(), |t| format!("{:.1}", t))
        )),
    }
}

fn value(v: Option<f64>, precision: usize) -> String {
    v.map_or(UNKNOWN.to_string(), |v| format!("{:.*}", precision, v))
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[DiscoveryRecord]) -> String {
        if devices.is_empty() {
            return "No devices found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["IP", "Model", "Status"]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.host),
                Cell::new(&device.model),
                Cell::new(&device.status).fg(Self::status_color(&device.status)),
            ]);
        }

        format!("{}\n\nFound {} device(s)", table, devices.len())
    }

    fn format_telemetry(&self, t: &Telemetry) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Device: {} ({})",
            t.ip,
            t.model.as_deref().unwrap_or("unknown model")
        ));
        lines.push(format!("  Status:     {}", Self::colored_status(&t.status)));
        lines.push(format!("  Toolhead:   {}", t.tool_head));

        let nozzles = [
            ("Nozzle", t.nozzle_temperature, t.nozzle_target_temperature),
            ("Nozzle 1", t.nozzle1_temperature, t.nozzle1_target_temperature),
            ("Nozzle 2", t.nozzle2_temperature, t.nozzle2_target_temperature),
            ("Bed", t.heated_bed_temperature, t.heated_bed_target_temperature),
        ];
        for (label, current, target) in nozzles {
            if let Some(temp) = temperature(current, target) {
                lines.push(format!("  {:<11} {}", format!("{}:", label), temp));
            }
        }

        if let Some(speed) = t.spindle_speed {
            lines.push(format!("  Spindle:    {:.0} RPM", speed));
        }
        if let Some(power) = t.laser_power {
            lines.push(format!("  Laser:      {:.1} %", power));
        }
        if let Some(focal) = t.laser_focal_length {
            lines.push(format!("  Focal len:  {:.2} mm", focal));
        }

        lines.push("  Job:".to_string());
        lines.push(format!("    File:       {}", t.file_name));
        lines.push(format!(
            "    Progress:   {}",
            t.progress.map_or(UNKNOWN.to_string(), |p| format!("{:.1} %", p))
        ));
        lines.push(format!(
            "    Elapsed:    {}",
            t.elapsed_time.as_deref().unwrap_or(UNKNOWN)
        ));
        lines.push(format!(
            "    Remaining:  {}",
            t.remaining_time.as_deref().unwrap_or(UNKNOWN)
        ));
        if let (Some(current), Some(total)) = (t.current_line, t.total_lines) {
            lines.push(format!("    Lines:      {} / {}", current, total));
        }

        lines.push(format!(
            "  Position:   X {}  Y {}  Z {}",
            value(t.x, 2),
            value(t.y, 2),
            value(t.z, 2)
        ));

        if t.is_filament_out {
            lines.push(format!("  {}", "Filament runout detected".red()));
        }
        if t.is_door_open {
            lines.push(format!("  {}", "Enclosure door is open".yellow()));
        }
        lines.push(format!(
            "  Modules:    enclosure {}, rotary {}, e-stop {}, air purifier {}",
            yes_no(t.has_enclosure),
            yes_no(t.has_rotary_module),
            yes_no(t.has_emergency_stop),
            yes_no(t.has_air_purifier)
        ));

        lines.join("\n")
    }

    fn format_paired(&self, device: &SavedDevice) -> String {
        format!(
            "{} Paired with {} ({})",
            "[OK]".green(),
            device.host,
            device.model.as_deref().unwrap_or("unknown model")
        )
    }

    fn format_saved_devices(&self, devices: &[SavedDevice]) -> String {
        if devices.is_empty() {
            return "No paired devices.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Host", "Model", "Token", "Updated"]);

        for device in devices {
            let token = if device.token.is_some() {
                Cell::new("saved").fg(Color::Green)
            } else {
                Cell::new("missing").fg(Color::Yellow)
            };
            table.add_row(vec![
                Cell::new(&device.host),
                Cell::new(device.model.as_deref().unwrap_or(UNKNOWN)),
                token,
                Cell::new(&device.updated_at),
            ]);
        }

        format!("{}\n\n{} paired device(s)", table, devices.len())
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", "[FAIL]".red(), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_device_list() {
        assert_eq!(TableOutput::new().format_devices(&[]), "No devices found.");
    }

    #[test]
    fn test_device_count() {
        let devices = vec![
            DiscoveryRecord {
                host: "192.168.1.100".to_string(),
                model: "Snapmaker A350".to_string(),
                status: "IDLE".to_string(),
            },
            DiscoveryRecord {
                host: "192.168.1.101".to_string(),
                model: "Snapmaker J1".to_string(),
                status: "RUNNING".to_string(),
            },
        ];

        let output = TableOutput::new().format_devices(&devices);
        assert!(output.contains("Snapmaker J1"));
        assert!(output.ends_with("Found 2 device(s)"));
    }

    #[test]
    fn test_offline_telemetry_shows_unknowns() {
        let output = TableOutput::new().format_telemetry(&Telemetry::offline("10.0.0.5", None));
        assert!(output.contains("Device: 10.0.0.5 (unknown model)"));
        assert!(output.contains("Progress:   -"));
        assert!(!output.contains("Nozzle"));
        assert!(!output.contains("Spindle"));
    }

    #[test]
    fn test_temperature_pairs() {
        assert_eq!(temperature(None, None), None);
        assert_eq!(
            temperature(Some(210.04), Some(210.0)).as_deref(),
            Some("210.0 / 210.0 °C")
        );
        assert_eq!(temperature(Some(25.0), None).as_deref(), Some("25.0 / - °C"));
    }
}
