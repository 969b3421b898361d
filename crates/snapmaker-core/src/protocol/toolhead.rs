//! Toolhead identifiers reported in the `toolHead` status field.

/// Single-nozzle 3D printing module.
pub const SINGLE_EXTRUDER: &str = "TOOLHEAD_3DPRINTING_1";

/// Display name used whenever a dual-nozzle configuration is detected.
pub const DUAL_EXTRUDER_NAME: &str = "Dual Extruder";

const PRINTING_PREFIX: &str = "TOOLHEAD_3DPRINTING";

/// Raw identifier -> display name.
const TOOL_HEADS: &[(&str, &str)] = &[
    (SINGLE_EXTRUDER, "Extruder"),
    ("TOOLHEAD_3DPRINTING_2", DUAL_EXTRUDER_NAME),
    ("TOOLHEAD_CNC_1", "CNC"),
    ("TOOLHEAD_LASER_1", "Laser"),
];

/// Result of looking up a raw toolhead identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolHead<'a> {
    Known(&'static str),
    /// Not in the table; displayed verbatim.
    Unknown(&'a str),
}

impl<'a> ToolHead<'a> {
    pub fn lookup(raw: &'a str) -> Self {
        TOOL_HEADS
            .iter()
            .find(|(id, _)| *id == raw)
            .map(|(_, name)| ToolHead::Known(name))
            .unwrap_or(ToolHead::Unknown(raw))
    }

    pub fn display_name(&self) -> &'a str {
        match self {
            ToolHead::Known(name) => name,
            ToolHead::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ToolHead::Known(_))
    }
}

/// Whether the identifier names any 3D printing module.
pub fn is_printing_head(raw: &str) -> bool {
    raw.starts_with(PRINTING_PREFIX)
}
