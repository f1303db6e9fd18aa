//! Shared presentation helpers: sizes, tables, json.

use crate::error::SyncError;
use comfy_table::Table;
use serde::Serialize;

/// Render a byte count with binary units ("1.5 MiB").
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, SyncError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SyncError::ConfigError(format!("Failed to serialize output: {}", e)))
}

/// Two-column key/value table.
pub(crate) fn summary_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    table
}

/// Path list under a heading, one line per path with a marker.
pub(crate) fn push_path_section<'a>(
    out: &mut String,
    heading: &str,
    marker: &str,
    paths: impl Iterator<Item = &'a str>,
) {
    let mut paths = paths.peekable();
    if paths.peek().is_none() {
        return;
    }
    out.push_str(&format!("\n{}:\n", heading));
    for p in paths {
        out.push_str(&format!("  {} {}\n", marker, p));
    }
}
