//! Table rendering for model listings.

use crate::models::{ModelSummary, RunningModel};
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

/// Formats a byte count in decimal units, as `ollama list` does.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn models_table(models: &[ModelSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            "Name",
            "Size",
            "Family",
            "Parameters",
            "Quantization",
            "Modified (UTC)",
        ]);

    for model in models {
        table.add_row(vec![
            Cell::new(&model.name),
            Cell::new(format_size(model.size)),
            Cell::new(or_dash(model.details.family.as_deref())),
            Cell::new(or_dash(model.details.parameter_size.as_deref())),
            Cell::new(or_dash(model.details.quantization_level.as_deref())),
            Cell::new(model.modified_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

pub fn running_table(models: &[RunningModel]) -> Table {
    let now = Utc::now();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Size", "VRAM", "Unloads in"]);

    for model in models {
        let expires = match model.expires_at {
            Some(at) if at > now => format!("{} min", (at - now).num_minutes()),
            Some(_) => "now".to_string(),
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&model.name),
            Cell::new(format_size(model.size)),
            Cell::new(format_size(model.size_vram)),
            Cell::new(expires),
        ]);
    }
    table
}
