//! CLI output formatting utilities.
//!
//! - layout tables for tiling snapshots
//! - colored JSON rendering

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::tiling::TilingSnapshot;

#[derive(Tabled)]
struct ScreenRow {
    #[tabled(rename = "Screen")]
    id: u32,
    #[tabled(rename = "Work area")]
    work_area: String,
    #[tabled(rename = "Left")]
    left: String,
    #[tabled(rename = "Right")]
    right: String,
    #[tabled(rename = "Windows")]
    windows: String,
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Screen")]
    screen: String,
    #[tabled(rename = "Frame")]
    frame: String,
    #[tabled(rename = "Shift")]
    shift: i32,
    #[tabled(rename = "Opacity")]
    opacity: u8,
    #[tabled(rename = "Visible")]
    visible: String,
    #[tabled(rename = "Blur")]
    decorated: String,
    #[tabled(rename = "Focused")]
    focused: String,
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders the screens and their groups as a table.
#[must_use]
pub fn screens_table(snapshot: &TilingSnapshot) -> String {
    let rows: Vec<ScreenRow> = snapshot
        .screens
        .iter()
        .map(|s| ScreenRow {
            id: s.id,
            work_area: s.work_area.to_string(),
            left: optional(s.left),
            right: optional(s.right),
            windows: if s.windows.is_empty() {
                "-".to_string()
            } else {
                s.windows.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
            },
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string()
}

/// Renders the window cache as a table.
#[must_use]
pub fn windows_table(snapshot: &TilingSnapshot) -> String {
    let rows: Vec<WindowRow> = snapshot
        .windows
        .iter()
        .map(|w| WindowRow {
            id: w.id,
            title: truncate(&w.title, 24),
            screen: optional(snapshot.screen_of(w.id)),
            frame: w.rect.to_string(),
            shift: w.l_shift,
            opacity: w.opacity,
            visible: format_bool(w.visible),
            decorated: format_bool(w.decorated),
            focused: format_bool(snapshot.focused == Some(w.id)),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..6)).with(Alignment::right()))
        .with(Modify::new(Columns::new(6..9)).with(Alignment::center()))
        .to_string()
}

/// Prints a snapshot as tables, or as highlighted JSON.
pub fn print_snapshot(snapshot: &TilingSnapshot, json: bool) {
    if json {
        match serde_json::to_value(snapshot) {
            Ok(value) => print_highlighted_json(&value),
            Err(err) => println!("{} {err}", "Error:".red()),
        }
        return;
    }

    let mode = if snapshot.tiling_enabled { "tiling" } else { "decoration only" };
    println!("{}", format!("Screens ({}, {mode})", snapshot.screens.len()).bold());
    println!("{}", screens_table(snapshot));

    if snapshot.windows.is_empty() {
        println!("{}", "No tracked windows.".dimmed());
    } else {
        println!("{}", format!("Windows ({})", snapshot.windows.len()).bold());
        println!("{}", windows_table(snapshot));
    }
}

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &serde_json::Value) { println!("{}", highlight_json(value)); }

/// Renders a value as indented JSON with ANSI colors.
#[must_use]
pub fn highlight_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn quoted(s: &str) -> String { serde_json::Value::String(s.to_string()).to_string() }

fn write_value(out: &mut String, value: &serde_json::Value, depth: usize) {
    use serde_json::Value;

    let pad = "  ".repeat(depth + 1);
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quoted(s).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str(&"[".bold().to_string());
            for (index, item) in items.iter().enumerate() {
                out.push_str(if index == 0 { "\n" } else { ",\n" });
                out.push_str(&pad);
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
            out.push_str(&"]".bold().to_string());
        }
        Value::Object(map) => {
            out.push_str(&"{".bold().to_string());
            for (index, (key, item)) in map.iter().enumerate() {
                out.push_str(if index == 0 { "\n" } else { ",\n" });
                out.push_str(&pad);
                out.push_str(&quoted(key).cyan().to_string());
                out.push_str(": ");
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
            out.push_str(&"}".bold().to_string());
        }
    }
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// This function correctly handles multi-byte UTF-8 characters by counting
/// characters rather than bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        // Find the byte index of the (max_chars - 1)th character
        let truncate_at = s.char_indices().nth(max_chars - 1).map_or(s.len(), |(idx, _)| idx);
        format!("{}…", &s[..truncate_at])
    }
}

/// Formats a boolean as a colored string.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
