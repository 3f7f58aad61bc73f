//! `wingman actions`: the action catalogue and the active chord table.

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::WingmanConfig;
use crate::hotkey::HotkeyAction;

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Chords")]
    chords: String,
    #[tabled(rename = "Tiling")]
    tiling: String,
    #[tabled(rename = "Description")]
    description: &'static str,
}

fn rows(config: &WingmanConfig) -> Vec<ActionRow> {
    HotkeyAction::ALL
        .into_iter()
        .map(|action| {
            let chords: Vec<&str> = config
                .keybindings
                .iter()
                .filter(|(_, bound)| **bound == action)
                .map(|(chord, _)| chord.as_str())
                .collect();
            let available = config.tiling.enabled || !action.is_tiling();

            ActionRow {
                action: if available { action.to_string() } else { action.to_string().dimmed().to_string() },
                chords: if chords.is_empty() { "-".to_string() } else { chords.join(", ") },
                tiling: output::format_bool(action.is_tiling()),
                description: action.description(),
            }
        })
        .collect()
}

/// Prints every action with the chords bound to it.
pub fn print_actions(config: &WingmanConfig) {
    let table = Table::new(rows(config))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Actions ({})", HotkeyAction::ALL.len()).bold());
    println!("{table}");
    if !config.tiling.enabled {
        println!("{}", "Tiling is disabled: only opacity and decoration actions are active.".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_every_action() {
        let rows = rows(&WingmanConfig::default());
        assert_eq!(rows.len(), HotkeyAction::ALL.len());
    }

    #[test]
    fn test_rows_list_bound_chords() {
        let rows = rows(&WingmanConfig::default());
        let suppress = rows.iter().find(|r| r.action == "suppress").unwrap();
        assert!(suppress.chords.contains("Win+Shift+Up"));
        assert!(suppress.chords.contains("Win+Shift+Down"));
    }

    #[test]
    fn test_unbound_action_shows_placeholder() {
        let mut config = WingmanConfig::default();
        config.keybindings.retain(|_, action| *action != HotkeyAction::ToggleBlur);
        let rows = rows(&config);
        let blur = rows.iter().find(|r| r.action == "toggle-blur").unwrap();
        assert_eq!(blur.chords, "-");
    }
}
