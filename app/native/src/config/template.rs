//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file with documentation for every available
/// configuration option, showing the default values.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Wingman Configuration File
// ==========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Tiling
  // ============================================================================
  // "tiling": {
  //   // Tile windows. When false only opacity and decoration actions work.
  //   "enabled": true,
  //
  //   // Pixels between tiles and around the edges of the screen
  //   "margin": 16,
  //
  //   // Minimum tile width in pixels
  //   "minWindowWidth": 480,
  //
  //   // Maximum number of windows tiled on one monitor
  //   "maxWindowsPerGroup": 4,
  //
  //   // Opacity change per increase/decrease action (0-255 scale)
  //   "opacityStep": 5,
  //
  //   // Opacity applied when a decoration is toggled on
  //   "defaultBlurOpacity": 225,
  //
  //   // Let focus navigation continue onto neighbouring monitors
  //   "overlappingFocusShift": true,
  //
  //   // Exact window titles that are never tiled
  //   "ignoreTitles": [
  //     "Snipping Tool Overlay",
  //     "Recording toolbar",
  //     "Calculator",
  //     "Mechvibes",
  //     "Delete File"
  //   ],
  //
  //   // Regular expressions matched against window titles
  //   "ignoreTitlePatterns": [],
  //
  //   // Ignore dialogs and other windows owned by another window
  //   "ignoreChildren": true,
  //
  //   // How often windows are checked for changes, in milliseconds
  //   "pollIntervalMs": 100
  // },

  // ============================================================================
  // Hotkeys
  // ============================================================================
  // Map chords to actions. Providing this map replaces the default table.
  // Run `wingman actions` to list every action.
  // "keybindings": {
  //   "Win+Left": "shift-left",
  //   "Win+Right": "shift-right",
  //   "Win+Up": "maximize",
  //   "Win+Down": "unmaximize",
  //   "Win+Alt+Left": "resize-left",
  //   "Win+Alt+Right": "resize-right",
  //   "Win+Shift+Left": "focus-left",
  //   "Win+Shift+Right": "focus-right",
  //   "Ctrl+Shift+WheelUp": "increase-opacity",
  //   "Ctrl+Shift+WheelDown": "decrease-opacity",
  //   "Win+Shift+B": "toggle-blur",
  //   "Win+Shift+Up": "suppress",
  //   "Win+Shift+Down": "suppress"
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WingmanConfig, parse_config};

    #[test]
    fn test_template_parses_to_defaults() {
        let template = generate_config_template();
        let config = parse_config(template.as_bytes()).unwrap();
        assert_eq!(config, WingmanConfig::default());
    }

    #[test]
    fn test_template_contains_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("\"tiling\""));
        assert!(template.contains("\"keybindings\""));
        assert!(template.contains("pollIntervalMs"));
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        create_config_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
