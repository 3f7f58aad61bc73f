//! Configuration types for Wingman.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::hotkey::{HotkeyAction, default_keybindings};
use crate::tiling::constants::{opacity, timing};
use crate::tiling::group::GroupLimits;

/// Titles that are never tiled unless the configuration says otherwise.
pub const DEFAULT_IGNORE_TITLES: &[&str] =
    &["Snipping Tool Overlay", "Recording toolbar", "Calculator", "Mechvibes", "Delete File"];

// ============================================================================
// Tiling
// ============================================================================

/// Tiling engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TilingConfig {
    /// Whether windows are tiled at all.
    ///
    /// When disabled only the opacity and decoration actions are available
    /// and windows are left where they are.
    pub enabled: bool,

    /// Pixels between tiles and around the edges of the work-area.
    pub margin: i32,

    /// Global minimum tile width in pixels. Windows that refuse to shrink
    /// this far use their own, larger minimum.
    pub min_window_width: i32,

    /// Maximum number of windows tiled on one monitor.
    pub max_windows_per_group: usize,

    /// Opacity change applied by the increase/decrease actions (0-255 scale).
    pub opacity_step: u8,

    /// Opacity applied when a window's decoration is toggled on.
    pub default_blur_opacity: u8,

    /// Let focus navigation continue onto neighbouring monitors and wrap
    /// around at the outermost one.
    pub overlapping_focus_shift: bool,

    /// Exact window titles that are never managed.
    pub ignore_titles: Vec<String>,

    /// Regular expressions; windows whose title matches any of them are
    /// never managed.
    pub ignore_title_patterns: Vec<String>,

    /// Ignore windows owned by another window (dialogs, tool palettes).
    pub ignore_children: bool,

    /// Interval between two samples of the window set, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            margin: 16,
            min_window_width: 480,
            max_windows_per_group: 4,
            opacity_step: 5,
            default_blur_opacity: 225,
            overlapping_focus_shift: true,
            ignore_titles: DEFAULT_IGNORE_TITLES.iter().map(ToString::to_string).collect(),
            ignore_title_patterns: Vec::new(),
            ignore_children: true,
            poll_interval_ms: timing::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TilingConfig {
    /// Reports every invalid value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing all problems found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.margin < 0 {
            problems.push(format!("tiling.margin must be >= 0 (got {})", self.margin));
        }
        if self.min_window_width <= 0 {
            problems.push(format!("tiling.minWindowWidth must be > 0 (got {})", self.min_window_width));
        }
        if self.max_windows_per_group == 0 {
            problems.push("tiling.maxWindowsPerGroup must be >= 1".to_string());
        }
        if self.default_blur_opacity < opacity::MIN {
            problems.push(format!(
                "tiling.defaultBlurOpacity must be >= {} (got {})",
                opacity::MIN,
                self.default_blur_opacity
            ));
        }
        for pattern in &self.ignore_title_patterns {
            if let Err(err) = Regex::new(pattern) {
                problems.push(format!("tiling.ignoreTitlePatterns: invalid pattern {pattern:?}: {err}"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    /// Copy with every numeric value forced into its valid range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            margin: self.margin.max(0),
            min_window_width: self.min_window_width.max(1),
            max_windows_per_group: self.max_windows_per_group.max(1),
            default_blur_opacity: self.default_blur_opacity.max(opacity::MIN),
            poll_interval_ms: self.poll_interval_ms.max(timing::MIN_POLL_INTERVAL_MS),
            ..self.clone()
        }
    }

    /// Limits applied to every group.
    #[must_use]
    pub const fn limits(&self) -> GroupLimits {
        GroupLimits {
            margin: self.margin,
            min_width: self.min_window_width,
            max_windows: self.max_windows_per_group,
        }
    }

    /// Watcher cadence, never below the engine's lower bound.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(timing::MIN_POLL_INTERVAL_MS))
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WingmanConfig {
    /// Tiling engine settings.
    pub tiling: TilingConfig,

    /// Hotkey table mapping chords to actions.
    ///
    /// Chords are `+`-separated modifiers and a key, matched
    /// case-insensitively. Providing this map replaces the default table.
    ///
    /// Example:
    /// ```json
    /// {
    ///   "keybindings": {
    ///     "Win+Right": "shift-right",
    ///     "Win+Shift+B": "toggle-blur"
    ///   }
    /// }
    /// ```
    pub keybindings: BTreeMap<String, HotkeyAction>,
}

impl Default for WingmanConfig {
    fn default() -> Self {
        Self {
            tiling: TilingConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.wingman.json or $XDG_CONFIG_HOME/wingman/config.json"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The configuration parsed but holds out-of-range values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations:
/// 1. `$XDG_CONFIG_HOME/wingman/config.json` (if `XDG_CONFIG_HOME` is set)
/// 2. `~/.config/wingman/config.json`
/// 3. `<platform config dir>/wingman/config.json`
/// 4. `~/.wingman.json` (simple location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg_config).join("wingman").join("config.json"));
    }

    if let Some(home) = dirs::home_dir() {
        let path = home.join(".config").join("wingman").join("config.json");
        // XDG_CONFIG_HOME might be ~/.config
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("wingman").join("config.json");
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".wingman.json"));
    }

    paths
}

/// Parses JSONC text.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the text is not valid JSON once
/// comments are stripped.
pub fn parse_config(reader: impl std::io::Read) -> Result<WingmanConfig, ConfigError> {
    let reader = json_comments::StripComments::new(reader);
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read and
/// `ConfigError::ParseError` if it contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(WingmanConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path)?;
    Ok((parse_config(file)?, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(WingmanConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}
