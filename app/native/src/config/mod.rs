//! Configuration module for Wingman.
//!
//! This module provides configuration types and loading functionality.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    ConfigError, DEFAULT_IGNORE_TITLES, TilingConfig, WingmanConfig, config_paths,
    load_config as load_config_default, load_config_from_path, parse_config,
};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<WingmanConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expands a leading `~` in a user-supplied path.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` to take effect.
///
/// # Returns
///
/// `true` if the path was set successfully, `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Returns the custom configuration path, if one was set.
pub fn custom_config_path() -> Option<&'static PathBuf> { CUSTOM_CONFIG_PATH.get() }

/// Loads the configuration from disk.
///
/// Returns the loaded configuration, or a default configuration if loading
/// fails. Out-of-range values are reported and clamped.
fn load_or_default() -> WingmanConfig {
    let result = CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, |path| load_config_from_path(path));

    let mut config = match result {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            WingmanConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            WingmanConfig::default()
        }
    };

    if let Err(err) = config.tiling.validate() {
        tracing::warn!(error = %err, "configuration has invalid values, clamping");
        config.tiling = config.tiling.sanitized();
    }
    config
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static WingmanConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let msg = ConfigError::NotFound.to_string();
        assert!(msg.contains("No configuration file found"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/wingman.json");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("wingman.json"));
        }
    }

    #[test]
    fn test_expand_path_keeps_plain_paths() {
        assert_eq!(expand_path("/etc/wingman.json"), PathBuf::from("/etc/wingman.json"));
    }
}
