//! Error types for Wingman.
//!
//! This module provides the unified error type returned by the CLI and the
//! service entry points. Lower layers keep their own typed errors
//! ([`TilingError`], [`ConfigError`], [`ActorError`], [`HotkeyError`]) and
//! are flattened into [`WingmanError`] at the boundary.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::hotkey::HotkeyError;
use crate::tiling::{ActorError, TilingError};

/// Errors that can occur during application execution.
///
/// Serializes as `{ "kind": ..., "message": ... }` so it can be printed as
/// JSON by commands that emit machine-readable output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum WingmanError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Tiling engine operation failed.
    #[error("Tiling error: {0}")]
    TilingError(String),
    /// The tiling coordinator could not be reached.
    #[error("Actor error: {0}")]
    ActorError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for WingmanError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for WingmanError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<ConfigError> for WingmanError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<TilingError> for WingmanError {
    fn from(err: TilingError) -> Self { Self::TilingError(err.to_string()) }
}

impl From<ActorError> for WingmanError {
    fn from(err: ActorError) -> Self { Self::ActorError(err.to_string()) }
}

impl From<HotkeyError> for WingmanError {
    fn from(err: HotkeyError) -> Self {
        match err {
            HotkeyError::Actor(actor) => actor.into(),
            other => Self::InvalidArguments(other.to_string()),
        }
    }
}

impl From<String> for WingmanError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for WingmanError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::HotkeyAction;

    #[test]
    fn test_invalid_arguments_display() {
        let err = WingmanError::InvalidArguments("--monitors must be at least 1".to_string());
        assert_eq!(err.to_string(), "--monitors must be at least 1");
    }

    #[test]
    fn test_config_error_display() {
        let err = WingmanError::ConfigError("Invalid JSON".to_string());
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_tiling_error_conversion() {
        let err: WingmanError = TilingError::NoScreens.into();
        assert!(matches!(err, WingmanError::TilingError(_)));
        assert!(err.to_string().starts_with("Tiling error:"));
    }

    #[test]
    fn test_actor_error_conversion() {
        let err: WingmanError = ActorError::SendFailed.into();
        assert!(matches!(err, WingmanError::ActorError(_)));
        assert!(err.to_string().contains("channel closed"));
    }

    #[test]
    fn test_hotkey_error_conversion() {
        let err: WingmanError = HotkeyError::UnknownTrigger("Win+Q".to_string()).into();
        assert!(matches!(err, WingmanError::InvalidArguments(_)));

        let err: WingmanError = HotkeyError::Disabled(HotkeyAction::Maximize).into();
        assert!(matches!(err, WingmanError::InvalidArguments(_)));

        let err: WingmanError = HotkeyError::Actor(ActorError::SendFailed).into();
        assert!(matches!(err, WingmanError::ActorError(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WingmanError = io_err.into();
        assert!(matches!(err, WingmanError::IoError(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: WingmanError = ConfigError::NotFound.into();
        assert!(matches!(err, WingmanError::ConfigError(_)));
    }

    #[test]
    fn test_from_str_and_string() {
        let err: WingmanError = "boom".into();
        assert!(matches!(err, WingmanError::CommandError(ref m) if m == "boom"));
        let err: WingmanError = String::from("bang").into();
        assert_eq!(err.to_string(), "bang");
    }

    #[test]
    fn test_serializes_with_kind_and_message() {
        let err = WingmanError::TilingError("no monitors".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "TilingError");
        assert_eq!(json["message"], "no monitors");
    }
}
