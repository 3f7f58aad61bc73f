//! Config CLI commands.
//!
//! Commands for managing the Wingman configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::WingmanError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  wingman config init              # Create config at default location
  wingman config init --force      # Overwrite existing config
  wingman config init --path ~/my-config.json  # Create at custom path
  wingman config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses the first search path.
        #[arg(long, short, value_name = "PATH")]
        path: Option<String>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where Wingman looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,

    /// Print the effective configuration.
    ///
    /// Shows the loaded file merged with defaults, after out-of-range values
    /// have been clamped.
    Show,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), WingmanError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.as_deref().map(config::expand_path))
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
        ConfigCommands::Show => show_config(),
    }
}

/// Where `config init` writes when no path is given.
fn default_init_path() -> PathBuf {
    config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("wingman.json"))
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), WingmanError> {
    let config_path = custom_path.unwrap_or_else(default_init_path);

    if config_path.exists() && !force {
        return Err(WingmanError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        WingmanError::ConfigError(format!("Failed to create config file {}: {e}", config_path.display()))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Show the configuration file search paths.
fn show_config_path() {
    if let Some(custom) = config::custom_config_path() {
        println!("Using configuration from --config: {}", custom.display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)".green().to_string()
        } else if exists {
            " (exists)".dimmed().to_string()
        } else {
            String::new()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'wingman config init' to create one.");
    }
}

/// Print the effective configuration as JSON.
fn show_config() -> Result<(), WingmanError> {
    let loaded = config::init();
    match config::get_config_path() {
        Some(path) => println!("{} {}", "Source:".bold(), path.display()),
        None => println!("{} {}", "Source:".bold(), "defaults".dimmed()),
    }
    output::print_highlighted_json(&serde_json::to_value(loaded)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_init_path_is_a_json_file() {
        let path = default_init_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[test]
    fn test_init_config_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wingman").join("config.json");

        init_config(false, Some(path.clone())).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, generate_config_template());
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let err = init_config(false, Some(path.clone())).unwrap_err();
        assert!(matches!(err, WingmanError::ConfigError(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        init_config(true, Some(path.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
