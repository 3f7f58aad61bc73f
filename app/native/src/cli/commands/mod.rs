//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `actions` - Hotkey action listing
//! - `config_cmd` - Configuration file commands
//! - `desktop` - Running the service and the desktop simulator

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::WingmanError;
use crate::{config, logging, schema};

pub mod actions;
pub mod config_cmd;
pub mod desktop;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wingman CLI - keyboard-driven horizontal tiling window manager.
#[derive(Parser, Debug)]
#[command(name = "wingman")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH", env = "WINGMAN_CONFIG")]
    pub config: Option<String>,

    /// Log level (error, warn, info, debug, trace) or a full filter directive.
    ///
    /// `WINGMAN_LOG` and `RUST_LOG` take precedence when set.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable all log output.
    #[arg(long, short = 's', global = true, alias = "supress")]
    pub quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Simulated desktop geometry shared by `run` and `simulate`.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopArgs {
    /// Number of monitors, placed left to right.
    #[arg(long, default_value_t = 1)]
    pub monitors: u32,

    /// Width of each monitor in pixels.
    #[arg(long, default_value_t = 1920)]
    pub width: i32,

    /// Height of each monitor in pixels.
    #[arg(long, default_value_t = 1080)]
    pub height: i32,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the tiling service.
    ///
    /// Starts the coordinator and the reconciliation loop on a simulated
    /// desktop and dispatches hotkey triggers read from stdin, one per line.
    /// A trigger is either a bound chord (`Win+Left`) or an action name
    /// (`shift-left`). The final layout is printed on `quit` or end of input.
    #[command(after_long_help = r#"Examples:
  printf 'Win+Left\nquit\n' | wingman run --open editor --open terminal
  wingman run --monitors 2 --width 2560 --height 1440"#)]
    Run {
        #[command(flatten)]
        desktop: DesktopArgs,

        /// Open a window with this title before starting. Repeatable.
        #[arg(long, value_name = "TITLE")]
        open: Vec<String>,

        /// Print the final layout as JSON.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Drive a simulated desktop interactively.
    ///
    /// Reads commands from stdin: `open <title> [min-width]`, `close <id>`,
    /// `minimize <id>`, `restore <id>`, `focus <id>`,
    /// `move <id> <left> <top> <right> <bottom>`, `dump`, `quit`. Any other
    /// line is dispatched as a hotkey trigger.
    Simulate {
        #[command(flatten)]
        desktop: DesktopArgs,

        /// Print dumps as JSON.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// List hotkey actions and the chords bound to them.
    Actions,

    /// Configuration file management commands.
    ///
    /// Initialize, view, and manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Wingman configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(wingman completions --shell zsh)"
    ///   wingman completions --shell fish > ~/.config/fish/completions/wingman.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_deref().map(config::expand_path) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), WingmanError> {
        logging::init(self.log_level.as_deref(), self.quiet);

        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(WingmanError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match &self.command {
            Commands::Run { desktop, open, json } => desktop::run(*desktop, open, *json),
            Commands::Simulate { desktop, json } => desktop::simulate(*desktop, *json),
            Commands::Actions => {
                actions::print_actions(config::init());
                Ok(())
            }
            Commands::Config(cmd) => config_cmd::execute(cmd),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "wingman", &mut io::stdout());
    }
}
