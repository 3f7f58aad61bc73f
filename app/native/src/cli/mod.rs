//! CLI module for Wingman.
//!
//! This module provides the command-line interface: running the tiling
//! service, driving a simulated desktop, and managing the configuration.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::WingmanError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), WingmanError> {
    let cli = Cli::parse();
    cli.execute()
}
