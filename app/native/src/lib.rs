//! Wingman - a keyboard-driven horizontal tiling window manager service.
//!
//! Windows on every monitor are laid out side by side in one ordered group
//! per monitor. Hotkey actions reorder, resize, maximize and restyle the
//! focused window or move focus between tiles, and a polling reconciliation
//! loop keeps the layout in sync with windows opened, closed or moved
//! outside of Wingman.
//!
//! This library provides the tiling engine and the CLI. The binary
//! delegates to [`cli::run`].

pub mod cli;
pub mod config;
pub mod error;
pub mod hotkey;
pub mod logging;
pub mod schema;
pub mod tiling;

use std::sync::Arc;

use tokio::io::AsyncBufRead;

use crate::config::WingmanConfig;
use crate::error::WingmanError;
use crate::hotkey::{HotkeyDispatcher, HotkeyTable};
use crate::tiling::{TilingService, TilingSnapshot, WindowSurface};

/// Runs the tiling service against `surface`, dispatching hotkey triggers
/// read line by line from `input` until `quit`, end of input or Ctrl-C.
///
/// Returns the final layout.
///
/// # Errors
///
/// Returns an error if the surface reports no monitors or the coordinator
/// stops unexpectedly.
pub async fn run_service<R>(
    surface: Arc<dyn WindowSurface>,
    config: &WingmanConfig,
    input: R,
) -> Result<TilingSnapshot, WingmanError>
where
    R: AsyncBufRead + Unpin,
{
    let service = TilingService::start(surface, config.tiling.clone())?;

    let table = HotkeyTable::new(&config.keybindings, config.tiling.enabled);
    tracing::info!(hotkeys = table.len(), tiling = config.tiling.enabled, "hotkey table ready");
    let dispatcher = HotkeyDispatcher::new(table, service.handle().clone());

    // Windows already on screen are loaded before the first trigger.
    service.settle().await;

    let outcome = tokio::select! {
        result = hotkey::run_line_source(input, &dispatcher) => result.map_err(WingmanError::from),
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Ok(())
        }
    };

    let snapshot = match outcome {
        Ok(()) => service.handle().snapshot().await.map_err(WingmanError::from),
        Err(err) => Err(err),
    };
    service.stop().await;
    snapshot
}
