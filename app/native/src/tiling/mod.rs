//! Horizontal tiling engine for Wingman.
//!
//! Windows on each monitor are tiled side by side in one ordered group.
//! Keyboard actions reorder windows, move them between monitors, resize the
//! borders they share and move focus; out-of-band changes are picked up by a
//! polling reconciliation loop.
//!
//! # Architecture
//!
//! ```text
//!  visible-set watcher ──┐
//!  window watchers ──────┼──► StateActor ──► TilingState ──► WindowSurface
//!  hotkey dispatcher ────┘      (one task)    screens/groups    (OS or memory)
//!                                              window cache
//! ```
//!
//! - [`state::TilingState`] owns the [`screen::Topology`] (one
//!   [`group::Group`] per monitor) and the window cache
//! - [`actor::StateActor`] is the only task that mutates it
//! - [`watcher`] tasks and the hotkey dispatcher send events and actions
//! - [`surface::WindowSurface`] is the collaborator that talks to the
//!   windowing system; [`surface::MemorySurface`] simulates one

pub mod actor;
pub mod constants;
pub mod error;
pub mod focus;
pub mod group;
pub mod rules;
pub mod screen;
pub mod state;
pub mod surface;
pub mod watcher;
pub mod window;

use std::sync::Arc;
use std::time::Duration;

pub use actor::{ActorError, StateActor, StateActorHandle, StateMessage, StateQuery};
pub use error::{TilingError, TilingResult};
pub use group::{Group, GroupLimits};
pub use rules::WindowFilter;
pub use screen::Topology;
pub use state::{Direction, Rect, ScreenId, TilingSnapshot, TilingState, WindowId};
pub use surface::{MemorySurface, WindowSurface};
use tokio::task::JoinHandle;
pub use window::Window;

use crate::config::TilingConfig;

/// A running tiling engine: the state actor plus the visible-set watcher.
pub struct TilingService {
    handle: StateActorHandle,
    visible_watcher: JoinHandle<()>,
    poll_interval: Duration,
}

impl TilingService {
    /// Build the state from the surface's monitors and start the actor and
    /// the visible-set watcher on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::NoScreens`] if the surface reports no monitors.
    pub fn start(surface: Arc<dyn WindowSurface>, config: TilingConfig) -> TilingResult<Self> {
        let period = config.poll_interval();
        let filter = WindowFilter::from_config(&config);
        let state = TilingState::new(Arc::clone(&surface), config)?;

        let handle = StateActor::spawn(state);
        let visible_watcher = watcher::spawn_visible_watcher(handle.clone(), surface, filter, period);

        tracing::info!(poll_interval_ms = period.as_millis(), "tiling service started");
        Ok(Self { handle, visible_watcher, poll_interval: period })
    }

    /// Handle to the state actor.
    #[must_use]
    pub const fn handle(&self) -> &StateActorHandle { &self.handle }

    /// Wait long enough for the watchers to pick up a desktop change and
    /// for the actor to apply it.
    pub async fn settle(&self) { tokio::time::sleep(self.poll_interval * 3).await; }

    /// Stop the watcher and the actor.
    pub async fn stop(self) {
        self.visible_watcher.abort();
        if self.handle.shutdown().await.is_err() {
            tracing::debug!("state actor already stopped");
        }
        tracing::info!("tiling service stopped");
    }
}
