//! State actor module.
//!
//! The state actor owns the [`TilingState`] and processes messages
//! sequentially. Watchers, the hotkey dispatcher and queries all go through
//! its channel, so no group is ever mutated by two callers at once.
//!
//! The actor also owns the per-window watcher tasks: after every message the
//! set of running watchers is reconciled with the window cache, spawning one
//! for each new window and aborting those whose window was evicted.
//!
//! # Panic Recovery
//!
//! If a message handler panics:
//! 1. The panic is caught and logged
//! 2. The actor continues processing subsequent messages
//! 3. State may be partially inconsistent but the system remains operational

mod handle;
pub mod handlers;
mod messages;

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

pub use handle::{ActorError, StateActorHandle};
pub use messages::{QueryResult, StateMessage, StateQuery};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::constants::CHANNEL_BUFFER_SIZE;
use super::state::{TilingState, WindowId};
use super::watcher::spawn_window_watcher;

/// The state actor that owns all tiling state.
pub struct StateActor {
    /// The tiling state owned by this actor.
    state: TilingState,

    /// Receiver for incoming messages.
    receiver: mpsc::Receiver<StateMessage>,

    /// Used to hand senders to the watchers the actor spawns.
    sender: mpsc::WeakSender<StateMessage>,

    /// Per-window watcher tasks.
    watchers: HashMap<WindowId, JoinHandle<()>>,

    /// Polling cadence of the per-window watchers.
    poll_interval: Duration,
}

impl StateActor {
    /// Spawn a new state actor on the current tokio runtime and return a
    /// handle for communication.
    #[must_use]
    pub fn spawn(state: TilingState) -> StateActorHandle {
        tracing::debug!("spawning state actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let actor = Self {
            poll_interval: state.config().poll_interval(),
            state,
            receiver,
            sender: sender.downgrade(),
            watchers: HashMap::new(),
        };

        tokio::spawn(actor.run());

        StateActorHandle::new(sender)
    }

    /// Run the actor's message loop until `Shutdown` or until every sender
    /// is gone.
    async fn run(mut self) {
        tracing::trace!("actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, StateMessage::Shutdown) {
                tracing::debug!("state actor received shutdown message");
                break;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
                self.sync_watchers();
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(message = msg_name, panic = %panic_msg, "actor recovered from panic, state may be inconsistent");
            }
        }

        for (_, watcher) in self.watchers.drain() {
            watcher.abort();
        }
        tracing::debug!("state actor stopped");
    }

    /// Handle a single message.
    fn handle_message(&mut self, msg: StateMessage) {
        match msg {
            StateMessage::WindowAppeared { window_id } => {
                // A re-initialized window gets a fresh watcher.
                self.stop_watcher(window_id);
                handlers::on_window_appeared(&mut self.state, window_id);
            }
            StateMessage::WindowVanished { window_id } => {
                handlers::on_window_vanished(&mut self.state, window_id);
            }
            StateMessage::WindowMoved { window_id, frame } => {
                handlers::on_window_moved(&mut self.state, window_id, frame);
            }
            StateMessage::WindowKilled { window_id } => {
                handlers::on_window_killed(&mut self.state, window_id);
            }
            StateMessage::Hotkey(action) => handlers::on_hotkey(&mut self.state, action),
            StateMessage::Query { query, respond_to } => {
                let result = handlers::on_query(&self.state, query);
                let _ = respond_to.send(result);
            }
            // Handled in `run`.
            StateMessage::Shutdown => {}
        }
    }

    fn stop_watcher(&mut self, window_id: WindowId) {
        if let Some(watcher) = self.watchers.remove(&window_id) {
            watcher.abort();
        }
    }

    /// Match the running watchers to the window cache.
    fn sync_watchers(&mut self) {
        self.watchers.retain(|id, watcher| {
            let keep = self.state.is_tracked(*id) && !watcher.is_finished();
            if !keep {
                watcher.abort();
            }
            keep
        });

        let missing: Vec<WindowId> =
            self.state.window_ids().into_iter().filter(|id| !self.watchers.contains_key(id)).collect();
        if missing.is_empty() {
            return;
        }

        let Some(sender) = self.sender.upgrade() else {
            return;
        };
        for window_id in missing {
            let watcher = spawn_window_watcher(
                StateActorHandle::new(sender.clone()),
                std::sync::Arc::clone(self.state.surface()),
                window_id,
                self.poll_interval,
            );
            self.watchers.insert(window_id, watcher);
            tracing::trace!(window = window_id, "started window watcher");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TilingConfig;
    use crate::hotkey::HotkeyAction;
    use crate::tiling::state::Rect;
    use crate::tiling::surface::{MemorySurface, WindowSpec, WindowSurface};

    fn spawn_actor(surface: &Arc<MemorySurface>) -> StateActorHandle {
        let config = TilingConfig { poll_interval_ms: 10, ..TilingConfig::default() };
        let state = TilingState::new(Arc::clone(surface) as Arc<dyn WindowSurface>, config).unwrap();
        StateActor::spawn(state)
    }

    #[tokio::test]
    async fn test_messages_are_applied_in_order() {
        let surface = Arc::new(MemorySurface::single(1600, 900));
        let handle = spawn_actor(&surface);

        let a = surface.open(WindowSpec::new("a", Rect::from_xywh(0, 0, 600, 400)));
        let b = surface.open(WindowSpec::new("b", Rect::from_xywh(0, 0, 600, 400)));
        handle.send_async(StateMessage::WindowAppeared { window_id: a }).await.unwrap();
        handle.send_async(StateMessage::WindowAppeared { window_id: b }).await.unwrap();
        handle.dispatch(HotkeyAction::ShiftLeft).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.screens[0].windows, vec![b, a]);
        assert_eq!(surface.frame_of(a).unwrap().right, 1584);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_window_query() {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let handle = spawn_actor(&surface);

        let a = surface.open(WindowSpec::new("editor", Rect::from_xywh(0, 0, 600, 400)));
        handle.send_async(StateMessage::WindowAppeared { window_id: a }).await.unwrap();

        let window = handle.window(a).await.unwrap().unwrap();
        assert_eq!(window.title, "editor");
        assert!(handle.window(999).await.unwrap().is_none());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_window_watcher_reports_kill() {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let handle = spawn_actor(&surface);

        let a = surface.open(WindowSpec::new("a", Rect::from_xywh(0, 0, 600, 400)));
        handle.send_async(StateMessage::WindowAppeared { window_id: a }).await.unwrap();
        assert!(handle.window(a).await.unwrap().is_some());

        surface.close(a);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.window(a).await.unwrap().is_none());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let handle = spawn_actor(&surface);

        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_closed());
        assert!(handle.snapshot().await.is_err());
    }
}
