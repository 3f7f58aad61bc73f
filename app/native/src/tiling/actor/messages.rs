//! Message types for the state actor.
//!
//! All communication with the state actor happens through messages:
//! - `StateMessage` - events and commands sent to the actor
//! - `StateQuery` - requests for state data (with response channel)
//! - `QueryResult` - responses from queries

use tokio::sync::oneshot;

use crate::hotkey::HotkeyAction;
use crate::tiling::state::{Rect, TilingSnapshot, WindowId, WindowSnapshot};

// ============================================================================
// State Messages
// ============================================================================

/// Messages sent to the state actor.
#[derive(Debug)]
pub enum StateMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Window Events (from the watchers)
    // ════════════════════════════════════════════════════════════════════════
    /// A qualifying window entered the visible set.
    WindowAppeared { window_id: WindowId },

    /// A window left the visible set (minimized, hidden, cloaked).
    WindowVanished { window_id: WindowId },

    /// A window's rectangle changed. `frame` is the new visible frame.
    WindowMoved { window_id: WindowId, frame: Rect },

    /// A window's handle became invalid.
    WindowKilled { window_id: WindowId },

    // ════════════════════════════════════════════════════════════════════════
    // User Commands (from the hotkey source)
    // ════════════════════════════════════════════════════════════════════════
    /// Run a hotkey action against the focused window.
    Hotkey(HotkeyAction),

    // ════════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════════
    /// Query state and receive the result.
    Query {
        query: StateQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    // ════════════════════════════════════════════════════════════════════════
    // Internal
    // ════════════════════════════════════════════════════════════════════════
    /// Stop the actor and every watcher it spawned.
    Shutdown,
}

impl StateMessage {
    /// Returns the message variant name, used in panic reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WindowAppeared { .. } => "WindowAppeared",
            Self::WindowVanished { .. } => "WindowVanished",
            Self::WindowMoved { .. } => "WindowMoved",
            Self::WindowKilled { .. } => "WindowKilled",
            Self::Hotkey(_) => "Hotkey",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries answered by the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateQuery {
    /// Screens, groups and every cached window.
    Snapshot,
    /// One cached window.
    GetWindow { id: WindowId },
}

/// Query responses.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Snapshot(TilingSnapshot),
    Window(Option<WindowSnapshot>),
}
