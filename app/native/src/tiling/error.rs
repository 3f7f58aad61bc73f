//! Error types for the tiling engine.
//!
//! No tiling error is fatal to the process. Every variant maps to one of the
//! recovery strategies used by the coordinator:
//!
//! - **Refusals** (`CapacityExceeded`, `WontFit`): the caller falls back to
//!   attaching the window to any other group, and minimizes it if none fits
//! - **`SurfaceGone`**: the window handle is dead; it is torn down like a
//!   killed window and never retried
//! - **`UnregisteredOperand`**: an operation targeted a window outside every
//!   group; the window is registered and the operation proceeds
//! - **Lookup errors**: logged and ignored
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::tiling::error::{TilingError, TilingResult};
//!
//! fn rect_of(surface: &dyn WindowSurface, id: WindowId) -> TilingResult<Rect> {
//!     surface.window_rect(id)
//! }
//! ```

use super::state::{ScreenId, WindowId};

/// Result type alias for tiling operations.
pub type TilingResult<T> = Result<T, TilingError>;

/// Errors that can occur during tiling operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TilingError {
    /// The group already holds the configured maximum number of windows.
    #[error("group is full ({max} windows)")]
    CapacityExceeded {
        /// Configured group capacity.
        max: usize,
    },

    /// The combined minimum widths of the group would exceed its work-area.
    #[error("window won't fit: {required}px of minimum widths on a {available}px work-area")]
    WontFit {
        /// Width needed by existing members, margins and the new window.
        required: i32,
        /// Work-area width of the group's screen.
        available: i32,
    },

    /// The window handle is no longer valid on the surface.
    #[error("window {0} is gone")]
    SurfaceGone(WindowId),

    /// An operation was invoked on a window that is not in any group.
    #[error("window {0} is not registered in any group")]
    UnregisteredOperand(WindowId),

    /// The window is not tracked by the coordinator.
    #[error("window {0} not found")]
    WindowNotFound(WindowId),

    /// No screen with the given id exists in the topology.
    #[error("screen {0} not found")]
    ScreenNotFound(ScreenId),

    /// The surface reported no monitors at all.
    #[error("no screens available")]
    NoScreens,

    /// Any other surface failure.
    #[error("surface error: {0}")]
    Surface(String),
}

impl TilingError {
    /// Returns `true` for refusals that the attach-to-any-group fallback handles.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. } | Self::WontFit { .. })
    }

    /// Returns `true` if the window must be torn down rather than retried.
    #[must_use]
    pub const fn is_gone(&self) -> bool { matches!(self, Self::SurfaceGone(_)) }
}

// ============================================================================
// Tests
// ============================================================================
