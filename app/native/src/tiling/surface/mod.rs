//! Window Surface collaborator.
//!
//! The tiling engine never talks to the windowing system directly. Every
//! query and mutation goes through the [`WindowSurface`] trait:
//!
//! - geometry: `window_rect`, `frame_bounds`, `move_window`, `monitor_from_rect`
//! - display state: `display_state`, `set_display_state`, `is_visible`
//! - cosmetics: `set_opacity` and the optional decoration hooks
//! - focus: `set_focus`, `foreground_window`
//! - discovery: `monitors`, `enumerate_windows`
//!
//! Implementations must be thread-safe: watcher tasks query the surface
//! concurrently with the coordinator, which is the only caller that mutates.
//!
//! [`MemorySurface`] is a complete in-memory desktop used by the test-suite
//! and by the `simulate` command.

mod memory;

pub use memory::{Insets, MemorySurface, WindowSpec};
use serde::{Deserialize, Serialize};

use super::error::TilingResult;
use super::state::{Rect, ScreenId, WindowId};

/// Identifier of a decoration overlay created by the surface.
pub type DecorationId = u64;

/// Show state of a top-level window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayState {
    /// Restored, freely positioned.
    #[default]
    Normal,
    /// OS-maximized to the monitor work-area.
    Maximized,
    /// Iconified to the task bar.
    Minimized,
}

/// A monitor as reported by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorInfo {
    /// Opaque monitor id.
    pub id: ScreenId,
    /// Usable area (excluding task bars and docks).
    pub work_area: Rect,
    /// Full physical monitor rectangle.
    pub rect: Rect,
}

/// One entry of a window enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceWindow {
    /// Window handle.
    pub id: WindowId,
    /// Title text, empty for untitled windows.
    pub title: String,
    /// Raw window rectangle.
    pub rect: Rect,
    /// Owner window, set for dialogs and other owned windows.
    pub owner: Option<WindowId>,
    /// Hidden by the OS (e.g. placed on another virtual desktop).
    pub cloaked: bool,
    /// Iconified.
    pub minimized: bool,
    /// Visible flag as reported by the OS.
    pub visible: bool,
    /// Whether the window shows a title bar. Tray and tool windows do not.
    pub has_titlebar: bool,
}

/// Low-level window primitives consumed by the tiling engine.
pub trait WindowSurface: Send + Sync {
    /// All monitors, in no particular order.
    fn monitors(&self) -> Vec<MonitorInfo>;

    /// All top-level windows, front to back.
    fn enumerate_windows(&self) -> Vec<SurfaceWindow>;

    /// Raw window rectangle, including invisible resize borders and shadow.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn window_rect(&self, id: WindowId) -> TilingResult<Rect>;

    /// Visible frame bounds, excluding the shadow.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn frame_bounds(&self, id: WindowId) -> TilingResult<Rect>;

    /// Move and resize the raw window rectangle. The window may refuse parts
    /// of the request (for example by enforcing its own minimum width).
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn move_window(&self, id: WindowId, rect: Rect) -> TilingResult<()>;

    /// Current show state.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn display_state(&self, id: WindowId) -> TilingResult<DisplayState>;

    /// Change the show state.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn set_display_state(&self, id: WindowId, state: DisplayState) -> TilingResult<()>;

    /// Whether the window is currently shown (visible and not iconified).
    fn is_visible(&self, id: WindowId) -> bool;

    /// Apply a whole-window opacity (0 transparent, 255 opaque).
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn set_opacity(&self, id: WindowId, opacity: u8) -> TilingResult<()>;

    /// Raise the window and give it input focus.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the handle is invalid.
    fn set_focus(&self, id: WindowId) -> TilingResult<()>;

    /// The window that currently has input focus.
    fn foreground_window(&self) -> Option<WindowId>;

    /// Title text of the window, `None` if the handle is invalid.
    fn window_title(&self, id: WindowId) -> Option<String>;

    /// Owner of the window, `None` for unowned top-level windows.
    fn window_owner(&self, id: WindowId) -> Option<WindowId>;

    /// Monitor showing the largest part of `rect`, `None` when it is off-screen.
    fn monitor_from_rect(&self, rect: Rect) -> Option<ScreenId> {
        self.monitors()
            .into_iter()
            .map(|m| (m.rect.overlap_area(&rect), m.id))
            .filter(|(area, _)| *area > 0)
            .max_by_key(|(area, _)| *area)
            .map(|(_, id)| id)
    }

    /// Create a decoration overlay behind the window. Surfaces without
    /// decoration support return `None`.
    fn create_decoration(&self, _id: WindowId, _rect: Rect) -> Option<DecorationId> { None }

    /// Keep a decoration aligned with its window.
    fn move_decoration(&self, _decoration: DecorationId, _rect: Rect) {}

    /// Destroy a decoration overlay.
    fn destroy_decoration(&self, _decoration: DecorationId) {}
}
