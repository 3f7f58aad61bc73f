//! In-memory desktop implementing [`WindowSurface`].
//!
//! Behaves like a real windowing system in the ways the tiling engine cares
//! about:
//!
//! - windows carry an invisible shadow around their visible frame, so the raw
//!   rectangle and the frame bounds differ
//! - windows may enforce their own minimum width and silently widen placement
//!   requests
//! - maximize/minimize/restore remember the restored rectangle
//! - focus follows the front-to-back stacking order

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{DecorationId, DisplayState, MonitorInfo, SurfaceWindow, WindowSurface};
use crate::tiling::constants::opacity;
use crate::tiling::error::{TilingError, TilingResult};
use crate::tiling::state::{Rect, WindowId};

/// Rectangle reported for iconified windows.
const MINIMIZED_RECT: Rect = Rect {
    left: -32000,
    top: -32000,
    right: -31840,
    bottom: -31972,
};

/// Invisible border between a window's raw rectangle and its visible frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    /// No shadow at all.
    pub const NONE: Self = Self { left: 0, top: 0, right: 0, bottom: 0 };

    /// Drop shadow on the left, right and bottom edges, as drawn by most
    /// desktop compositors.
    #[must_use]
    pub const fn shadow(px: i32) -> Self { Self { left: px, top: 0, right: px, bottom: px } }

    const fn shrink(self, rect: Rect) -> Rect {
        Rect {
            left: rect.left + self.left,
            top: rect.top + self.top,
            right: rect.right - self.right,
            bottom: rect.bottom - self.bottom,
        }
    }

    const fn grow(self, rect: Rect) -> Rect {
        Rect {
            left: rect.left - self.left,
            top: rect.top - self.top,
            right: rect.right + self.right,
            bottom: rect.bottom + self.bottom,
        }
    }
}

/// Description of a window to open on a [`MemorySurface`].
#[derive(Clone, Debug)]
pub struct WindowSpec {
    title: String,
    frame: Rect,
    min_width: i32,
    shadow: Insets,
    owner: Option<WindowId>,
    cloaked: bool,
    has_titlebar: bool,
}

impl WindowSpec {
    /// A plain window with the given title and visible frame.
    #[must_use]
    pub fn new(title: impl Into<String>, frame: Rect) -> Self {
        Self {
            title: title.into(),
            frame,
            min_width: 0,
            shadow: Insets::NONE,
            owner: None,
            cloaked: false,
            has_titlebar: true,
        }
    }

    /// Frame width below which the window refuses to shrink.
    #[must_use]
    pub const fn min_width(mut self, width: i32) -> Self {
        self.min_width = width;
        self
    }

    /// Invisible shadow around the frame.
    #[must_use]
    pub const fn shadow(mut self, insets: Insets) -> Self {
        self.shadow = insets;
        self
    }

    /// Make the window an owned (child) window of `owner`.
    #[must_use]
    pub const fn owned_by(mut self, owner: WindowId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Hide the window on another virtual desktop.
    #[must_use]
    pub const fn cloaked(mut self) -> Self {
        self.cloaked = true;
        self
    }

    /// Open a tool window without a title bar.
    #[must_use]
    pub const fn without_titlebar(mut self) -> Self {
        self.has_titlebar = false;
        self
    }
}

#[derive(Debug)]
struct SimWindow {
    id: WindowId,
    title: String,
    raw: Rect,
    restore: Rect,
    shadow: Insets,
    min_width: i32,
    state: DisplayState,
    visible: bool,
    cloaked: bool,
    owner: Option<WindowId>,
    opacity: u8,
    has_titlebar: bool,
}

impl SimWindow {
    /// Apply the window's own size constraints to a raw placement request.
    fn constrain(&self, raw: Rect) -> Rect {
        let min_raw = self.min_width + self.shadow.left + self.shadow.right;
        let right = raw.right.max(raw.left + min_raw);
        Rect::new(raw.left, raw.top, right, raw.bottom)
    }

    const fn frame(&self) -> Rect {
        match self.state {
            DisplayState::Minimized => self.raw,
            _ => self.shadow.shrink(self.raw),
        }
    }
}

#[derive(Debug, Default)]
struct Desktop {
    monitors: Vec<MonitorInfo>,
    /// Front to back.
    windows: Vec<SimWindow>,
    next_id: WindowId,
    foreground: Option<WindowId>,
    next_decoration: DecorationId,
    decorations: HashMap<DecorationId, (WindowId, Rect)>,
}

impl Desktop {
    fn get(&self, id: WindowId) -> TilingResult<&SimWindow> {
        self.windows.iter().find(|w| w.id == id).ok_or(TilingError::SurfaceGone(id))
    }

    fn get_mut(&mut self, id: WindowId) -> TilingResult<&mut SimWindow> {
        self.windows.iter_mut().find(|w| w.id == id).ok_or(TilingError::SurfaceGone(id))
    }

    fn work_area_for(&self, rect: Rect) -> Option<Rect> {
        self.monitors
            .iter()
            .max_by_key(|m| m.rect.overlap_area(&rect))
            .map(|m| m.work_area)
    }

    /// Pass focus to the front-most shown window other than `leaving`.
    fn refocus_after(&mut self, leaving: WindowId) {
        if self.foreground != Some(leaving) {
            return;
        }
        self.foreground = self
            .windows
            .iter()
            .find(|w| w.id != leaving && w.visible && w.state != DisplayState::Minimized)
            .map(|w| w.id);
    }
}

/// Thread-safe simulated desktop.
#[derive(Debug)]
pub struct MemorySurface {
    desktop: Mutex<Desktop>,
}

impl MemorySurface {
    /// Creates a desktop with the given monitors and no windows.
    #[must_use]
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            desktop: Mutex::new(Desktop {
                monitors,
                next_id: 1,
                next_decoration: 1,
                ..Desktop::default()
            }),
        }
    }

    /// One monitor at the origin whose work-area covers the whole monitor.
    #[must_use]
    pub fn single(width: i32, height: i32) -> Self { Self::side_by_side(1, width, height) }

    /// `count` identical monitors placed left to right, touching edges.
    /// Monitor ids start at 1.
    #[must_use]
    pub fn side_by_side(count: u32, width: i32, height: i32) -> Self {
        let monitors = (0..count)
            .map(|i| {
                let offset = i32::try_from(i).unwrap_or(i32::MAX).saturating_mul(width);
                let rect = Rect::from_xywh(offset, 0, width, height);
                MonitorInfo { id: i + 1, work_area: rect, rect }
            })
            .collect();
        Self::new(monitors)
    }

    /// Opens a window on top of the stack and gives it focus.
    pub fn open(&self, spec: WindowSpec) -> WindowId {
        let mut desktop = self.desktop.lock();
        let id = desktop.next_id;
        desktop.next_id += 1;

        let mut window = SimWindow {
            id,
            title: spec.title,
            raw: spec.shadow.grow(spec.frame),
            restore: Rect::default(),
            shadow: spec.shadow,
            min_width: spec.min_width,
            state: DisplayState::Normal,
            visible: true,
            cloaked: spec.cloaked,
            owner: spec.owner,
            opacity: opacity::MAX,
            has_titlebar: spec.has_titlebar,
        };
        window.raw = window.constrain(window.raw);
        window.restore = window.raw;

        desktop.windows.insert(0, window);
        desktop.foreground = Some(id);
        id
    }

    /// Destroys a window. Returns `false` if it did not exist.
    pub fn close(&self, id: WindowId) -> bool {
        let mut desktop = self.desktop.lock();
        let before = desktop.windows.len();
        desktop.refocus_after(id);
        desktop.windows.retain(|w| w.id != id);
        desktop.decorations.retain(|_, (owner, _)| *owner != id);
        desktop.windows.len() != before
    }

    /// Moves a window's visible frame the way a user drag would.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::SurfaceGone`] if the window does not exist.
    pub fn user_move(&self, id: WindowId, frame: Rect) -> TilingResult<()> {
        let mut desktop = self.desktop.lock();
        let window = desktop.get_mut(id)?;
        window.raw = window.constrain(window.shadow.grow(frame));
        window.state = DisplayState::Normal;
        Ok(())
    }

    /// Hides or shows a window without iconifying it.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::SurfaceGone`] if the window does not exist.
    pub fn set_hidden(&self, id: WindowId, hidden: bool) -> TilingResult<()> {
        let mut desktop = self.desktop.lock();
        desktop.get_mut(id)?.visible = !hidden;
        if hidden {
            desktop.refocus_after(id);
        }
        Ok(())
    }

    /// Moves a window to or from another virtual desktop.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::SurfaceGone`] if the window does not exist.
    pub fn set_cloaked(&self, id: WindowId, cloaked: bool) -> TilingResult<()> {
        self.desktop.lock().get_mut(id)?.cloaked = cloaked;
        Ok(())
    }

    /// Visible frame of a window.
    #[must_use]
    pub fn frame_of(&self, id: WindowId) -> Option<Rect> {
        self.desktop.lock().get(id).ok().map(SimWindow::frame)
    }

    /// Current opacity of a window.
    #[must_use]
    pub fn opacity_of(&self, id: WindowId) -> Option<u8> {
        self.desktop.lock().get(id).ok().map(|w| w.opacity)
    }

    /// Current show state of a window.
    #[must_use]
    pub fn state_of(&self, id: WindowId) -> Option<DisplayState> {
        self.desktop.lock().get(id).ok().map(|w| w.state)
    }

    /// Rectangle of the decoration attached to a window, if any.
    #[must_use]
    pub fn decoration_of(&self, id: WindowId) -> Option<Rect> {
        self.desktop
            .lock()
            .decorations
            .values()
            .find(|(owner, _)| *owner == id)
            .map(|(_, rect)| *rect)
    }

    /// Number of live decorations.
    #[must_use]
    pub fn decoration_count(&self) -> usize { self.desktop.lock().decorations.len() }

    /// Ids of all windows, front to back.
    #[must_use]
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.desktop.lock().windows.iter().map(|w| w.id).collect()
    }
}

impl WindowSurface for MemorySurface {
    fn monitors(&self) -> Vec<MonitorInfo> { self.desktop.lock().monitors.clone() }

    fn enumerate_windows(&self) -> Vec<SurfaceWindow> {
        self.desktop
            .lock()
            .windows
            .iter()
            .map(|w| SurfaceWindow {
                id: w.id,
                title: w.title.clone(),
                rect: w.raw,
                owner: w.owner,
                cloaked: w.cloaked,
                minimized: w.state == DisplayState::Minimized,
                visible: w.visible,
                has_titlebar: w.has_titlebar,
            })
            .collect()
    }

    fn window_rect(&self, id: WindowId) -> TilingResult<Rect> {
        self.desktop.lock().get(id).map(|w| w.raw)
    }

    fn frame_bounds(&self, id: WindowId) -> TilingResult<Rect> {
        self.desktop.lock().get(id).map(SimWindow::frame)
    }

    fn move_window(&self, id: WindowId, rect: Rect) -> TilingResult<()> {
        let mut desktop = self.desktop.lock();
        let window = desktop.get_mut(id)?;
        let constrained = window.constrain(rect);
        match window.state {
            // Iconified windows only remember where they will be restored to.
            DisplayState::Minimized => window.restore = constrained,
            DisplayState::Maximized | DisplayState::Normal => {
                window.raw = constrained;
                window.state = DisplayState::Normal;
            }
        }
        Ok(())
    }

    fn display_state(&self, id: WindowId) -> TilingResult<DisplayState> {
        self.desktop.lock().get(id).map(|w| w.state)
    }

    fn set_display_state(&self, id: WindowId, state: DisplayState) -> TilingResult<()> {
        let mut desktop = self.desktop.lock();
        let current = desktop.get(id)?;
        let (previous, raw, restore, shadow) = (current.state, current.raw, current.restore, current.shadow);
        if previous == state {
            return Ok(());
        }

        let saved = if previous == DisplayState::Normal { raw } else { restore };
        let next_raw = match state {
            DisplayState::Normal => saved,
            DisplayState::Maximized => {
                let area = desktop.work_area_for(saved).unwrap_or(saved);
                shadow.grow(area)
            }
            DisplayState::Minimized => MINIMIZED_RECT,
        };

        if state == DisplayState::Minimized {
            desktop.refocus_after(id);
        }

        let window = desktop.get_mut(id)?;
        window.restore = saved;
        window.raw = next_raw;
        window.state = state;
        Ok(())
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.desktop
            .lock()
            .get(id)
            .is_ok_and(|w| w.visible && w.state != DisplayState::Minimized)
    }

    fn set_opacity(&self, id: WindowId, opacity: u8) -> TilingResult<()> {
        self.desktop.lock().get_mut(id)?.opacity = opacity;
        Ok(())
    }

    fn set_focus(&self, id: WindowId) -> TilingResult<()> {
        let mut desktop = self.desktop.lock();
        let index = desktop
            .windows
            .iter()
            .position(|w| w.id == id)
            .ok_or(TilingError::SurfaceGone(id))?;
        let window = desktop.windows.remove(index);
        desktop.windows.insert(0, window);
        desktop.foreground = Some(id);
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowId> { self.desktop.lock().foreground }

    fn window_title(&self, id: WindowId) -> Option<String> {
        self.desktop.lock().get(id).ok().map(|w| w.title.clone())
    }

    fn window_owner(&self, id: WindowId) -> Option<WindowId> {
        self.desktop.lock().get(id).ok().and_then(|w| w.owner)
    }

    fn create_decoration(&self, id: WindowId, rect: Rect) -> Option<DecorationId> {
        let mut desktop = self.desktop.lock();
        desktop.get(id).ok()?;
        let decoration = desktop.next_decoration;
        desktop.next_decoration += 1;
        desktop.decorations.insert(decoration, (id, rect));
        Some(decoration)
    }

    fn move_decoration(&self, decoration: DecorationId, rect: Rect) {
        if let Some(entry) = self.desktop.lock().decorations.get_mut(&decoration) {
            entry.1 = rect;
        }
    }

    fn destroy_decoration(&self, decoration: DecorationId) {
        self.desktop.lock().decorations.remove(&decoration);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Rect { Rect::from_xywh(100, 100, 800, 600) }

    #[test]
    fn test_side_by_side_monitors_touch() {
        let surface = MemorySurface::side_by_side(2, 1920, 1080);
        let monitors = surface.monitors();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].rect.right, monitors[1].rect.left);
        assert_eq!(monitors[1].id, 2);
    }

    #[test]
    fn test_open_focuses_and_stacks_on_top() {
        let surface = MemorySurface::single(1920, 1080);
        let a = surface.open(WindowSpec::new("a", frame()));
        let b = surface.open(WindowSpec::new("b", frame()));

        assert_eq!(surface.foreground_window(), Some(b));
        assert_eq!(surface.window_ids(), vec![b, a]);
    }

    #[test]
    fn test_shadow_separates_raw_rect_from_frame() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()).shadow(Insets::shadow(7)));

        let raw = surface.window_rect(id).unwrap();
        let bounds = surface.frame_bounds(id).unwrap();
        assert_eq!(bounds, frame());
        assert_eq!(raw.left, bounds.left - 7);
        assert_eq!(raw.right, bounds.right + 7);
        assert_eq!(raw.top, bounds.top);
    }

    #[test]
    fn test_move_honours_window_minimum_width() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()).min_width(600));

        surface.move_window(id, Rect::from_xywh(0, 0, 300, 300)).unwrap();
        assert_eq!(surface.frame_bounds(id).unwrap().width(), 600);
    }

    #[test]
    fn test_minimize_and_restore_round_trip() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()));

        surface.set_display_state(id, DisplayState::Minimized).unwrap();
        assert!(!surface.is_visible(id));
        assert_eq!(surface.foreground_window(), None);

        surface.set_display_state(id, DisplayState::Normal).unwrap();
        assert!(surface.is_visible(id));
        assert_eq!(surface.frame_of(id), Some(frame()));
    }

    #[test]
    fn test_maximize_fills_work_area() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()).shadow(Insets::shadow(7)));

        surface.set_display_state(id, DisplayState::Maximized).unwrap();
        assert_eq!(surface.frame_of(id), Some(Rect::new(0, 0, 1920, 1080)));

        surface.set_display_state(id, DisplayState::Normal).unwrap();
        assert_eq!(surface.frame_of(id), Some(frame()));
    }

    #[test]
    fn test_move_while_minimized_updates_restore_rect() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()));

        surface.set_display_state(id, DisplayState::Minimized).unwrap();
        surface.move_window(id, Rect::from_xywh(0, 0, 500, 500)).unwrap();
        assert_eq!(surface.state_of(id), Some(DisplayState::Minimized));

        surface.set_display_state(id, DisplayState::Normal).unwrap();
        assert_eq!(surface.frame_of(id), Some(Rect::from_xywh(0, 0, 500, 500)));
    }

    #[test]
    fn test_closed_window_reports_gone() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()));

        assert!(surface.close(id));
        assert!(!surface.close(id));
        assert_eq!(surface.window_rect(id), Err(TilingError::SurfaceGone(id)));
    }

    #[test]
    fn test_decoration_lifecycle() {
        let surface = MemorySurface::single(1920, 1080);
        let id = surface.open(WindowSpec::new("a", frame()));

        let deco = surface.create_decoration(id, frame()).unwrap();
        surface.move_decoration(deco, Rect::from_xywh(0, 0, 10, 10));
        assert_eq!(surface.decoration_of(id), Some(Rect::from_xywh(0, 0, 10, 10)));

        surface.destroy_decoration(deco);
        assert_eq!(surface.decoration_count(), 0);
    }

    #[test]
    fn test_monitor_from_rect_prefers_largest_overlap() {
        let surface = MemorySurface::side_by_side(2, 1920, 1080);
        assert_eq!(surface.monitor_from_rect(Rect::new(1800, 0, 2400, 500)), Some(2));
        assert_eq!(surface.monitor_from_rect(MINIMIZED_RECT), None);
    }
}
