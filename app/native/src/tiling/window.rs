//! Window state model.
//!
//! A [`Window`] is the coordinator's proxy for one OS window. It caches the
//! visible frame, the border shift used by manual resizing, the opacity and
//! the measured placement constraints. Every method that touches the OS takes
//! the [`WindowSurface`] explicitly; nothing is queried lazily behind a getter.

use serde::{Deserialize, Serialize};

use super::constants::opacity;
use super::error::TilingResult;
use super::state::{Rect, ScreenId, WindowId};
use super::surface::{DecorationId, DisplayState, WindowSurface};

// ============================================================================
// Frame Correction
// ============================================================================

/// Difference between a window's visible frame and its raw rectangle.
///
/// Each component is `frame - raw` for the matching edge. Placement requests
/// are expressed in frame coordinates and converted back with [`Self::to_raw`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCorrection {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl FrameCorrection {
    /// Measure the correction of a window from its current geometry.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn measure(surface: &dyn WindowSurface, id: WindowId) -> TilingResult<Self> {
        let raw = surface.window_rect(id)?;
        let frame = surface.frame_bounds(id)?;
        Ok(Self {
            left: frame.left - raw.left,
            top: frame.top - raw.top,
            right: frame.right - raw.right,
            bottom: frame.bottom - raw.bottom,
        })
    }

    /// Raw rectangle that makes the visible frame land on `frame`.
    #[must_use]
    pub fn to_raw(self, frame: Rect) -> Rect {
        Rect::new(
            frame.left - self.left,
            frame.top - self.top,
            frame.right - self.right,
            frame.bottom - self.bottom,
        )
    }
}

// ============================================================================
// Window
// ============================================================================

/// A tracked top-level window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    id: WindowId,
    title: String,
    rect: Rect,
    screen: Option<ScreenId>,
    l_shift: i32,
    opacity: u8,
    probed_min_width: i32,
    min_width_floor: i32,
    correction: FrameCorrection,
    decoration: Option<DecorationId>,
    visible: bool,
    gone: bool,
}

impl Window {
    /// Creates a window proxy without touching the surface.
    #[must_use]
    pub fn new(id: WindowId, title: impl Into<String>, rect: Rect, min_width_floor: i32) -> Self {
        Self {
            id,
            title: title.into(),
            rect,
            screen: None,
            l_shift: 0,
            opacity: opacity::MAX,
            probed_min_width: 0,
            min_width_floor,
            correction: FrameCorrection::default(),
            decoration: None,
            visible: true,
            gone: false,
        }
    }

    /// Loads a window from the surface.
    ///
    /// With `tiling` enabled the window is restored from OS-maximize, its
    /// frame correction is measured and its real minimum width is probed by
    /// shrinking it to the floor and reading back the achieved size. The
    /// screen is resolved from the final frame and may stay unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window vanished
    /// while being measured.
    pub fn load(
        surface: &dyn WindowSurface,
        id: WindowId,
        title: impl Into<String>,
        min_width_floor: i32,
        tiling: bool,
    ) -> TilingResult<Self> {
        let mut window = Self::new(id, title, surface.frame_bounds(id)?, min_width_floor);

        if tiling {
            window.normalize(surface)?;
            window.correction = FrameCorrection::measure(surface, id)?;
            window.probed_min_width = probe_min_width(surface, id, min_width_floor)?;
            window.rect = surface.frame_bounds(id)?;
        }

        window.screen = surface.monitor_from_rect(window.rect);
        window.visible = surface.is_visible(id);
        Ok(window)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn id(&self) -> WindowId { self.id }

    #[must_use]
    pub fn title(&self) -> &str { &self.title }

    /// Cached visible frame.
    #[must_use]
    pub const fn rect(&self) -> Rect { self.rect }

    /// Screen the window was last attached to or resolved on.
    #[must_use]
    pub const fn screen(&self) -> Option<ScreenId> { self.screen }

    pub const fn set_screen(&mut self, screen: Option<ScreenId>) { self.screen = screen; }

    /// Border shift: pixels taken from this window's default width. Negative
    /// values mean the window has grown.
    #[must_use]
    pub const fn l_shift(&self) -> i32 { self.l_shift }

    pub const fn set_l_shift(&mut self, l_shift: i32) { self.l_shift = l_shift; }

    pub const fn reset_shift(&mut self) { self.l_shift = 0; }

    #[must_use]
    pub const fn opacity(&self) -> u8 { self.opacity }

    #[must_use]
    pub const fn correction(&self) -> FrameCorrection { self.correction }

    #[must_use]
    pub const fn has_decoration(&self) -> bool { self.decoration.is_some() }

    /// Visibility as of the last [`Self::refresh_visibility`].
    #[must_use]
    pub const fn is_visible(&self) -> bool { self.visible }

    /// Smallest width the window can be tiled at: the larger of the probed
    /// shrink floor and the configured floor.
    #[must_use]
    pub fn minimum_width(&self) -> i32 { self.probed_min_width.max(self.min_width_floor) }

    /// Whether the window can give up one margin of width.
    #[must_use]
    pub fn can_shrink(&self, margin: i32) -> bool { self.rect.width() - margin >= self.minimum_width() }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Whether a placement found the handle dead. The coordinator evicts
    /// such windows.
    #[must_use]
    pub const fn is_gone(&self) -> bool { self.gone }

    /// Re-read visibility from the surface and cache it. A window that is
    /// not visible because its handle died is marked gone.
    pub fn refresh_visibility(&mut self, surface: &dyn WindowSurface) -> bool {
        self.visible = surface.is_visible(self.id);
        if !self.visible
            && let Err(err) = surface.frame_bounds(self.id)
        {
            self.gone |= err.is_gone();
        }
        self.visible
    }

    /// Re-read the visible frame from the surface and realign the decoration.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn refresh_rect(&mut self, surface: &dyn WindowSurface) -> TilingResult<Rect> {
        self.rect = surface.frame_bounds(self.id)?;
        self.sync_decoration(surface);
        Ok(self.rect)
    }

    /// Monitor the cached frame is on, according to the surface.
    #[must_use]
    pub fn resolve_screen(&self, surface: &dyn WindowSurface) -> Option<ScreenId> {
        surface.monitor_from_rect(self.rect)
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    /// Place the visible frame at `rect` and return the frame actually achieved.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn draw_in_rect(&mut self, surface: &dyn WindowSurface, rect: Rect) -> TilingResult<Rect> {
        let placed = self.place(surface, rect);
        if let Err(err) = &placed {
            self.gone |= err.is_gone();
        }
        placed
    }

    fn place(&mut self, surface: &dyn WindowSurface, rect: Rect) -> TilingResult<Rect> {
        self.normalize(surface)?;
        surface.move_window(self.id, self.correction.to_raw(rect))?;
        self.refresh_rect(surface)
    }

    /// Leave OS-maximize; tiling owns full-screen as a logical state.
    fn normalize(&mut self, surface: &dyn WindowSurface) -> TilingResult<()> {
        if surface.display_state(self.id)? != DisplayState::Normal {
            surface.set_display_state(self.id, DisplayState::Normal)?;
        }
        Ok(())
    }

    /// Whether the window is currently OS-maximized.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn is_maximized(&self, surface: &dyn WindowSurface) -> TilingResult<bool> {
        Ok(surface.display_state(self.id)? == DisplayState::Maximized)
    }

    /// Take up the whole work-area.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn maximize(&mut self, surface: &dyn WindowSurface) -> TilingResult<()> {
        surface.set_display_state(self.id, DisplayState::Maximized)?;
        self.refresh_rect(surface)?;
        tracing::debug!(window = self.id, "maximized");
        Ok(())
    }

    /// Leave OS-maximize without re-tiling; the caller rearranges the group.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn restore(&mut self, surface: &dyn WindowSurface) -> TilingResult<()> {
        surface.set_display_state(self.id, DisplayState::Normal)?;
        self.refresh_rect(surface)?;
        Ok(())
    }

    /// Iconify the window. Group membership is handled by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn minimize(&mut self, surface: &dyn WindowSurface) -> TilingResult<()> {
        surface.set_display_state(self.id, DisplayState::Minimized)?;
        self.refresh_rect(surface)?;
        self.visible = false;
        tracing::debug!(window = self.id, "minimized");
        Ok(())
    }

    /// Raise the window and give it input focus.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn focus(&self, surface: &dyn WindowSurface) -> TilingResult<()> {
        surface.set_focus(self.id)?;
        tracing::debug!(window = self.id, title = %self.title, "focused");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Cosmetics
    // ------------------------------------------------------------------------

    /// Raise opacity by `step`, capped at fully opaque.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn increase_opacity(&mut self, surface: &dyn WindowSurface, step: u8) -> TilingResult<u8> {
        self.set_opacity(surface, self.opacity.saturating_add(step))
    }

    /// Lower opacity by `step`, floored at the minimum opacity.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn decrease_opacity(&mut self, surface: &dyn WindowSurface, step: u8) -> TilingResult<u8> {
        self.set_opacity(surface, self.opacity.saturating_sub(step))
    }

    /// Clamp and apply an opacity value. Returns the applied value.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn set_opacity(&mut self, surface: &dyn WindowSurface, value: u8) -> TilingResult<u8> {
        let value = value.clamp(opacity::MIN, opacity::MAX);
        surface.set_opacity(self.id, value)?;
        self.opacity = value;
        tracing::debug!(window = self.id, opacity = value, "updated opacity");
        Ok(value)
    }

    /// Create or destroy the decoration overlay. Enabling fades the window
    /// to `blur_opacity`, disabling makes it opaque again. Returns whether the
    /// decoration is now present.
    ///
    /// # Errors
    ///
    /// Returns [`super::TilingError::SurfaceGone`] if the window is gone.
    pub fn toggle_blur(&mut self, surface: &dyn WindowSurface, blur_opacity: u8) -> TilingResult<bool> {
        if let Some(decoration) = self.decoration.take() {
            surface.destroy_decoration(decoration);
            self.set_opacity(surface, opacity::MAX)?;
            tracing::info!(window = self.id, "disabled decoration");
            return Ok(false);
        }

        self.decoration = surface.create_decoration(self.id, self.rect);
        self.set_opacity(surface, blur_opacity)?;
        tracing::info!(window = self.id, "enabled decoration");
        Ok(true)
    }

    /// Destroy the decoration, if any. Used when the window is torn down.
    pub fn destroy_decoration(&mut self, surface: &dyn WindowSurface) {
        if let Some(decoration) = self.decoration.take() {
            surface.destroy_decoration(decoration);
        }
    }

    fn sync_decoration(&self, surface: &dyn WindowSurface) {
        if let Some(decoration) = self.decoration {
            surface.move_decoration(decoration, self.rect);
        }
    }
}

/// Shrink the window to a `floor`-sized square, read back the frame width it
/// actually accepted and put it back where it was.
fn probe_min_width(surface: &dyn WindowSurface, id: WindowId, floor: i32) -> TilingResult<i32> {
    let start = surface.window_rect(id)?;
    surface.move_window(id, Rect::from_xywh(0, 0, floor, floor))?;
    let achieved = surface.frame_bounds(id)?.width();
    surface.move_window(id, start)?;
    Ok(achieved)
}

// ============================================================================
// Tests
// ============================================================================
