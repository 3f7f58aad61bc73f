//! Group arrangement.
//!
//! A [`Group`] is the per-screen tiling container: an ordered list of window
//! ids whose order is the left-to-right order on screen. The group owns the
//! arrangement algorithm but not the windows themselves; every operation that
//! needs window state borrows the coordinator's [`WindowMap`].
//!
//! # Arrangement
//!
//! Each visible member gets `ceil(work_width / member_count)` pixels minus one
//! margin, adjusted by the border shifts on its left (its own `l_shift`) and
//! on its right (the next member's `l_shift`). The next member starts one
//! margin after the previous member's *achieved* right edge, so a window that
//! refuses a placement pushes its followers instead of overlapping them. The
//! last visible member is always pinned to the work-area's right edge.

use std::collections::HashMap;

use super::error::{TilingError, TilingResult};
use super::state::{Direction, Rect, ScreenId, WindowId, WindowIdList};
use super::surface::WindowSurface;
use super::window::Window;

/// Window cache owned by the coordinator.
pub type WindowMap = HashMap<WindowId, Window>;

/// Sizing limits applied to every group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupLimits {
    /// Pixels between tiles and around the work-area.
    pub margin: i32,
    /// Global minimum tile width.
    pub min_width: i32,
    /// Group capacity.
    pub max_windows: usize,
}

impl Default for GroupLimits {
    fn default() -> Self { Self { margin: 16, min_width: 480, max_windows: 4 } }
}

/// Result of [`Group::shift`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// The window traded places with its neighbour.
    Moved,
    /// The window is already the outermost member on that side.
    AtBoundary,
}

/// Ordered tiling container of one screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    screen: ScreenId,
    work_area: Rect,
    windows: WindowIdList,
}

impl Group {
    /// Creates an empty group covering `work_area` of `screen`.
    #[must_use]
    pub fn new(screen: ScreenId, work_area: Rect) -> Self {
        Self { screen, work_area, windows: WindowIdList::new() }
    }

    #[must_use]
    pub const fn screen(&self) -> ScreenId { self.screen }

    #[must_use]
    pub const fn work_area(&self) -> Rect { self.work_area }

    /// Members, left to right.
    #[must_use]
    pub fn windows(&self) -> &[WindowId] { &self.windows }

    #[must_use]
    pub fn len(&self) -> usize { self.windows.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool { self.windows.contains(&id) }

    #[must_use]
    pub fn position(&self, id: WindowId) -> Option<usize> { self.windows.iter().position(|w| *w == id) }

    /// Outermost member on the given side.
    #[must_use]
    pub fn boundary(&self, side: Direction) -> Option<WindowId> {
        match side {
            Direction::Left => self.windows.first().copied(),
            Direction::Right => self.windows.last().copied(),
        }
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Checks whether `candidate` fits next to the current members.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WontFit`] if the minimum widths of all members,
    /// their margins and the candidate exceed the work-area width.
    pub fn check_fit(&self, windows: &WindowMap, candidate: &Window, limits: GroupLimits) -> TilingResult<()> {
        let occupied: i32 = self
            .windows
            .iter()
            .filter_map(|id| windows.get(id))
            .map(|w| w.minimum_width() + limits.margin)
            .sum();
        let required = occupied + candidate.minimum_width();
        let available = self.work_area.width();

        if required > available {
            return Err(TilingError::WontFit { required, available });
        }
        Ok(())
    }

    /// Predicate form of [`Self::check_fit`].
    #[must_use]
    pub fn can_fit(&self, windows: &WindowMap, candidate: &Window, limits: GroupLimits) -> bool {
        match self.check_fit(windows, candidate, limits) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(window = candidate.id(), screen = self.screen, %err, "group can't fit window");
                false
            }
        }
    }

    /// Adds a window on the given side and rearranges.
    ///
    /// Every member's border shift is reset, as is the new window's. On
    /// success the window's screen is set to this group's screen.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::CapacityExceeded`] or [`TilingError::WontFit`]
    /// with the group left untouched, or [`TilingError::WindowNotFound`] if
    /// the window is not cached.
    pub fn try_attach(
        &mut self,
        id: WindowId,
        side: Direction,
        windows: &mut WindowMap,
        surface: &dyn WindowSurface,
        limits: GroupLimits,
    ) -> TilingResult<()> {
        if self.contains(id) {
            return Ok(());
        }

        let candidate = windows.get(&id).ok_or(TilingError::WindowNotFound(id))?;
        if self.windows.len() >= limits.max_windows {
            return Err(TilingError::CapacityExceeded { max: limits.max_windows });
        }
        self.check_fit(windows, candidate, limits)?;

        for member in self.windows.iter().chain(std::iter::once(&id)) {
            if let Some(window) = windows.get_mut(member) {
                window.reset_shift();
            }
        }

        match side {
            Direction::Left => self.windows.insert(0, id),
            Direction::Right => self.windows.push(id),
        }
        if let Some(window) = windows.get_mut(&id) {
            window.set_screen(Some(self.screen));
        }

        tracing::info!(window = id, screen = self.screen, side = %side, members = self.windows.len(), "attached window to group");
        self.rearrange(windows, surface, limits);
        Ok(())
    }

    /// Boolean form of [`Self::try_attach`]; refusals are logged.
    pub fn attach(
        &mut self,
        id: WindowId,
        side: Direction,
        windows: &mut WindowMap,
        surface: &dyn WindowSurface,
        limits: GroupLimits,
    ) -> bool {
        match self.try_attach(id, side, windows, surface, limits) {
            Ok(()) => true,
            Err(err) => {
                tracing::info!(window = id, screen = self.screen, %err, "group refused window");
                false
            }
        }
    }

    /// Removes a window and rearranges the rest. Returns `false` (and does
    /// nothing) if the window is not a member.
    pub fn remove(
        &mut self,
        id: WindowId,
        windows: &mut WindowMap,
        surface: &dyn WindowSurface,
        limits: GroupLimits,
    ) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.windows.remove(index);
        tracing::info!(window = id, screen = self.screen, "removed window from group");
        self.rearrange(windows, surface, limits);
        true
    }

    // ------------------------------------------------------------------------
    // Arrangement
    // ------------------------------------------------------------------------

    /// Recompute and apply every visible member's rectangle. Members whose
    /// handle turns out to be dead are flagged gone and take no space.
    pub fn rearrange(&self, windows: &mut WindowMap, surface: &dyn WindowSurface, limits: GroupLimits) {
        if self.windows.is_empty() {
            return;
        }

        let visible: WindowIdList = self
            .windows
            .iter()
            .copied()
            .filter(|id| windows.get_mut(id).is_some_and(|w| w.refresh_visibility(surface)))
            .collect();

        let area = self.work_area;
        let margin = limits.margin;
        let count = i32::try_from(self.windows.len()).unwrap_or(i32::MAX);
        let base_width = (area.width() + count - 1) / count;
        let top = area.top + margin;
        let bottom = area.bottom - margin;
        let mut prev_right = area.left;

        for (index, id) in visible.iter().enumerate() {
            let next_shift = visible.get(index + 1).and_then(|next| windows.get(next)).map(Window::l_shift);
            let Some(window) = windows.get_mut(id) else {
                continue;
            };

            let left = prev_right + margin;
            let mut right = left + base_width - margin - window.l_shift();

            if let Some(shift) = next_shift {
                right += shift;
                if right - left < limits.min_width {
                    right = left + limits.min_width;
                }
            } else {
                right = area.right - margin;
            }

            let target = Rect::new(left, top, right, bottom);
            prev_right = match window.draw_in_rect(surface, target) {
                Ok(achieved) => achieved.right,
                // A dead member gives its slot to the next one.
                Err(err) if err.is_gone() => {
                    tracing::debug!(window = id, "window gone while placing it");
                    prev_right
                }
                Err(err) => {
                    tracing::warn!(window = id, %err, "failed to place window");
                    right
                }
            };
        }

        tracing::debug!(screen = self.screen, members = self.windows.len(), visible = visible.len(), "rearranged group");
    }

    /// Move a window one slot toward `direction`, trading border shifts with
    /// the neighbour it swapped with, and rearrange.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::UnregisteredOperand`] if the window is not a member.
    pub fn shift(
        &mut self,
        id: WindowId,
        direction: Direction,
        windows: &mut WindowMap,
        surface: &dyn WindowSurface,
        limits: GroupLimits,
    ) -> TilingResult<ShiftOutcome> {
        let index = self.position(id).ok_or(TilingError::UnregisteredOperand(id))?;
        let Some(other) = self.neighbour_index(index, direction) else {
            return Ok(ShiftOutcome::AtBoundary);
        };

        self.windows.swap(index, other);
        let sibling = self.windows[index];
        swap_shifts(windows, id, sibling);

        tracing::info!(window = id, direction = %direction, "shifted window within group");
        self.rearrange(windows, surface, limits);
        Ok(ShiftOutcome::Moved)
    }

    /// Grow a window toward `direction` by one margin, taking the space from
    /// the nearest neighbour on that side that can still shrink. Returns
    /// whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::UnregisteredOperand`] if the window is not a member.
    pub fn resize(
        &self,
        id: WindowId,
        direction: Direction,
        windows: &mut WindowMap,
        surface: &dyn WindowSurface,
        limits: GroupLimits,
    ) -> TilingResult<bool> {
        let index = self.position(id).ok_or(TilingError::UnregisteredOperand(id))?;
        let last = self.windows.len() - 1;
        if last == 0 {
            tracing::info!(window = id, "can't stretch the only window in group");
            return Ok(false);
        }

        // Pushing an outer border outward grows the inner neighbour instead.
        let index = match direction {
            Direction::Left if index == 0 => 1,
            Direction::Right if index == last => last - 1,
            _ => index,
        };
        let target = self.windows[index];
        let margin = limits.margin;

        if direction == Direction::Right && shift_of(windows, target) < 0 {
            add_shift(windows, target, margin);
            self.rearrange(windows, surface, limits);
            return Ok(true);
        }

        let neighbours: WindowIdList = match direction {
            Direction::Left => self.windows[..index].iter().rev().copied().collect(),
            Direction::Right => self.windows[index + 1..].iter().copied().collect(),
        };

        let mut skipped = WindowIdList::new();
        for neighbour in neighbours {
            // The cached width may predate the last placement.
            let shrinkable = windows
                .get_mut(&neighbour)
                .is_some_and(|w| w.refresh_rect(surface).is_ok() && w.can_shrink(margin));
            if !shrinkable {
                skipped.push(neighbour);
                continue;
            }

            // Skipped windows move along with the border so they keep their width.
            let (delta, first) = match direction {
                Direction::Left => (-margin, target),
                Direction::Right => (margin, neighbour),
            };
            add_shift(windows, first, delta);
            for skipped_id in &skipped {
                add_shift(windows, *skipped_id, delta);
            }

            tracing::info!(window = target, direction = %direction, shrunk = neighbour, "resized window");
            self.rearrange(windows, surface, limits);
            return Ok(true);
        }

        tracing::info!(window = target, direction = %direction, "can't stretch window, no neighbour can shrink");
        Ok(false)
    }

    fn neighbour_index(&self, index: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Left => index.checked_sub(1),
            Direction::Right => (index + 1 < self.windows.len()).then_some(index + 1),
        }
    }
}

fn shift_of(windows: &WindowMap, id: WindowId) -> i32 { windows.get(&id).map_or(0, Window::l_shift) }

fn add_shift(windows: &mut WindowMap, id: WindowId, delta: i32) {
    if let Some(window) = windows.get_mut(&id) {
        window.set_l_shift(window.l_shift() + delta);
    }
}

fn swap_shifts(windows: &mut WindowMap, a: WindowId, b: WindowId) {
    let (shift_a, shift_b) = (shift_of(windows, a), shift_of(windows, b));
    if let Some(window) = windows.get_mut(&a) {
        window.set_l_shift(shift_b);
    }
    if let Some(window) = windows.get_mut(&b) {
        window.set_l_shift(shift_a);
    }
}

// ============================================================================
// Tests
// ============================================================================
