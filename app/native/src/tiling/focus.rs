//! Focus navigator.
//!
//! Picks the window that directional focus should move to. Candidates are the
//! visible cached windows on a screen whose edge lies beyond the focused
//! window's edge; the closest edge wins.
//!
//! When the focused screen has no candidate and overlapping focus is enabled,
//! the adjacent screen in that direction is searched the same way. Failing
//! that, focus wraps to the outermost screen on the *opposite* side and lands
//! on that group's boundary window, unless that screen is the current one.

use super::group::WindowMap;
use super::screen::Topology;
use super::state::{Direction, ScreenId, WindowId};
use super::surface::WindowSurface;
use super::window::Window;

/// Finds the window that should receive focus when moving from `current`
/// toward `direction`. Returns `None` when focus should stay where it is.
#[must_use]
pub fn focus_target(
    topology: &Topology,
    windows: &WindowMap,
    surface: &dyn WindowSurface,
    current: &Window,
    direction: Direction,
    overlapping: bool,
) -> Option<WindowId> {
    let current_screen = current.resolve_screen(surface).or_else(|| current.screen())?;

    if let Some(id) = nearest_on_screen(windows, surface, current, current_screen, direction) {
        tracing::debug!(from = current.id(), to = id, direction = %direction, "focus stays on screen");
        return Some(id);
    }

    if !overlapping {
        return None;
    }

    if let Some(neighbour) = topology.neighbour(current_screen, direction)
        && let Some(id) = nearest_on_screen(windows, surface, current, neighbour, direction)
    {
        tracing::debug!(from = current.id(), to = id, screen = neighbour, "focus moved to neighbour screen");
        return Some(id);
    }

    let wrap = topology.outermost(direction.opposite())?;
    if wrap == current_screen {
        return None;
    }

    let id = topology.get(wrap)?.group().boundary(direction.opposite())?;
    tracing::debug!(from = current.id(), to = id, screen = wrap, "focus wrapped around");
    Some(id)
}

/// Closest visible window on `screen` whose edge lies beyond `current`'s edge
/// in `direction`.
fn nearest_on_screen(
    windows: &WindowMap,
    surface: &dyn WindowSurface,
    current: &Window,
    screen: ScreenId,
    direction: Direction,
) -> Option<WindowId> {
    let origin = current.rect();
    let candidates = windows.values().filter(|w| {
        w.id() != current.id()
            && surface.is_visible(w.id())
            && w.resolve_screen(surface).or_else(|| w.screen()) == Some(screen)
    });

    match direction {
        Direction::Left => candidates
            .filter(|w| w.rect().left < origin.left)
            .max_by_key(|w| (w.rect().left, std::cmp::Reverse(w.id())))
            .map(Window::id),
        Direction::Right => candidates
            .filter(|w| w.rect().right > origin.right)
            .min_by_key(|w| (w.rect().right, w.id()))
            .map(Window::id),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::group::GroupLimits;
    use crate::tiling::state::Rect;
    use crate::tiling::surface::{DisplayState, MemorySurface, WindowSpec};

    const LIMITS: GroupLimits = GroupLimits { margin: 16, min_width: 480, max_windows: 4 };

    struct Desk {
        surface: MemorySurface,
        topology: Topology,
        windows: WindowMap,
    }

    impl Desk {
        fn new(screens: u32) -> Self {
            let surface = MemorySurface::side_by_side(screens, 1920, 1080);
            let topology = Topology::build(&surface.monitors()).unwrap();
            Self { surface, topology, windows: WindowMap::new() }
        }

        /// Open a window and tile it on `screen`.
        fn tile(&mut self, screen: ScreenId) -> WindowId {
            let left = i32::try_from(screen - 1).unwrap() * 1920 + 100;
            let id = self.surface.open(WindowSpec::new("w", Rect::from_xywh(left, 100, 600, 400)));
            let window = Window::load(&self.surface, id, "w", LIMITS.min_width, true).unwrap();
            self.windows.insert(id, window);

            let group = self.topology.get_mut(screen).unwrap().group_mut();
            assert!(group.attach(id, Direction::Right, &mut self.windows, &self.surface, LIMITS));
            id
        }

        fn target(&self, from: WindowId, direction: Direction, overlapping: bool) -> Option<WindowId> {
            focus_target(&self.topology, &self.windows, &self.surface, &self.windows[&from], direction, overlapping)
        }
    }

    #[test]
    fn test_focus_moves_to_closest_window_on_screen() {
        let mut desk = Desk::new(1);
        let ids: Vec<_> = (0..3).map(|_| desk.tile(1)).collect();

        assert_eq!(desk.target(ids[2], Direction::Left, true), Some(ids[1]));
        assert_eq!(desk.target(ids[0], Direction::Right, true), Some(ids[1]));
    }

    #[test]
    fn test_focus_skips_invisible_windows() {
        let mut desk = Desk::new(1);
        let ids: Vec<_> = (0..3).map(|_| desk.tile(1)).collect();
        desk.surface.set_display_state(ids[1], DisplayState::Minimized).unwrap();

        assert_eq!(desk.target(ids[2], Direction::Left, true), Some(ids[0]));
    }

    #[test]
    fn test_focus_without_candidates_and_wrap_disabled_stays() {
        let mut desk = Desk::new(2);
        let left = desk.tile(1);
        desk.tile(2);

        assert_eq!(desk.target(left, Direction::Left, false), None);
    }

    #[test]
    fn test_focus_crosses_to_neighbour_screen() {
        let mut desk = Desk::new(2);
        let a = desk.tile(1);
        let b = desk.tile(1);
        let c = desk.tile(2);
        let d = desk.tile(2);

        assert_eq!(desk.target(b, Direction::Right, true), Some(c));
        assert_eq!(desk.target(c, Direction::Left, true), Some(b));
        assert_ne!(desk.target(b, Direction::Right, true), Some(d));
        assert_eq!(desk.target(b, Direction::Left, true), Some(a));
    }

    #[test]
    fn test_focus_wraps_to_opposite_outermost_screen() {
        let mut desk = Desk::new(2);
        let a = desk.tile(1);
        let c = desk.tile(2);
        let d = desk.tile(2);

        assert_eq!(desk.target(a, Direction::Left, true), Some(d));
        assert_eq!(desk.target(d, Direction::Right, true), Some(a));
        assert_eq!(desk.target(c, Direction::Left, true), Some(a));
    }

    #[test]
    fn test_focus_single_screen_does_not_wrap() {
        let mut desk = Desk::new(1);
        let ids: Vec<_> = (0..2).map(|_| desk.tile(1)).collect();

        assert_eq!(desk.target(ids[0], Direction::Left, true), None);
        assert_eq!(desk.target(ids[1], Direction::Right, true), None);
    }
}
