//! Monitor topology.
//!
//! Screens are built once at startup from the surface's monitor list. Each
//! screen owns exactly one [`Group`] and knows its horizontal neighbours,
//! found by touching edges. The adjacency never changes afterwards.

use super::error::{TilingError, TilingResult};
use super::group::Group;
use super::state::{Direction, Rect, ScreenId, WindowId};
use super::surface::MonitorInfo;

/// One monitor with its tiling group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    id: ScreenId,
    work_area: Rect,
    rect: Rect,
    group: Group,
    left: Option<ScreenId>,
    right: Option<ScreenId>,
}

impl Screen {
    fn from_monitor(monitor: &MonitorInfo) -> Self {
        Self {
            id: monitor.id,
            work_area: monitor.work_area,
            rect: monitor.rect,
            group: Group::new(monitor.id, monitor.work_area),
            left: None,
            right: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ScreenId { self.id }

    #[must_use]
    pub const fn work_area(&self) -> Rect { self.work_area }

    #[must_use]
    pub const fn rect(&self) -> Rect { self.rect }

    #[must_use]
    pub const fn group(&self) -> &Group { &self.group }

    pub const fn group_mut(&mut self) -> &mut Group { &mut self.group }

    /// Neighbouring screen on the given side.
    #[must_use]
    pub const fn neighbour(&self, side: Direction) -> Option<ScreenId> {
        match side {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// Static set of screens with their left/right adjacency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    screens: Vec<Screen>,
}

impl Topology {
    /// Build one screen per monitor, each with an empty group.
    ///
    /// Screen `b` is the right neighbour of `a` (and `a` the left neighbour
    /// of `b`) when `b`'s left edge is exactly `a`'s right edge.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::NoScreens`] if `monitors` is empty.
    pub fn build(monitors: &[MonitorInfo]) -> TilingResult<Self> {
        if monitors.is_empty() {
            return Err(TilingError::NoScreens);
        }

        let mut screens: Vec<Screen> = monitors.iter().map(Screen::from_monitor).collect();
        for a in 0..screens.len() {
            for b in 0..screens.len() {
                if a != b && screens[b].rect.left == screens[a].rect.right {
                    let (a_id, b_id) = (screens[a].id, screens[b].id);
                    screens[a].right = Some(b_id);
                    screens[b].left = Some(a_id);
                }
            }
        }

        for screen in &screens {
            tracing::debug!(
                screen = screen.id,
                work_area = %screen.work_area,
                left = ?screen.left,
                right = ?screen.right,
                "registered screen"
            );
        }
        Ok(Self { screens })
    }

    /// Screens in monitor enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Screen> { self.screens.iter() }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Screen> { self.screens.iter_mut() }

    #[must_use]
    pub fn len(&self) -> usize { self.screens.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.screens.is_empty() }

    #[must_use]
    pub fn first(&self) -> Option<&Screen> { self.screens.first() }

    #[must_use]
    pub fn get(&self, id: ScreenId) -> Option<&Screen> { self.screens.iter().find(|s| s.id == id) }

    pub fn get_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id == id)
    }

    /// Neighbour of `id` on the given side.
    #[must_use]
    pub fn neighbour(&self, id: ScreenId, side: Direction) -> Option<ScreenId> {
        self.get(id).and_then(|s| s.neighbour(side))
    }

    /// Screen whose group currently holds `window`.
    #[must_use]
    pub fn screen_of_window(&self, window: WindowId) -> Option<ScreenId> {
        self.screens.iter().find(|s| s.group.contains(window)).map(|s| s.id)
    }

    /// Walk the neighbour chain from the first screen to its left end.
    #[must_use]
    pub fn leftmost(&self) -> Option<ScreenId> { self.outermost(Direction::Left) }

    /// Walk the neighbour chain from the first screen to its right end.
    #[must_use]
    pub fn rightmost(&self) -> Option<ScreenId> { self.outermost(Direction::Right) }

    /// End of the chain in `side`'s direction, starting from the first screen.
    #[must_use]
    pub fn outermost(&self, side: Direction) -> Option<ScreenId> {
        let mut current = self.screens.first()?;
        // Bounded by the screen count so a malformed chain can't loop forever.
        for _ in 0..self.screens.len() {
            match current.neighbour(side).and_then(|id| self.get(id)) {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current.id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: ScreenId, left: i32, width: i32) -> MonitorInfo {
        let rect = Rect::from_xywh(left, 0, width, 1080);
        MonitorInfo { id, work_area: Rect::new(left, 0, left + width, 1040), rect }
    }

    #[test]
    fn test_build_requires_monitors() {
        assert_eq!(Topology::build(&[]), Err(TilingError::NoScreens));
    }

    #[test]
    fn test_single_screen_has_no_neighbours() {
        let topology = Topology::build(&[monitor(1, 0, 1920)]).unwrap();
        let screen = topology.get(1).unwrap();

        assert_eq!(screen.neighbour(Direction::Left), None);
        assert_eq!(screen.neighbour(Direction::Right), None);
        assert_eq!(topology.leftmost(), Some(1));
        assert_eq!(topology.rightmost(), Some(1));
    }

    #[test]
    fn test_touching_edges_become_neighbours() {
        let topology = Topology::build(&[monitor(1, 0, 1920), monitor(2, 1920, 2560)]).unwrap();

        assert_eq!(topology.neighbour(1, Direction::Right), Some(2));
        assert_eq!(topology.neighbour(2, Direction::Left), Some(1));
        assert_eq!(topology.neighbour(1, Direction::Left), None);
    }

    #[test]
    fn test_gap_between_monitors_yields_no_neighbour() {
        let topology = Topology::build(&[monitor(1, 0, 1920), monitor(2, 2000, 1920)]).unwrap();
        assert_eq!(topology.neighbour(1, Direction::Right), None);
        assert_eq!(topology.neighbour(2, Direction::Left), None);
    }

    #[test]
    fn test_outermost_walks_chain_from_any_order() {
        let topology =
            Topology::build(&[monitor(2, 1920, 1920), monitor(3, 3840, 1920), monitor(1, 0, 1920)]).unwrap();

        assert_eq!(topology.leftmost(), Some(1));
        assert_eq!(topology.rightmost(), Some(3));
    }

    #[test]
    fn test_groups_use_work_area() {
        let topology = Topology::build(&[monitor(1, 0, 1920)]).unwrap();
        let screen = topology.get(1).unwrap();

        assert_eq!(screen.group().work_area(), Rect::new(0, 0, 1920, 1040));
        assert_eq!(screen.group().screen(), 1);
        assert!(screen.group().is_empty());
    }
}
