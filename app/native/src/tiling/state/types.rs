//! Core value types for the tiling engine.
//!
//! These types are shared by every part of the engine:
//! - `Rect` is the integer pixel rectangle used for work-areas and window frames
//! - `Direction` selects the side for attach/shift/resize/focus operations
//! - `WindowId` / `ScreenId` are the opaque handles issued by the window surface
//!
//! Groups refer to windows through `WindowIdList`, never by pointer, so the
//! Window ↔ Screen ↔ Group relation stays acyclic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Stable handle of an OS window.
pub type WindowId = u64;

/// Opaque monitor identifier.
pub type ScreenId = u32;

/// Window ID list type alias. Uses `SmallVec` for inline storage of up to 8 window IDs,
/// groups are capped well below that by configuration in practice.
pub type WindowIdList = SmallVec<[WindowId; 8]>;

// ============================================================================
// Geometry Types
// ============================================================================

/// Axis-aligned rectangle in screen pixels.
///
/// `right >= left` and `bottom >= top` always hold; constructors normalise
/// inverted input instead of producing negative extents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from its four edges.
    #[must_use]
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right: right.max(left),
            bottom: bottom.max(top),
        }
    }

    /// Create a rectangle from origin and size.
    #[must_use]
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width.max(0), y + height.max(0))
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 { self.right - self.left }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 { self.bottom - self.top }

    /// Area shared with another rectangle, 0 if they do not overlap.
    #[must_use]
    pub fn overlap_area(&self, other: &Self) -> i64 {
        let w = (self.right.min(other.right) - self.left.max(other.left)).max(0);
        let h = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0);
        i64::from(w) * i64::from(h)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width(), self.height(), self.left, self.top)
    }
}

// ============================================================================
// Direction
// ============================================================================

/// Horizontal direction used by every tiling operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// The other direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the direction name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod rect_tests {
        use super::*;

        #[test]
        fn test_rect_new_derives_size() {
            let rect = Rect::new(10, 20, 110, 220);
            assert_eq!(rect.width(), 100);
            assert_eq!(rect.height(), 200);
        }

        #[test]
        fn test_rect_new_normalises_inverted_edges() {
            let rect = Rect::new(100, 100, 50, 40);
            assert_eq!(rect.width(), 0);
            assert_eq!(rect.height(), 0);
        }

        #[test]
        fn test_rect_from_xywh() {
            let rect = Rect::from_xywh(5, 6, 480, 480);
            assert_eq!(rect, Rect::new(5, 6, 485, 486));
        }

        #[test]
        fn test_rect_touching_edges_share_no_area() {
            let a = Rect::new(0, 0, 100, 100);
            let b = Rect::new(100, 0, 200, 100);
            assert_eq!(a.overlap_area(&b), 0);
        }

        #[test]
        fn test_rect_overlap_area() {
            let a = Rect::new(0, 0, 100, 100);
            let b = Rect::new(50, 50, 150, 150);
            assert_eq!(a.overlap_area(&b), 2500);
            assert_eq!(a.overlap_area(&Rect::new(300, 300, 400, 400)), 0);
        }

        #[test]
        fn test_rect_display_uses_geometry_format() {
            assert_eq!(Rect::new(16, 16, 800, 1064).to_string(), "784x1048+16+16");
        }
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn test_direction_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"left\"");
    }
}
