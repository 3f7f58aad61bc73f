//! State module for the tiling engine.
//!
//! This module contains:
//! - Core value types (`Rect`, `Direction`, window and screen ids)
//! - The coordinator-owned `TilingState` (screens, groups, window cache)

mod tiling_state;
mod types;

pub use tiling_state::{ScreenSnapshot, TilingSnapshot, TilingState, WindowSnapshot};
pub use types::{Direction, Rect, ScreenId, WindowId, WindowIdList};
