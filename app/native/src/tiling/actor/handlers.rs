//! Handlers for the state actor.
//!
//! Each handler applies one message to the [`TilingState`]. Failures are
//! logged and swallowed: a single bad window must never stop the actor.

use super::messages::{QueryResult, StateQuery};
use crate::hotkey::HotkeyAction;
use crate::tiling::error::TilingError;
use crate::tiling::state::{Direction, Rect, TilingState, WindowId, WindowSnapshot};

// ============================================================================
// Window Events
// ============================================================================

/// Load (or re-initialize) a window that entered the visible set.
pub fn on_window_appeared(state: &mut TilingState, window_id: WindowId) {
    match state.load_window(window_id) {
        Ok(true) => {}
        Ok(false) => tracing::trace!(window = window_id, "window not eligible for tiling"),
        Err(err) if err.is_gone() => {
            tracing::debug!(window = window_id, "window disappeared while loading");
            state.window_killed(window_id);
        }
        Err(err) => tracing::warn!(window = window_id, %err, "failed to load window"),
    }
}

/// Take a window that left the visible set out of its group.
pub fn on_window_vanished(state: &mut TilingState, window_id: WindowId) {
    if !state.window_vanished(window_id) {
        tracing::trace!(window = window_id, "untracked window vanished");
    }
}

/// Record an out-of-band move.
pub fn on_window_moved(state: &mut TilingState, window_id: WindowId, frame: Rect) {
    state.window_moved(window_id, frame);
}

/// Tear down a window whose handle died.
pub fn on_window_killed(state: &mut TilingState, window_id: WindowId) {
    if !state.window_killed(window_id) {
        tracing::trace!(window = window_id, "untracked window killed");
    }
}

// ============================================================================
// Hotkeys
// ============================================================================

/// Run a hotkey action against the focused window.
pub fn on_hotkey(state: &mut TilingState, action: HotkeyAction) {
    if action == HotkeyAction::Suppress {
        return;
    }
    if action.is_tiling() && !state.tiling_enabled() {
        tracing::debug!(action = %action, "tiling is disabled, ignoring action");
        return;
    }

    if let (HotkeyAction::FocusLeft | HotkeyAction::FocusRight, Some(direction)) = (action, action.direction()) {
        if let Err(err) = state.shift_focus(direction) {
            tracing::warn!(action = %action, %err, "failed to move focus");
        }
        return;
    }

    let Some(window_id) = state.focused_window() else {
        tracing::debug!(action = %action, "no focused window");
        return;
    };

    let result = apply_to_window(state, action, window_id);
    match result {
        Ok(()) => tracing::debug!(action = %action, window = window_id, "applied hotkey"),
        Err(err) if err.is_refusal() => tracing::info!(action = %action, window = window_id, %err, "action refused"),
        Err(err) => tracing::warn!(action = %action, window = window_id, %err, "action failed"),
    }
}

fn apply_to_window(state: &mut TilingState, action: HotkeyAction, window_id: WindowId) -> Result<(), TilingError> {
    match action {
        HotkeyAction::ShiftLeft => state.shift(window_id, Direction::Left),
        HotkeyAction::ShiftRight => state.shift(window_id, Direction::Right),
        HotkeyAction::ResizeLeft => state.resize(window_id, Direction::Left).map(drop),
        HotkeyAction::ResizeRight => state.resize(window_id, Direction::Right).map(drop),
        HotkeyAction::Maximize => state.maximize(window_id),
        HotkeyAction::Unmaximize => state.unmaximize(window_id),
        HotkeyAction::IncreaseOpacity => state.increase_opacity(window_id).map(drop),
        HotkeyAction::DecreaseOpacity => state.decrease_opacity(window_id).map(drop),
        HotkeyAction::ToggleBlur => state.toggle_blur(window_id).map(drop),
        HotkeyAction::FocusLeft | HotkeyAction::FocusRight | HotkeyAction::Suppress => Ok(()),
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Answer a query from the current state.
#[must_use]
pub fn on_query(state: &TilingState, query: StateQuery) -> QueryResult {
    match query {
        StateQuery::Snapshot => QueryResult::Snapshot(state.snapshot()),
        StateQuery::GetWindow { id } => QueryResult::Window(state.window(id).map(WindowSnapshot::from)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TilingConfig;
    use crate::tiling::surface::{DisplayState, MemorySurface, WindowSpec, WindowSurface};

    fn setup(config: TilingConfig) -> (Arc<MemorySurface>, TilingState) {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let state = TilingState::new(Arc::clone(&surface) as Arc<dyn WindowSurface>, config).unwrap();
        (surface, state)
    }

    fn open(surface: &MemorySurface, state: &mut TilingState, title: &str) -> WindowId {
        let id = surface.open(WindowSpec::new(title, Rect::from_xywh(100, 100, 700, 500)));
        on_window_appeared(state, id);
        id
    }

    #[test]
    fn test_hotkeys_act_on_foreground_window() {
        let (surface, mut state) = setup(TilingConfig::default());
        let a = open(&surface, &mut state, "a");
        let b = open(&surface, &mut state, "b");

        on_hotkey(&mut state, HotkeyAction::ShiftLeft);
        assert_eq!(state.snapshot().screens[0].windows, vec![b, a]);

        on_hotkey(&mut state, HotkeyAction::Maximize);
        assert_eq!(surface.state_of(b), Some(DisplayState::Maximized));
    }

    #[test]
    fn test_focus_hotkey_moves_foreground() {
        let (surface, mut state) = setup(TilingConfig::default());
        let a = open(&surface, &mut state, "a");
        open(&surface, &mut state, "b");

        on_hotkey(&mut state, HotkeyAction::FocusLeft);
        assert_eq!(surface.foreground_window(), Some(a));
    }

    #[test]
    fn test_tiling_hotkeys_ignored_when_disabled() {
        let config = TilingConfig { enabled: false, ..TilingConfig::default() };
        let (surface, mut state) = setup(config);
        let a = open(&surface, &mut state, "a");

        on_hotkey(&mut state, HotkeyAction::Maximize);
        assert_eq!(surface.state_of(a), Some(DisplayState::Normal));

        on_hotkey(&mut state, HotkeyAction::DecreaseOpacity);
        assert_eq!(surface.opacity_of(a), Some(250));
    }

    #[test]
    fn test_appeared_then_gone_window_is_not_cached() {
        let (surface, mut state) = setup(TilingConfig::default());
        let id = surface.open(WindowSpec::new("ghost", Rect::from_xywh(0, 0, 600, 400)));
        surface.close(id);

        on_window_appeared(&mut state, id);
        assert!(!state.is_tracked(id));
    }

    #[test]
    fn test_query_window() {
        let (surface, mut state) = setup(TilingConfig::default());
        let a = open(&surface, &mut state, "a");

        match on_query(&state, StateQuery::GetWindow { id: a }) {
            QueryResult::Window(Some(window)) => assert_eq!(window.title, "a"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(on_query(&state, StateQuery::GetWindow { id: 99 }), QueryResult::Window(None)));
    }
}
