//! Reconciliation loop.
//!
//! Two kinds of polling tasks turn OS state changes into actor messages:
//!
//! - the **visible-set watcher** enumerates top-level windows on a fixed
//!   interval, keeps the ones the [`WindowFilter`] accepts and diffs them
//!   against the previous sample, emitting `WindowAppeared` for new handles
//!   and `WindowVanished` for dropped ones
//! - one **window watcher** per tracked window samples its rectangle and
//!   emits `WindowMoved` on change and `WindowKilled` once the handle is
//!   invalid, then exits
//!
//! Watchers never mutate tiling state. They stop on their own as soon as the
//! actor's channel is closed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::actor::{StateActorHandle, StateMessage};
use super::rules::WindowFilter;
use super::state::WindowId;
use super::surface::WindowSurface;

// ============================================================================
// Visible-set diff
// ============================================================================

/// Handles that entered and left the visible set between two samples.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleDiff {
    /// New handles, in the order of the current sample.
    pub appeared: Vec<WindowId>,
    /// Dropped handles, in the order of the previous sample.
    pub vanished: Vec<WindowId>,
}

impl VisibleDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.appeared.is_empty() && self.vanished.is_empty() }
}

/// Compare two visible-set samples.
#[must_use]
pub fn diff_visible(previous: &[WindowId], current: &[WindowId]) -> VisibleDiff {
    let before: HashSet<WindowId> = previous.iter().copied().collect();
    let after: HashSet<WindowId> = current.iter().copied().collect();

    VisibleDiff {
        appeared: current.iter().copied().filter(|id| !before.contains(id)).collect(),
        vanished: previous.iter().copied().filter(|id| !after.contains(id)).collect(),
    }
}

/// Enumerate the windows the filter accepts, front to back.
#[must_use]
pub fn sample_visible(surface: &dyn WindowSurface, filter: &WindowFilter) -> Vec<WindowId> {
    surface
        .enumerate_windows()
        .iter()
        .filter(|w| filter.is_candidate(w))
        .map(|w| w.id)
        .collect()
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

// ============================================================================
// Visible-set watcher
// ============================================================================

/// Spawn the visible-set watcher. The first sample is diffed against an
/// empty set, so every window already on screen is reported as appeared.
#[must_use]
pub fn spawn_visible_watcher(
    handle: StateActorHandle,
    surface: Arc<dyn WindowSurface>,
    filter: WindowFilter,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = ticker(period);
        let mut previous: Vec<WindowId> = Vec::new();

        loop {
            interval.tick().await;

            let current = sample_visible(&*surface, &filter);
            let diff = diff_visible(&previous, &current);
            previous = current;

            if diff.is_empty() {
                continue;
            }
            tracing::debug!(appeared = ?diff.appeared, vanished = ?diff.vanished, "visible set changed");

            for window_id in diff.vanished {
                if handle.send_async(StateMessage::WindowVanished { window_id }).await.is_err() {
                    tracing::debug!("actor stopped, visible-set watcher exiting");
                    return;
                }
            }
            for window_id in diff.appeared {
                if handle.send_async(StateMessage::WindowAppeared { window_id }).await.is_err() {
                    tracing::debug!("actor stopped, visible-set watcher exiting");
                    return;
                }
            }
        }
    })
}

// ============================================================================
// Window watcher
// ============================================================================

/// Spawn the liveness/position watcher of one window.
#[must_use]
pub fn spawn_window_watcher(
    handle: StateActorHandle,
    surface: Arc<dyn WindowSurface>,
    window_id: WindowId,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = ticker(period);
        interval.tick().await;
        let mut last = surface.window_rect(window_id).ok();

        loop {
            interval.tick().await;

            let message = match (surface.window_rect(window_id), surface.frame_bounds(window_id)) {
                (Ok(raw), Ok(frame)) if Some(raw) != last => {
                    last = Some(raw);
                    StateMessage::WindowMoved { window_id, frame }
                }
                (Ok(_), Ok(_)) => continue,
                _ => {
                    let _ = handle.send_async(StateMessage::WindowKilled { window_id }).await;
                    tracing::trace!(window = window_id, "window watcher exiting");
                    return;
                }
            };

            if handle.send_async(message).await.is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::state::Rect;
    use crate::tiling::surface::{MemorySurface, WindowSpec};

    #[test]
    fn test_diff_visible_reports_changes_in_order() {
        let diff = diff_visible(&[1, 2, 3], &[5, 3, 4, 1]);
        assert_eq!(diff.appeared, vec![5, 4]);
        assert_eq!(diff.vanished, vec![2]);
    }

    #[test]
    fn test_first_sample_reports_everything() {
        let diff = diff_visible(&[], &[3, 1]);
        assert_eq!(diff.appeared, vec![3, 1]);
        assert!(diff.vanished.is_empty());
    }

    #[test]
    fn test_identical_samples_are_empty() {
        assert!(diff_visible(&[1, 2], &[2, 1]).is_empty());
    }

    #[test]
    fn test_sample_visible_applies_filter() {
        let surface = MemorySurface::single(1920, 1080);
        let frame = Rect::from_xywh(0, 0, 600, 400);
        let a = surface.open(WindowSpec::new("a", frame));
        surface.open(WindowSpec::new("Calculator", frame));
        surface.open(WindowSpec::new("tray", frame).without_titlebar());
        surface.open(WindowSpec::new("other desktop", frame).cloaked());
        let b = surface.open(WindowSpec::new("b", frame));

        let filter = WindowFilter::from_config(&crate::config::TilingConfig::default());
        assert_eq!(sample_visible(&surface, &filter), vec![b, a]);
    }

    #[test]
    fn test_cloaking_drops_window_from_sample() {
        let surface = MemorySurface::single(1920, 1080);
        let a = surface.open(WindowSpec::new("a", Rect::from_xywh(0, 0, 600, 400)));
        let filter = WindowFilter::default();
        assert_eq!(sample_visible(&surface, &filter), vec![a]);

        surface.set_cloaked(a, true).unwrap();
        assert!(sample_visible(&surface, &filter).is_empty());

        surface.set_cloaked(a, false).unwrap();
        assert_eq!(sample_visible(&surface, &filter), vec![a]);
    }

    #[tokio::test]
    async fn test_window_watcher_reports_move_then_kill() {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let id = surface.open(WindowSpec::new("a", Rect::from_xywh(0, 0, 600, 400)));

        let (sender, mut receiver) = tokio::sync::mpsc::channel(16);
        let watcher = spawn_window_watcher(
            StateActorHandle::new(sender),
            Arc::clone(&surface) as Arc<dyn WindowSurface>,
            id,
            Duration::from_millis(5),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        let moved = Rect::from_xywh(50, 50, 600, 400);
        surface.user_move(id, moved).unwrap();

        match receiver.recv().await {
            Some(StateMessage::WindowMoved { window_id, frame }) => {
                assert_eq!(window_id, id);
                assert_eq!(frame, moved);
            }
            other => panic!("expected move, got {other:?}"),
        }

        surface.close(id);
        assert!(matches!(receiver.recv().await, Some(StateMessage::WindowKilled { window_id }) if window_id == id));
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_visible_watcher_reports_appear_and_vanish() {
        let surface = Arc::new(MemorySurface::single(1920, 1080));
        let a = surface.open(WindowSpec::new("a", Rect::from_xywh(0, 0, 600, 400)));

        let (sender, mut receiver) = tokio::sync::mpsc::channel(16);
        let watcher = spawn_visible_watcher(
            StateActorHandle::new(sender),
            Arc::clone(&surface) as Arc<dyn WindowSurface>,
            WindowFilter::default(),
            Duration::from_millis(5),
        );

        assert!(matches!(receiver.recv().await, Some(StateMessage::WindowAppeared { window_id }) if window_id == a));

        surface.set_hidden(a, true).unwrap();
        assert!(matches!(receiver.recv().await, Some(StateMessage::WindowVanished { window_id }) if window_id == a));

        drop(receiver);
        surface.set_hidden(a, false).unwrap();
        tokio::time::timeout(Duration::from_secs(1), watcher).await.unwrap().unwrap();
    }
}
