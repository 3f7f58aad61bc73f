//! End-to-end tests of the tiling service.
//!
//! Each test starts the coordinator and the reconciliation loop against an
//! in-memory desktop, changes the desktop the way a user would, and waits
//! for the layout to converge.

use std::sync::Arc;
use std::time::Duration;

use wingman_lib::config::{TilingConfig, WingmanConfig};
use wingman_lib::hotkey::{HotkeyDispatcher, HotkeyError, HotkeyTable};
use wingman_lib::run_service;
use wingman_lib::tiling::surface::WindowSpec;
use wingman_lib::tiling::{MemorySurface, Rect, StateActorHandle, TilingService, TilingSnapshot, WindowId, WindowSurface};

const POLL_MS: u64 = 10;

fn config(enabled: bool) -> WingmanConfig {
    WingmanConfig {
        tiling: TilingConfig { enabled, poll_interval_ms: POLL_MS, ..TilingConfig::default() },
        ..WingmanConfig::default()
    }
}

struct Session {
    surface: Arc<MemorySurface>,
    service: TilingService,
    dispatcher: HotkeyDispatcher,
}

impl Session {
    fn start(surface: MemorySurface, config: &WingmanConfig) -> Self {
        let surface = Arc::new(surface);
        let service =
            TilingService::start(Arc::clone(&surface) as Arc<dyn WindowSurface>, config.tiling.clone()).unwrap();
        let table = HotkeyTable::new(&config.keybindings, config.tiling.enabled);
        let dispatcher = HotkeyDispatcher::new(table, service.handle().clone());
        Self { surface, service, dispatcher }
    }

    fn handle(&self) -> &StateActorHandle { self.service.handle() }

    /// Open a window on the first monitor and wait until it is tracked.
    async fn open(&self, title: &str) -> WindowId {
        let id = self.surface.open(WindowSpec::new(title, Rect::from_xywh(100, 100, 700, 500)));
        self.wait_for(|s| s.window(id).is_some()).await;
        id
    }

    async fn wait_for(&self, condition: impl Fn(&TilingSnapshot) -> bool) -> TilingSnapshot {
        for _ in 0..200 {
            let snapshot = self.handle().snapshot().await.unwrap();
            if condition(&snapshot) {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
        }
        panic!("layout did not converge: {:#?}", self.handle().snapshot().await.unwrap());
    }

    async fn stop(self) { self.service.stop().await; }
}

#[tokio::test]
async fn test_new_windows_are_tiled_side_by_side() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;

    let snapshot = session.wait_for(|s| s.screens[0].windows == vec![a, b]).await;
    assert!(snapshot.tiling_enabled);
    assert_eq!(session.surface.frame_of(a), Some(Rect::new(16, 16, 960, 1064)));
    assert_eq!(session.surface.frame_of(b), Some(Rect::new(976, 16, 1904, 1064)));

    session.stop().await;
}

#[tokio::test]
async fn test_closed_window_is_forgotten_and_layout_closes_gap() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;

    session.surface.close(a);
    let snapshot = session.wait_for(|s| s.window(a).is_none()).await;
    assert_eq!(snapshot.screens[0].windows, vec![b]);
    assert_eq!(session.surface.frame_of(b), Some(Rect::new(16, 16, 1904, 1064)));

    session.stop().await;
}

#[tokio::test]
async fn test_hidden_window_leaves_group_and_returns_on_the_right() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;

    session.surface.set_hidden(a, true).unwrap();
    let snapshot = session.wait_for(|s| s.screens[0].windows == vec![b]).await;
    assert!(snapshot.window(a).is_some(), "vanished windows stay cached");

    session.surface.set_hidden(a, false).unwrap();
    session.wait_for(|s| s.screens[0].windows == vec![b, a]).await;

    session.stop().await;
}

#[tokio::test]
async fn test_overflowing_window_moves_to_next_monitor() {
    let session = Session::start(MemorySurface::side_by_side(2, 1920, 1080), &config(true));
    let mut ids = Vec::new();
    for title in ["one", "two", "three", "four"] {
        ids.push(session.open(title).await);
    }

    // Three 480px tiles and their margins fill a 1920px monitor.
    let snapshot = session.wait_for(|s| s.screens.iter().all(|screen| !screen.windows.is_empty())).await;
    assert_eq!(snapshot.screen(1).unwrap().windows, ids[..3].to_vec());
    assert_eq!(snapshot.screen(2).unwrap().windows, vec![ids[3]]);
    assert!(session.surface.frame_of(ids[3]).unwrap().left >= 1920);

    session.stop().await;
}

#[tokio::test]
async fn test_shift_hotkey_moves_window_to_neighbour_monitor() {
    let session = Session::start(MemorySurface::side_by_side(2, 1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;

    // `b` was opened last and holds focus.
    assert_eq!(session.dispatcher.dispatch("Win+Right").await.unwrap().to_string(), "shift-right");
    let snapshot = session.wait_for(|s| s.screen_of(b) == Some(2)).await;

    assert_eq!(snapshot.screen(1).unwrap().windows, vec![a]);
    assert_eq!(snapshot.screen(2).unwrap().windows, vec![b]);
    assert_eq!(session.surface.frame_of(b), Some(Rect::new(1936, 16, 3824, 1064)));
    assert_eq!(session.surface.frame_of(a), Some(Rect::new(16, 16, 1904, 1064)));

    session.stop().await;
}

#[tokio::test]
async fn test_focus_hotkey_moves_input_focus() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;
    assert_eq!(session.surface.foreground_window(), Some(b));

    session.dispatcher.dispatch("focus-left").await.unwrap();
    let snapshot = session.wait_for(|s| s.focused == Some(a)).await;
    assert_eq!(snapshot.focused, session.surface.foreground_window());

    session.stop().await;
}

#[tokio::test]
async fn test_out_of_band_move_updates_cache_without_rearranging() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(true));
    let a = session.open("editor").await;
    let b = session.open("terminal").await;
    let b_frame = session.surface.frame_of(b).unwrap();

    let dragged = Rect::from_xywh(300, 200, 640, 480);
    session.surface.user_move(a, dragged).unwrap();
    let snapshot = session.wait_for(|s| s.window(a).is_some_and(|w| w.rect == dragged)).await;

    assert_eq!(snapshot.screens[0].windows, vec![a, b]);
    assert_eq!(session.surface.frame_of(b), Some(b_frame));

    session.stop().await;
}

#[tokio::test]
async fn test_decoration_only_mode_refuses_tiling_actions() {
    let session = Session::start(MemorySurface::single(1920, 1080), &config(false));
    let a = session.open("editor").await;
    assert_eq!(session.dispatcher.table().len(), 5);

    let err = session.dispatcher.dispatch("Win+Left").await.unwrap_err();
    assert!(matches!(err, HotkeyError::Disabled(_)));

    session.dispatcher.dispatch("Ctrl+Shift+WheelDown").await.unwrap();
    let snapshot = session.wait_for(|s| s.window(a).is_some_and(|w| w.opacity == 250)).await;
    assert!(snapshot.screens[0].windows.is_empty());
    assert_eq!(session.surface.opacity_of(a), Some(250));

    session.stop().await;
}

#[tokio::test]
async fn test_run_service_applies_scripted_hotkeys() {
    let surface = Arc::new(MemorySurface::single(1920, 1080));
    let a = surface.open(WindowSpec::new("editor", Rect::from_xywh(100, 100, 700, 500)));
    let b = surface.open(WindowSpec::new("terminal", Rect::from_xywh(140, 140, 700, 500)));

    let script = "# reorder\nWin+Right\nnot-a-chord\nquit\nWin+Left\n";
    let snapshot = run_service(surface.clone(), &config(true), script.as_bytes()).await.unwrap();

    // The first sample lists windows front to back, so `b` is tiled first;
    // it holds focus and is shifted right. Triggers after `quit` are ignored.
    assert_eq!(snapshot.screens[0].windows, vec![a, b]);
    assert_eq!(surface.frame_of(a).unwrap().left, 16);
    assert_eq!(surface.frame_of(b).unwrap().right, 1904);
}
