//! Coordinator-owned tiling state.
//!
//! `TilingState` is the single owner of the monitor topology (screens and
//! their groups), the window cache and the recently focused window. It is
//! only ever touched from the state actor's task, so none of it is locked.
//!
//! Every operation that reaches the OS goes through the shared
//! [`WindowSurface`]; watcher tasks hold the same surface but only read it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{Direction, Rect, ScreenId, WindowId};
use crate::config::TilingConfig;
use crate::tiling::error::{TilingError, TilingResult};
use crate::tiling::focus::focus_target;
use crate::tiling::group::{GroupLimits, ShiftOutcome, WindowMap};
use crate::tiling::rules::WindowFilter;
use crate::tiling::screen::Topology;
use crate::tiling::surface::WindowSurface;
use crate::tiling::window::Window;

// ============================================================================
// Snapshots
// ============================================================================

/// Serializable view of one tracked window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub title: String,
    pub rect: Rect,
    pub screen: Option<ScreenId>,
    pub l_shift: i32,
    pub opacity: u8,
    pub minimum_width: i32,
    pub visible: bool,
    pub decorated: bool,
}

impl From<&Window> for WindowSnapshot {
    fn from(window: &Window) -> Self {
        Self {
            id: window.id(),
            title: window.title().to_string(),
            rect: window.rect(),
            screen: window.screen(),
            l_shift: window.l_shift(),
            opacity: window.opacity(),
            minimum_width: window.minimum_width(),
            visible: window.is_visible(),
            decorated: window.has_decoration(),
        }
    }
}

/// Serializable view of one screen and its group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    pub id: ScreenId,
    pub work_area: Rect,
    pub rect: Rect,
    pub left: Option<ScreenId>,
    pub right: Option<ScreenId>,
    /// Group members, left to right.
    pub windows: Vec<WindowId>,
}

/// Point-in-time copy of the whole tiling state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilingSnapshot {
    pub tiling_enabled: bool,
    pub screens: Vec<ScreenSnapshot>,
    /// Every cached window, ordered by id.
    pub windows: Vec<WindowSnapshot>,
    pub focused: Option<WindowId>,
}

impl TilingSnapshot {
    /// Cached window by id.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&WindowSnapshot> { self.windows.iter().find(|w| w.id == id) }

    /// Screen by id.
    #[must_use]
    pub fn screen(&self, id: ScreenId) -> Option<&ScreenSnapshot> { self.screens.iter().find(|s| s.id == id) }

    /// Screen whose group holds `window`.
    #[must_use]
    pub fn screen_of(&self, window: WindowId) -> Option<ScreenId> {
        self.screens.iter().find(|s| s.windows.contains(&window)).map(|s| s.id)
    }
}

// ============================================================================
// TilingState
// ============================================================================

/// Screens, groups and the window cache.
pub struct TilingState {
    surface: Arc<dyn WindowSurface>,
    config: TilingConfig,
    limits: GroupLimits,
    filter: WindowFilter,
    topology: Topology,
    windows: WindowMap,
    recent_focused: Option<WindowId>,
}

impl TilingState {
    /// Build the state from the surface's monitors. No windows are loaded;
    /// the visible-set watcher reports them.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::NoScreens`] if the surface reports no monitors.
    pub fn new(surface: Arc<dyn WindowSurface>, config: TilingConfig) -> TilingResult<Self> {
        let topology = Topology::build(&surface.monitors())?;
        let filter = WindowFilter::from_config(&config);

        tracing::info!(
            screens = topology.len(),
            tiling = config.enabled,
            margin = config.margin,
            "tiling state initialized"
        );

        Ok(Self {
            surface,
            limits: config.limits(),
            config,
            filter,
            topology,
            windows: WindowMap::new(),
            recent_focused: None,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn surface(&self) -> &Arc<dyn WindowSurface> { &self.surface }

    #[must_use]
    pub const fn config(&self) -> &TilingConfig { &self.config }

    #[must_use]
    pub const fn filter(&self) -> &WindowFilter { &self.filter }

    #[must_use]
    pub const fn topology(&self) -> &Topology { &self.topology }

    #[must_use]
    pub const fn tiling_enabled(&self) -> bool { self.config.enabled }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> { self.windows.get(&id) }

    #[must_use]
    pub fn is_tracked(&self, id: WindowId) -> bool { self.windows.contains_key(&id) }

    /// Ids of all cached windows, in no particular order.
    #[must_use]
    pub fn window_ids(&self) -> Vec<WindowId> { self.windows.keys().copied().collect() }

    fn require(&self, id: WindowId) -> TilingResult<&Window> {
        self.windows.get(&id).ok_or(TilingError::WindowNotFound(id))
    }

    fn require_mut(&mut self, id: WindowId) -> TilingResult<&mut Window> {
        self.windows.get_mut(&id).ok_or(TilingError::WindowNotFound(id))
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Load a window the watcher has just seen and, in tiling mode, place it.
    ///
    /// A handle already in the cache is re-initialized: it leaves every group,
    /// its decoration is destroyed and it is measured again from scratch.
    /// Returns `false` when the window is not eligible for management.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::SurfaceGone`] if the window vanished while it
    /// was being loaded.
    pub fn load_window(&mut self, id: WindowId) -> TilingResult<bool> {
        let title = self.surface.window_title(id).ok_or(TilingError::SurfaceGone(id))?;
        if !self.filter.accepts_title(&title) {
            tracing::trace!(window = id, title = %title, "ignoring window by title");
            return Ok(false);
        }
        if self.config.ignore_children && self.surface.window_owner(id).is_some() {
            tracing::trace!(window = id, title = %title, "ignoring owned window");
            return Ok(false);
        }

        if self.windows.contains_key(&id) {
            tracing::debug!(window = id, "re-initializing cached window");
            self.evict(id);
        }

        let window = Window::load(&*self.surface, id, title, self.limits.min_width, self.config.enabled)?;
        tracing::info!(
            window = id,
            title = %window.title(),
            rect = %window.rect(),
            screen = ?window.screen(),
            min_width = window.minimum_width(),
            "loaded window"
        );
        self.windows.insert(id, window);

        if self.config.enabled {
            self.place_new(id);
            self.reap_gone();
        }
        Ok(true)
    }

    /// Attach a freshly loaded window to its own screen, then to any screen,
    /// and minimize it when no group can take it.
    fn place_new(&mut self, id: WindowId) {
        let own = self.windows.get(&id).and_then(Window::screen);
        let limits = self.limits;

        if let Some(screen) = own.and_then(|s| self.topology.get_mut(s))
            && screen.group_mut().attach(id, Direction::Right, &mut self.windows, &*self.surface, limits)
        {
            return;
        }

        if self.attach_to_any(id) {
            return;
        }

        tracing::warn!(window = id, "no group could fit window, minimizing");
        if let Some(window) = self.windows.get_mut(&id)
            && let Err(err) = window.minimize(&*self.surface)
        {
            tracing::warn!(window = id, %err, "failed to minimize window");
        }
    }

    /// Attach `id` from the right to the first group, in screen order, that
    /// accepts it.
    pub fn attach_to_any(&mut self, id: WindowId) -> bool {
        let surface = &*self.surface;
        let limits = self.limits;
        self.topology
            .iter_mut()
            .any(|screen| screen.group_mut().attach(id, Direction::Right, &mut self.windows, surface, limits))
    }

    /// Remove `id` from every group. The cached screen may be stale, so no
    /// group is trusted to be the only one holding it.
    fn detach_everywhere(&mut self, id: WindowId) -> bool {
        let surface = &*self.surface;
        let limits = self.limits;
        let mut removed = false;
        for screen in self.topology.iter_mut() {
            removed |= screen.group_mut().remove(id, &mut self.windows, surface, limits);
        }
        removed
    }

    /// Detach, destroy the decoration and drop `id` from the cache.
    fn evict(&mut self, id: WindowId) -> bool {
        self.detach_everywhere(id);
        let Some(mut window) = self.windows.remove(&id) else {
            return false;
        };
        window.destroy_decoration(&*self.surface);
        if self.recent_focused == Some(id) {
            self.recent_focused = None;
        }
        true
    }

    /// A window left the visible set: take it out of every group but keep
    /// it cached. Returns whether it was tracked.
    pub fn window_vanished(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        let detached = self.detach_everywhere(id);
        if let Some(window) = self.windows.get_mut(&id) {
            window.refresh_visibility(&*self.surface);
        }
        self.reap_gone();
        tracing::debug!(window = id, detached, "window vanished");
        true
    }

    /// A window was moved out-of-band. The cache and the decoration follow;
    /// the group is not rearranged.
    ///
    /// `sampled` is only what the watcher saw when it queued the event.
    /// Operations handled since then may have moved the window again, so the
    /// frame is read back from the surface instead.
    pub fn window_moved(&mut self, id: WindowId, sampled: Rect) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        match window.refresh_rect(&*self.surface) {
            Ok(rect) => {
                tracing::trace!(window = id, rect = %rect, sampled = %sampled, "window moved");
                true
            }
            Err(err) => {
                self.on_surface_error(id, &err);
                tracing::debug!(window = id, %err, "moved window could not be read back");
                true
            }
        }
    }

    /// A window handle died: full teardown. Returns whether it was tracked.
    pub fn window_killed(&mut self, id: WindowId) -> bool {
        let evicted = self.evict(id);
        if evicted {
            tracing::info!(window = id, "window killed");
        }
        self.reap_gone();
        evicted
    }

    /// Evict every window a placement found dead. Each eviction rearranges
    /// a group, which may turn up more.
    fn reap_gone(&mut self) {
        loop {
            let gone: Vec<WindowId> = self.windows.values().filter(|w| w.is_gone()).map(Window::id).collect();
            if gone.is_empty() {
                return;
            }
            for id in gone {
                self.evict(id);
                tracing::info!(window = id, "window gone during placement, evicted");
            }
        }
    }

    /// Tear down a window after an operation found its handle dead.
    fn on_surface_error(&mut self, id: WindowId, err: &TilingError) {
        if err.is_gone() {
            self.window_killed(id);
        }
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    /// The window operations apply to: the foreground window when it can be
    /// managed, otherwise the last one that was.
    pub fn focused_window(&mut self) -> Option<WindowId> {
        if let Some(foreground) = self.surface.foreground_window() {
            if !self.windows.contains_key(&foreground)
                && let Err(err) = self.load_window(foreground)
            {
                tracing::debug!(window = foreground, %err, "failed to load foreground window");
            }
            if self.windows.contains_key(&foreground) {
                self.recent_focused = Some(foreground);
                return Some(foreground);
            }
        }
        self.recent_focused.filter(|id| self.windows.contains_key(id))
    }

    /// Move input focus from the focused window toward `direction`.
    /// Returns the newly focused window.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::SurfaceGone`] if the target window is gone.
    pub fn shift_focus(&mut self, direction: Direction) -> TilingResult<Option<WindowId>> {
        let Some(current) = self.focused_window() else {
            tracing::debug!("no focused window to move focus from");
            return Ok(None);
        };

        let current_window = self.require(current)?;
        let Some(target) = focus_target(
            &self.topology,
            &self.windows,
            &*self.surface,
            current_window,
            direction,
            self.config.overlapping_focus_shift,
        ) else {
            tracing::debug!(window = current, direction = %direction, "no window to focus");
            return Ok(None);
        };

        let result = self.require(target)?.focus(&*self.surface);
        if let Err(err) = result {
            self.on_surface_error(target, &err);
            return Err(err);
        }
        self.recent_focused = Some(target);
        Ok(Some(target))
    }

    // ------------------------------------------------------------------------
    // Group operations
    // ------------------------------------------------------------------------

    /// Screen whose group should own `id`: the one holding it, else the one
    /// it was last attached to or resolved on.
    fn home_screen(&self, id: WindowId) -> TilingResult<ScreenId> {
        if let Some(screen) = self.topology.screen_of_window(id) {
            return Ok(screen);
        }
        let window = self.require(id)?;
        window
            .screen()
            .or_else(|| window.resolve_screen(&*self.surface))
            .or_else(|| self.topology.first().map(|s| s.id()))
            .ok_or(TilingError::NoScreens)
    }

    /// Attach a window that an operation found outside every group.
    fn register(&mut self, id: WindowId, side: Direction) -> bool {
        let surface = &*self.surface;
        let limits = self.limits;
        let attached = match self.home_screen(id) {
            Ok(screen) => self
                .topology
                .get_mut(screen)
                .is_some_and(|s| s.group_mut().attach(id, side, &mut self.windows, surface, limits)),
            Err(_) => false,
        };
        attached || self.attach_to_any(id)
    }

    /// Move a window one slot toward `direction`. At the group's edge the
    /// window is handed to the neighbouring screen, which takes it on the
    /// side facing the original screen. A window outside every group is
    /// registered from the left instead.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] if the window is not cached.
    pub fn shift(&mut self, id: WindowId, direction: Direction) -> TilingResult<()> {
        let screen_id = self.home_screen(id)?;
        let surface = &*self.surface;
        let limits = self.limits;
        let group = self.topology.get_mut(screen_id).ok_or(TilingError::ScreenNotFound(screen_id))?.group_mut();

        let result = match group.shift(id, direction, &mut self.windows, surface, limits) {
            Ok(ShiftOutcome::Moved) => Ok(()),
            Ok(ShiftOutcome::AtBoundary) => {
                self.hand_off(id, screen_id, direction);
                Ok(())
            }
            Err(TilingError::UnregisteredOperand(_)) => {
                tracing::info!(window = id, "shifted window is not in any group, registering it");
                self.register(id, Direction::Left);
                Ok(())
            }
            Err(err) => Err(err),
        };
        self.reap_gone();
        result
    }

    /// Cross-monitor shift. The neighbour attaches first so a refusal leaves
    /// both groups untouched.
    fn hand_off(&mut self, id: WindowId, from: ScreenId, direction: Direction) {
        let Some(target) = self.topology.neighbour(from, direction) else {
            tracing::info!(window = id, direction = %direction, "no screen in that direction");
            return;
        };

        let surface = &*self.surface;
        let limits = self.limits;
        let attached = self.topology.get_mut(target).is_some_and(|screen| {
            screen.group_mut().attach(id, direction.opposite(), &mut self.windows, surface, limits)
        });
        if !attached {
            return;
        }

        if let Some(screen) = self.topology.get_mut(from) {
            screen.group_mut().remove(id, &mut self.windows, surface, limits);
        }
        if let Some(window) = self.windows.get_mut(&id) {
            window.reset_shift();
        }
        tracing::info!(window = id, from, to = target, "shifted window onto neighbour screen");
    }

    /// Grow a window's border toward `direction`. A window outside every
    /// group is registered first.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] if the window is not cached.
    pub fn resize(&mut self, id: WindowId, direction: Direction) -> TilingResult<bool> {
        if self.topology.screen_of_window(id).is_none() {
            self.require(id)?;
            tracing::info!(window = id, "resized window is not in any group, registering it");
            if !self.register(id, Direction::Left) {
                self.reap_gone();
                return Ok(false);
            }
        }

        let screen_id = self.home_screen(id)?;
        let surface = &*self.surface;
        let limits = self.limits;
        let group = self.topology.get(screen_id).ok_or(TilingError::ScreenNotFound(screen_id))?.group();
        let resized = group.resize(id, direction, &mut self.windows, surface, limits);
        self.reap_gone();
        resized
    }

    /// Rearrange the group holding `id`, if any.
    fn rearrange_group_of(&mut self, id: WindowId) {
        let Some(screen_id) = self.topology.screen_of_window(id) else {
            return;
        };
        if let Some(screen) = self.topology.get(screen_id) {
            screen.group().rearrange(&mut self.windows, &*self.surface, self.limits);
        }
    }

    // ------------------------------------------------------------------------
    // Display state
    // ------------------------------------------------------------------------

    /// OS-maximize a window. Group membership is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn maximize(&mut self, id: WindowId) -> TilingResult<()> {
        let surface = Arc::clone(&self.surface);
        let result = self.require_mut(id)?.maximize(&*surface);
        self.settle(id, result)
    }

    /// Bring a maximized window back into its group; minimize a window that
    /// is not maximized.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn unmaximize(&mut self, id: WindowId) -> TilingResult<()> {
        let surface = Arc::clone(&self.surface);
        let window = self.require_mut(id)?;

        match window.is_maximized(&*surface) {
            Ok(true) => {
                let result = window.restore(&*surface);
                self.settle(id, result)?;
                self.rearrange_group_of(id);
                self.reap_gone();
                Ok(())
            }
            Ok(false) => self.minimize(id),
            Err(err) => self.settle(id, Err(err)),
        }
    }

    /// Iconify a window and take it out of its group.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn minimize(&mut self, id: WindowId) -> TilingResult<()> {
        let surface = Arc::clone(&self.surface);
        let result = self.require_mut(id)?.minimize(&*surface);
        self.settle(id, result)?;
        self.detach_everywhere(id);
        self.reap_gone();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Cosmetics
    // ------------------------------------------------------------------------

    /// Raise a window's opacity by the configured step.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn increase_opacity(&mut self, id: WindowId) -> TilingResult<u8> {
        let surface = Arc::clone(&self.surface);
        let step = self.config.opacity_step;
        let result = self.require_mut(id)?.increase_opacity(&*surface, step);
        self.settle(id, result)
    }

    /// Lower a window's opacity by the configured step.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn decrease_opacity(&mut self, id: WindowId) -> TilingResult<u8> {
        let surface = Arc::clone(&self.surface);
        let step = self.config.opacity_step;
        let result = self.require_mut(id)?.decrease_opacity(&*surface, step);
        self.settle(id, result)
    }

    /// Toggle a window's decoration. Returns whether it is now decorated.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::WindowNotFound`] or [`TilingError::SurfaceGone`].
    pub fn toggle_blur(&mut self, id: WindowId) -> TilingResult<bool> {
        let surface = Arc::clone(&self.surface);
        let opacity = self.config.default_blur_opacity;
        let result = self.require_mut(id)?.toggle_blur(&*surface, opacity);
        self.settle(id, result)
    }

    /// Pass a window operation's result through, tearing the window down if
    /// its handle turned out to be dead.
    fn settle<T>(&mut self, id: WindowId, result: TilingResult<T>) -> TilingResult<T> {
        if let Err(err) = &result {
            self.on_surface_error(id, err);
        }
        result
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    /// Copy the current state for queries.
    #[must_use]
    pub fn snapshot(&self) -> TilingSnapshot {
        let screens = self
            .topology
            .iter()
            .map(|screen| ScreenSnapshot {
                id: screen.id(),
                work_area: screen.work_area(),
                rect: screen.rect(),
                left: screen.neighbour(Direction::Left),
                right: screen.neighbour(Direction::Right),
                windows: screen.group().windows().to_vec(),
            })
            .collect();

        let mut windows: Vec<WindowSnapshot> = self.windows.values().map(WindowSnapshot::from).collect();
        windows.sort_by_key(|w| w.id);

        TilingSnapshot {
            tiling_enabled: self.config.enabled,
            screens,
            windows,
            focused: self.recent_focused,
        }
    }
}

impl std::fmt::Debug for TilingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilingState")
            .field("screens", &self.topology.len())
            .field("windows", &self.windows.len())
            .field("recent_focused", &self.recent_focused)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
