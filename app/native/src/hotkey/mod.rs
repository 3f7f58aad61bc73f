//! Hotkey source for Wingman.
//!
//! Hotkeys are named, payload-less actions. The keybinding table maps chords
//! (`Win+Shift+Left`) to actions (`focus-left`); the dispatcher resolves a
//! trigger, either a chord or an action name, and forwards the action to the
//! tiling coordinator.
//!
//! Registration with the operating system is out of scope: triggers arrive
//! as text lines, which is also how `wingman run` and `wingman simulate`
//! receive them on stdin.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::tiling::actor::{ActorError, StateActorHandle};
use crate::tiling::state::Direction;

// ============================================================================
// Actions
// ============================================================================

/// Every action a hotkey can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    /// Move the focused window one slot left, or onto the left monitor.
    ShiftLeft,
    /// Move the focused window one slot right, or onto the right monitor.
    ShiftRight,
    /// Make the focused window take up the whole monitor.
    Maximize,
    /// Return a maximized window to its group, or minimize a tiled one.
    Unmaximize,
    /// Grow the focused window's left border.
    ResizeLeft,
    /// Grow the focused window's right border.
    ResizeRight,
    /// Focus the nearest window on the left.
    FocusLeft,
    /// Focus the nearest window on the right.
    FocusRight,
    /// Make the focused window more opaque.
    IncreaseOpacity,
    /// Make the focused window more transparent.
    DecreaseOpacity,
    /// Toggle the focused window's decoration.
    ToggleBlur,
    /// Swallow the chord without doing anything.
    Suppress,
}

impl HotkeyAction {
    /// All actions in display order.
    pub const ALL: [Self; 12] = [
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::Maximize,
        Self::Unmaximize,
        Self::ResizeLeft,
        Self::ResizeRight,
        Self::FocusLeft,
        Self::FocusRight,
        Self::IncreaseOpacity,
        Self::DecreaseOpacity,
        Self::ToggleBlur,
        Self::Suppress,
    ];

    /// Returns the action name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShiftLeft => "shift-left",
            Self::ShiftRight => "shift-right",
            Self::Maximize => "maximize",
            Self::Unmaximize => "unmaximize",
            Self::ResizeLeft => "resize-left",
            Self::ResizeRight => "resize-right",
            Self::FocusLeft => "focus-left",
            Self::FocusRight => "focus-right",
            Self::IncreaseOpacity => "increase-opacity",
            Self::DecreaseOpacity => "decrease-opacity",
            Self::ToggleBlur => "toggle-blur",
            Self::Suppress => "suppress",
        }
    }

    /// One-line description for `wingman actions`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ShiftLeft => "Move window one slot left, or onto the left monitor",
            Self::ShiftRight => "Move window one slot right, or onto the right monitor",
            Self::Maximize => "Maximize window",
            Self::Unmaximize => "Return maximized window to its group, or minimize it",
            Self::ResizeLeft => "Grow window toward the left",
            Self::ResizeRight => "Grow window toward the right",
            Self::FocusLeft => "Focus nearest window on the left",
            Self::FocusRight => "Focus nearest window on the right",
            Self::IncreaseOpacity => "Increase window opacity",
            Self::DecreaseOpacity => "Decrease window opacity",
            Self::ToggleBlur => "Toggle window decoration",
            Self::Suppress => "Swallow the chord",
        }
    }

    /// Whether the action needs the tiling engine. Only opacity, decoration
    /// and suppress actions work in decoration-only mode.
    #[must_use]
    pub const fn is_tiling(self) -> bool {
        !matches!(self, Self::IncreaseOpacity | Self::DecreaseOpacity | Self::ToggleBlur | Self::Suppress)
    }

    /// Direction carried by directional actions.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::ShiftLeft | Self::ResizeLeft | Self::FocusLeft => Some(Direction::Left),
            Self::ShiftRight | Self::ResizeRight | Self::FocusRight => Some(Direction::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for HotkeyAction {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HotkeyError::UnknownTrigger(wanted.to_string()))
    }
}

/// The default chord table.
#[must_use]
pub fn default_keybindings() -> BTreeMap<String, HotkeyAction> {
    [
        ("Win+Left", HotkeyAction::ShiftLeft),
        ("Win+Right", HotkeyAction::ShiftRight),
        ("Win+Up", HotkeyAction::Maximize),
        ("Win+Down", HotkeyAction::Unmaximize),
        ("Win+Alt+Left", HotkeyAction::ResizeLeft),
        ("Win+Alt+Right", HotkeyAction::ResizeRight),
        ("Win+Shift+Left", HotkeyAction::FocusLeft),
        ("Win+Shift+Right", HotkeyAction::FocusRight),
        ("Ctrl+Shift+WheelUp", HotkeyAction::IncreaseOpacity),
        ("Ctrl+Shift+WheelDown", HotkeyAction::DecreaseOpacity),
        ("Win+Shift+B", HotkeyAction::ToggleBlur),
        ("Win+Shift+Up", HotkeyAction::Suppress),
        ("Win+Shift+Down", HotkeyAction::Suppress),
    ]
    .into_iter()
    .map(|(chord, action)| (chord.to_string(), action))
    .collect()
}

// ============================================================================
// Chords
// ============================================================================

/// Modifier order used by normalized chords.
const MODIFIER_ORDER: [&str; 4] = ["ctrl", "alt", "shift", "win"];

/// Normalizes a chord so that equivalent spellings compare equal.
///
/// - matching is case-insensitive
/// - "Control" becomes "Ctrl"; "Option"/"Opt" become "Alt"
/// - "Super", "Meta", "Cmd" and "Windows" become "Win"
/// - modifiers are sorted, so `Shift+Win+B` equals `Win+Shift+B`
#[must_use]
pub fn normalize_chord(chord: &str) -> String {
    let mut modifiers: Vec<&'static str> = Vec::new();
    let mut keys: Vec<String> = Vec::new();

    for part in chord.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let lower = part.to_ascii_lowercase();
        let modifier = match lower.as_str() {
            "ctrl" | "control" => Some("ctrl"),
            "alt" | "option" | "opt" => Some("alt"),
            "shift" => Some("shift"),
            "win" | "windows" | "super" | "meta" | "cmd" => Some("win"),
            _ => None,
        };
        match modifier {
            Some(m) if !modifiers.contains(&m) => modifiers.push(m),
            Some(_) => {}
            None => keys.push(lower),
        }
    }

    modifiers.sort_by_key(|m| MODIFIER_ORDER.iter().position(|o| o == m));
    modifiers.into_iter().map(str::to_string).chain(keys).collect::<Vec<_>>().join("+")
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Errors raised while resolving or dispatching a trigger.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    /// The trigger is neither a bound chord nor an action name.
    #[error("unknown hotkey or action: {0}")]
    UnknownTrigger(String),

    /// The action needs tiling, which is disabled.
    #[error("action '{0}' is unavailable while tiling is disabled")]
    Disabled(HotkeyAction),

    /// The coordinator is gone.
    #[error(transparent)]
    Actor(#[from] ActorError),
}

/// Resolved keybinding table.
#[derive(Debug, Clone, Default)]
pub struct HotkeyTable {
    bindings: HashMap<String, HotkeyAction>,
    tiling_enabled: bool,
}

impl HotkeyTable {
    /// Builds the table. With tiling disabled, chords bound to tiling actions
    /// are not registered.
    #[must_use]
    pub fn new(keybindings: &BTreeMap<String, HotkeyAction>, tiling_enabled: bool) -> Self {
        let bindings = keybindings
            .iter()
            .filter(|(chord, action)| {
                let keep = tiling_enabled || !action.is_tiling();
                if !keep {
                    tracing::debug!(chord = %chord, action = %action, "skipping tiling hotkey");
                }
                keep
            })
            .map(|(chord, action)| (normalize_chord(chord), *action))
            .collect();

        Self { bindings, tiling_enabled }
    }

    /// Number of registered chords.
    #[must_use]
    pub fn len(&self) -> usize { self.bindings.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }

    /// Resolve a chord or an action name.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::UnknownTrigger`] for unbound chords and unknown
    /// names, and [`HotkeyError::Disabled`] for tiling actions while tiling
    /// is disabled.
    pub fn resolve(&self, trigger: &str) -> Result<HotkeyAction, HotkeyError> {
        let action = match self.bindings.get(&normalize_chord(trigger)) {
            Some(action) => *action,
            None => trigger.parse::<HotkeyAction>()?,
        };

        if action.is_tiling() && !self.tiling_enabled {
            return Err(HotkeyError::Disabled(action));
        }
        Ok(action)
    }
}

/// Forwards resolved hotkeys to the tiling coordinator.
#[derive(Clone)]
pub struct HotkeyDispatcher {
    table: HotkeyTable,
    handle: StateActorHandle,
}

impl HotkeyDispatcher {
    #[must_use]
    pub const fn new(table: HotkeyTable, handle: StateActorHandle) -> Self { Self { table, handle } }

    #[must_use]
    pub const fn table(&self) -> &HotkeyTable { &self.table }

    /// Resolve a trigger and send its action to the coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger does not resolve or the coordinator
    /// has stopped.
    pub async fn dispatch(&self, trigger: &str) -> Result<HotkeyAction, HotkeyError> {
        let action = self.table.resolve(trigger)?;
        self.handle.dispatch(action).await?;
        tracing::debug!(trigger = %trigger, action = %action, "dispatched hotkey");
        Ok(action)
    }
}

/// Read triggers line by line and dispatch each one until `quit` or end of
/// input. Unknown triggers are logged and skipped.
///
/// # Errors
///
/// Returns an error if the coordinator stops.
pub async fn run_line_source<R>(reader: R, dispatcher: &HotkeyDispatcher) -> Result<(), HotkeyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(()),
            Err(err) => {
                tracing::warn!(%err, "failed to read hotkey input");
                return Ok(());
            }
        };

        let trigger = line.trim();
        if trigger.is_empty() || trigger.starts_with('#') {
            continue;
        }
        if trigger.eq_ignore_ascii_case("quit") {
            return Ok(());
        }

        match dispatcher.dispatch(trigger).await {
            Ok(_) => {}
            Err(HotkeyError::Actor(err)) => return Err(err.into()),
            Err(err) => tracing::warn!(%err, "ignoring hotkey"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in HotkeyAction::ALL {
            assert_eq!(action.as_str().parse::<HotkeyAction>().unwrap(), action);
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!("Focus-Right".parse::<HotkeyAction>().unwrap(), HotkeyAction::FocusRight);
        assert!("teleport".parse::<HotkeyAction>().is_err());
    }

    #[test]
    fn test_normalize_chord() {
        assert_eq!(normalize_chord("Win+Shift+B"), "shift+win+b");
        assert_eq!(normalize_chord("shift + super + b"), "shift+win+b");
        assert_eq!(normalize_chord("Control+Option+Left"), "ctrl+alt+left");
        assert_eq!(normalize_chord("Ctrl+Ctrl+X"), "ctrl+x");
    }

    #[test]
    fn test_default_keybindings_cover_every_chord() {
        let bindings = default_keybindings();
        assert_eq!(bindings.len(), 13);
        assert_eq!(bindings.get("Win+Up"), Some(&HotkeyAction::Maximize));
        assert_eq!(bindings.get("Ctrl+Shift+WheelDown"), Some(&HotkeyAction::DecreaseOpacity));
    }

    #[test]
    fn test_table_resolves_chords_and_names() {
        let table = HotkeyTable::new(&default_keybindings(), true);

        assert_eq!(table.resolve("win+alt+right").unwrap(), HotkeyAction::ResizeRight);
        assert_eq!(table.resolve("Shift+Win+Left").unwrap(), HotkeyAction::FocusLeft);
        assert_eq!(table.resolve("toggle-blur").unwrap(), HotkeyAction::ToggleBlur);
        assert!(matches!(table.resolve("Win+Q"), Err(HotkeyError::UnknownTrigger(_))));
    }

    #[test]
    fn test_decoration_only_mode_refuses_tiling_actions() {
        let table = HotkeyTable::new(&default_keybindings(), false);

        assert_eq!(table.len(), 5);
        assert!(matches!(table.resolve("shift-left"), Err(HotkeyError::Disabled(HotkeyAction::ShiftLeft))));
        assert_eq!(table.resolve("Win+Shift+B").unwrap(), HotkeyAction::ToggleBlur);
    }

    #[test]
    fn test_action_directions() {
        assert_eq!(HotkeyAction::ShiftLeft.direction(), Some(Direction::Left));
        assert_eq!(HotkeyAction::FocusRight.direction(), Some(Direction::Right));
        assert_eq!(HotkeyAction::Maximize.direction(), None);
    }
}
