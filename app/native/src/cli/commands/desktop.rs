//! `wingman run` and `wingman simulate`.
//!
//! Both commands build an in-memory desktop and start the tiling service on
//! a single-threaded tokio runtime. `run` only feeds hotkey triggers;
//! `simulate` also lets the user open, close, move and focus windows.

use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::DesktopArgs;
use crate::cli::output;
use crate::config::{self, WingmanConfig};
use crate::error::WingmanError;
use crate::hotkey::{HotkeyDispatcher, HotkeyError, HotkeyTable};
use crate::tiling::surface::{DisplayState, WindowSpec};
use crate::tiling::{MemorySurface, Rect, TilingService, WindowId, WindowSurface};

/// Size of windows opened without an explicit frame.
const DEFAULT_WINDOW_SIZE: (i32, i32) = (800, 600);

/// Offset between consecutively opened windows.
const CASCADE_STEP: i32 = 40;

/// One line of `simulate` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    Open { title: String, min_width: Option<i32> },
    Close(WindowId),
    Minimize(WindowId),
    Restore(WindowId),
    Focus(WindowId),
    Move { id: WindowId, frame: Rect },
    Dump,
    Quit,
    /// Anything else is handed to the hotkey dispatcher.
    Trigger(String),
}

fn parse_id(value: Option<&str>, command: &str) -> Result<WindowId, WingmanError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| WingmanError::InvalidArguments(format!("usage: {command} <window-id>")))
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns [`WingmanError::InvalidArguments`] for desktop commands with
/// missing or malformed arguments.
pub fn parse_command(line: &str) -> Result<Option<SimCommand>, WingmanError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match keyword.to_ascii_lowercase().as_str() {
        "open" => {
            let (title_parts, min_width) = match args.split_last() {
                Some((last, rest)) if !rest.is_empty() => match last.parse::<i32>() {
                    Ok(width) => (rest, Some(width)),
                    Err(_) => (args.as_slice(), None),
                },
                _ => (args.as_slice(), None),
            };
            if title_parts.is_empty() {
                return Err(WingmanError::InvalidArguments("usage: open <title> [min-width]".to_string()));
            }
            SimCommand::Open { title: title_parts.join(" "), min_width }
        }
        "close" => SimCommand::Close(parse_id(args.first().copied(), "close")?),
        "minimize" => SimCommand::Minimize(parse_id(args.first().copied(), "minimize")?),
        "restore" => SimCommand::Restore(parse_id(args.first().copied(), "restore")?),
        "focus" => SimCommand::Focus(parse_id(args.first().copied(), "focus")?),
        "move" => {
            let usage = || WingmanError::InvalidArguments("usage: move <id> <left> <top> <right> <bottom>".to_string());
            let [id, coords @ ..] = args.as_slice() else {
                return Err(usage());
            };
            let coords: Vec<i32> = coords.iter().map(|c| c.parse::<i32>()).collect::<Result<_, _>>().map_err(|_| usage())?;
            let [left, top, right, bottom] = coords.as_slice() else {
                return Err(usage());
            };
            SimCommand::Move {
                id: parse_id(Some(*id), "move")?,
                frame: Rect::new(*left, *top, *right, *bottom),
            }
        }
        "dump" => SimCommand::Dump,
        "quit" | "exit" => SimCommand::Quit,
        _ => SimCommand::Trigger(line.to_string()),
    };
    Ok(Some(command))
}

/// Build the simulated desktop.
///
/// # Errors
///
/// Returns [`WingmanError::InvalidArguments`] for a zero monitor count or a
/// non-positive monitor size.
pub fn build_surface(desktop: DesktopArgs) -> Result<MemorySurface, WingmanError> {
    if desktop.monitors == 0 {
        return Err(WingmanError::InvalidArguments("--monitors must be at least 1".to_string()));
    }
    if desktop.width <= 0 || desktop.height <= 0 {
        return Err(WingmanError::InvalidArguments("--width and --height must be positive".to_string()));
    }
    Ok(MemorySurface::side_by_side(desktop.monitors, desktop.width, desktop.height))
}

/// Open a window on the first monitor, cascading from its top-left corner.
pub fn open_window(surface: &MemorySurface, title: &str, min_width: Option<i32>) -> WindowId {
    let area = surface
        .monitors()
        .iter()
        .min_by_key(|m| (m.work_area.left, m.id))
        .map_or_else(|| Rect::from_xywh(0, 0, 1920, 1080), |m| m.work_area);

    let step = i32::try_from(surface.window_ids().len() % 10).unwrap_or(0) * CASCADE_STEP;
    let (width, height) = DEFAULT_WINDOW_SIZE;
    let frame = Rect::from_xywh(
        area.left + CASCADE_STEP + step,
        area.top + CASCADE_STEP + step,
        width.min(area.width() / 2),
        height.min(area.height() / 2),
    );

    let spec = WindowSpec::new(title, frame);
    let spec = match min_width {
        Some(width) => spec.min_width(width),
        None => spec,
    };
    surface.open(spec)
}

/// Apply a desktop command to the surface and describe what happened.
///
/// # Errors
///
/// Returns an error if the window does not exist.
pub fn apply_command(surface: &MemorySurface, command: &SimCommand) -> Result<String, WingmanError> {
    let message = match command {
        SimCommand::Open { title, min_width } => {
            let id = open_window(surface, title, *min_width);
            format!("opened window {id}")
        }
        SimCommand::Close(id) => {
            if !surface.close(*id) {
                return Err(WingmanError::InvalidArguments(format!("no window {id}")));
            }
            format!("closed window {id}")
        }
        SimCommand::Minimize(id) => {
            surface.set_display_state(*id, DisplayState::Minimized)?;
            format!("minimized window {id}")
        }
        SimCommand::Restore(id) => {
            surface.set_display_state(*id, DisplayState::Normal)?;
            format!("restored window {id}")
        }
        SimCommand::Focus(id) => {
            surface.set_focus(*id)?;
            format!("focused window {id}")
        }
        SimCommand::Move { id, frame } => {
            surface.user_move(*id, *frame)?;
            format!("moved window {id} to {frame}")
        }
        SimCommand::Dump | SimCommand::Quit | SimCommand::Trigger(_) => String::new(),
    };
    Ok(message)
}

fn runtime() -> Result<tokio::runtime::Runtime, WingmanError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

/// Execute `wingman run`.
///
/// # Errors
///
/// Returns an error if the desktop arguments are invalid or the service
/// fails.
pub fn run(desktop: DesktopArgs, open: &[String], json: bool) -> Result<(), WingmanError> {
    let config = config::init();
    let surface = build_surface(desktop)?;
    for title in open {
        let id = open_window(&surface, title, None);
        tracing::debug!(window = id, title = %title, "opened window");
    }

    let surface: Arc<dyn WindowSurface> = Arc::new(surface);
    let stdin = BufReader::new(tokio::io::stdin());
    let snapshot = runtime()?.block_on(crate::run_service(surface, config, stdin))?;

    output::print_snapshot(&snapshot, json);
    Ok(())
}

/// Execute `wingman simulate`.
///
/// # Errors
///
/// Returns an error if the desktop arguments are invalid or the service
/// fails.
pub fn simulate(desktop: DesktopArgs, json: bool) -> Result<(), WingmanError> {
    let config = config::init();
    let surface = Arc::new(build_surface(desktop)?);
    let stdin = BufReader::new(tokio::io::stdin());
    runtime()?.block_on(simulate_session(surface, config, stdin, json))
}

/// Run a simulator session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if reading input fails or the coordinator stops.
pub async fn simulate_session<R>(
    surface: Arc<MemorySurface>,
    config: &WingmanConfig,
    input: R,
    json: bool,
) -> Result<(), WingmanError>
where
    R: AsyncBufRead + Unpin,
{
    let service = TilingService::start(Arc::clone(&surface) as Arc<dyn WindowSurface>, config.tiling.clone())?;
    let table = HotkeyTable::new(&config.keybindings, config.tiling.enabled);
    let dispatcher = HotkeyDispatcher::new(table, service.handle().clone());

    let mut lines = input.lines();
    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(err) => break Err(err.into()),
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{} {err}", "Error:".red());
                continue;
            }
        };

        match command {
            SimCommand::Quit => break Ok(()),
            SimCommand::Dump => {
                service.settle().await;
                match service.handle().snapshot().await {
                    Ok(snapshot) => output::print_snapshot(&snapshot, json),
                    Err(err) => break Err(err.into()),
                }
            }
            SimCommand::Trigger(trigger) => match dispatcher.dispatch(&trigger).await {
                Ok(action) => println!("{} {action}", "→".cyan()),
                Err(HotkeyError::Actor(err)) => break Err(err.into()),
                Err(err) => println!("{} {err}", "Error:".red()),
            },
            desktop_command => {
                match apply_command(&surface, &desktop_command) {
                    Ok(message) => println!("{message}"),
                    Err(err) => println!("{} {err}", "Error:".red()),
                }
                service.settle().await;
            }
        }
    };

    service.stop().await;
    result
}
