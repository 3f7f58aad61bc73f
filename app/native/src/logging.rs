//! Tracing subscriber setup.
//!
//! The filter is taken from `WINGMAN_LOG`, then `RUST_LOG`, then the level
//! passed on the command line. Logs go to stderr so stdout stays free for
//! command output.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding a filter directive for Wingman only.
pub const LOG_ENV: &str = "WINGMAN_LOG";

/// Level used when neither the environment nor the CLI sets one.
pub const DEFAULT_LEVEL: &str = "info";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Resolve the filter directive to install.
///
/// `None` means logging is switched off.
#[must_use]
pub fn filter_directive(
    level: Option<&str>,
    quiet: bool,
    wingman_log: Option<String>,
    rust_log: Option<String>,
) -> Option<String> {
    if quiet {
        return None;
    }
    let directive = wingman_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .or_else(|| level.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    Some(directive)
}

/// Install the global subscriber. Calling this more than once is a no-op.
pub fn init(level: Option<&str>, quiet: bool) {
    INITIALIZED.get_or_init(|| {
        let Some(directive) =
            filter_directive(level, quiet, std::env::var(LOG_ENV).ok(), std::env::var("RUST_LOG").ok())
        else {
            return;
        };

        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("wingman: invalid log filter '{directive}': {err}");
            EnvFilter::new(DEFAULT_LEVEL)
        });

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_disables_logging() {
        assert_eq!(filter_directive(Some("debug"), true, Some("trace".into()), None), None);
    }

    #[test]
    fn test_wingman_log_wins() {
        let directive = filter_directive(Some("warn"), false, Some("debug".into()), Some("trace".into()));
        assert_eq!(directive.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rust_log_before_cli_level() {
        let directive = filter_directive(Some("warn"), false, None, Some("trace".into()));
        assert_eq!(directive.as_deref(), Some("trace"));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let directive = filter_directive(Some("warn"), false, Some("  ".into()), None);
        assert_eq!(directive.as_deref(), Some("warn"));
    }

    #[test]
    fn test_default_level() {
        assert_eq!(filter_directive(None, false, None, None).as_deref(), Some(DEFAULT_LEVEL));
    }

    #[test]
    fn test_init_twice_is_noop() {
        init(Some("error"), false);
        init(Some("trace"), false);
    }
}
