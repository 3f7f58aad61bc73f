//! Enumeration filter.
//!
//! Decides which top-level windows the tiling engine manages. A window is a
//! candidate when it is shown, titled, not cloaked, has a title bar, is not
//! excluded by title and (optionally) is not owned by another window.
//!
//! # Title rules
//!
//! ```text
//! ignoreTitles: ["Calculator"]          // exact, case-sensitive
//! ignoreTitlePatterns: ["^Picture-in"]  // regex, matched anywhere in the title
//! ```

use regex::Regex;

use super::surface::SurfaceWindow;
use crate::config::TilingConfig;

/// Why a window was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Empty title.
    Untitled,
    /// Not visible or iconified.
    Hidden,
    /// Hidden on another virtual desktop.
    Cloaked,
    /// Tool or tray window without a title bar.
    NoTitlebar,
    /// Title excluded by configuration.
    IgnoredTitle,
    /// Owned by another window while child windows are ignored.
    Owned,
}

/// Compiled enumeration filter.
#[derive(Clone, Debug, Default)]
pub struct WindowFilter {
    ignore_titles: Vec<String>,
    ignore_patterns: Vec<Regex>,
    ignore_children: bool,
}

impl WindowFilter {
    #[must_use]
    pub const fn new(ignore_titles: Vec<String>, ignore_patterns: Vec<Regex>, ignore_children: bool) -> Self {
        Self { ignore_titles, ignore_patterns, ignore_children }
    }

    /// Build the filter from configuration.
    ///
    /// Invalid patterns are skipped with a warning; [`TilingConfig::validate`]
    /// reports them beforehand.
    #[must_use]
    pub fn from_config(config: &TilingConfig) -> Self {
        let ignore_patterns = config
            .ignore_title_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern = %pattern, %err, "skipping invalid title pattern");
                    None
                }
            })
            .collect();

        Self::new(config.ignore_titles.clone(), ignore_patterns, config.ignore_children)
    }

    /// Whether a title is excluded by the exact list or any pattern.
    #[must_use]
    pub fn is_ignored_title(&self, title: &str) -> bool {
        self.ignore_titles.iter().any(|t| t == title) || self.ignore_patterns.iter().any(|re| re.is_match(title))
    }

    /// Whether a title qualifies for management at all.
    #[must_use]
    pub fn accepts_title(&self, title: &str) -> bool { !title.is_empty() && !self.is_ignored_title(title) }

    /// Check an enumerated window against every rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] that applies.
    pub fn check(&self, window: &SurfaceWindow) -> Result<(), Rejection> {
        if window.title.is_empty() {
            return Err(Rejection::Untitled);
        }
        if !window.visible || window.minimized {
            return Err(Rejection::Hidden);
        }
        if window.cloaked {
            return Err(Rejection::Cloaked);
        }
        if !window.has_titlebar {
            return Err(Rejection::NoTitlebar);
        }
        if self.is_ignored_title(&window.title) {
            return Err(Rejection::IgnoredTitle);
        }
        if self.ignore_children && window.owner.is_some() {
            return Err(Rejection::Owned);
        }
        Ok(())
    }

    /// Predicate form of [`Self::check`].
    #[must_use]
    pub fn is_candidate(&self, window: &SurfaceWindow) -> bool { self.check(window).is_ok() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::state::Rect;

    fn make_window(title: &str) -> SurfaceWindow {
        SurfaceWindow {
            id: 1,
            title: title.to_string(),
            rect: Rect::from_xywh(0, 0, 800, 600),
            owner: None,
            cloaked: false,
            minimized: false,
            visible: true,
            has_titlebar: true,
        }
    }

    fn make_filter() -> WindowFilter {
        WindowFilter::new(
            vec!["Calculator".to_string()],
            vec![Regex::new("^Picture-in-").unwrap()],
            true,
        )
    }

    #[test]
    fn test_accepts_regular_window() {
        assert_eq!(make_filter().check(&make_window("Terminal")), Ok(()));
    }

    #[test]
    fn test_rejects_untitled_window() {
        assert_eq!(make_filter().check(&make_window("")), Err(Rejection::Untitled));
    }

    #[test]
    fn test_rejects_exact_title() {
        let filter = make_filter();
        assert_eq!(filter.check(&make_window("Calculator")), Err(Rejection::IgnoredTitle));
        // Exact match only.
        assert!(filter.is_candidate(&make_window("Calculator - history")));
    }

    #[test]
    fn test_rejects_title_pattern() {
        let filter = make_filter();
        assert!(!filter.is_candidate(&make_window("Picture-in-picture")));
        assert!(filter.is_candidate(&make_window("My Picture-in-picture")));
    }

    #[test]
    fn test_rejects_hidden_and_minimized() {
        let filter = make_filter();

        let mut window = make_window("Editor");
        window.visible = false;
        assert_eq!(filter.check(&window), Err(Rejection::Hidden));

        let mut window = make_window("Editor");
        window.minimized = true;
        assert_eq!(filter.check(&window), Err(Rejection::Hidden));
    }

    #[test]
    fn test_rejects_cloaked_and_titlebarless() {
        let filter = make_filter();

        let mut window = make_window("Editor");
        window.cloaked = true;
        assert_eq!(filter.check(&window), Err(Rejection::Cloaked));

        let mut window = make_window("Tray");
        window.has_titlebar = false;
        assert_eq!(filter.check(&window), Err(Rejection::NoTitlebar));
    }

    #[test]
    fn test_owned_windows_follow_flag() {
        let mut window = make_window("Save As");
        window.owner = Some(7);

        assert_eq!(make_filter().check(&window), Err(Rejection::Owned));
        assert!(WindowFilter::new(Vec::new(), Vec::new(), false).is_candidate(&window));
    }

    #[test]
    fn test_from_config_skips_invalid_patterns() {
        let config = TilingConfig {
            ignore_title_patterns: vec!["(".to_string(), "^Zoom".to_string()],
            ..TilingConfig::default()
        };
        let filter = WindowFilter::from_config(&config);
        assert!(filter.is_ignored_title("Zoom Meeting"));
        assert!(filter.is_ignored_title("Calculator"));
    }
}
