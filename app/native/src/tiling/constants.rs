//! Internal constants for the tiling engine.
//!
//! User-tunable values (margin, minimum width, group capacity, opacity step)
//! live in the configuration. The values here are fixed limits of the engine.
//!
//! # Organization
//!
//! - `timing` - watcher cadence and actor timeouts
//! - `opacity` - opacity bounds

/// Timing constants for the reconciliation loop.
pub mod timing {
    /// Default interval between two samples of the visible-window set and
    /// of each tracked window's rectangle (ms).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

    /// Lower bound applied to the configured poll interval (ms).
    ///
    /// Polling faster than this only burns CPU on surface queries.
    pub const MIN_POLL_INTERVAL_MS: u64 = 10;

    /// Timeout for queries sent to the state actor (ms).
    pub const QUERY_TIMEOUT_MS: u64 = 1000;
}

/// Opacity bounds applied by the window state model.
pub mod opacity {
    /// Fully opaque.
    pub const MAX: u8 = 255;

    /// Lowest opacity a window can be faded to.
    pub const MIN: u8 = 75;
}

/// Channel buffer size for the state actor.
pub const CHANNEL_BUFFER_SIZE: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_bounds_are_ordered() {
        assert!(timing::MIN_POLL_INTERVAL_MS <= timing::DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_opacity_bounds_are_ordered() {
        assert!(opacity::MIN < opacity::MAX);
    }
}
