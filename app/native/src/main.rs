#![allow(clippy::multiple_crate_versions)]

//! Wingman - keyboard-driven horizontal tiling window manager.
//!
//! All behaviour lives in the library; this binary only runs the CLI and
//! maps failures to a non-zero exit code.

fn main() {
    if let Err(err) = wingman_lib::cli::run() {
        eprintln!("wingman: {err}");
        std::process::exit(1);
    }
}
