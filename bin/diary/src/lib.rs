//! Diary CLI Library
//!
//! Command implementations and the preview server behind the `diary` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, server, new)
//! - [`server`] - Router rendering pages on every request
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use diary::cmd;
//!
//! // Build the static site in the current directory
//! cmd::build::run(Path::new(".")).unwrap();
//! ```

pub mod cmd;
pub mod server;

// Re-export core types for convenience
pub use diary_core::{Config, Post, Site};
pub use diary_generator::{ArchiveIndex, BuildStats, Builder, PostCollector, ThemeRenderer};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// diary::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
