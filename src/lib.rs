//! Loficli — lofi playlist re-creation for Spotify
//!
//! This library drives the `loficli` binary: it authenticates against the
//! Spotify Web API, reads a source playlist, derives a lofi-styled search
//! query for every track, resolves those queries against the catalog and
//! assembles the matches into a freshly created playlist with recolored
//! cover art.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local OAuth callback server
//! - `cli` - Command-line entry points
//! - `config` - Configuration management and environment variables
//! - `cover` - Cover art download, recoloring and encoding
//! - `error` - Error taxonomy shared across the crate
//! - `management` - Session/token lifecycle management
//! - `pipeline` - The playlist transformation state machine
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `transform` - Pure name/query transformation rules
//! - `types` - Data structures and wire types

pub mod api;
pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod transform;
pub mod types;

/// A convenient Result type alias for fallible operations at the CLI
/// boundary, where errors of mixed provenance are only ever reported,
/// never matched on.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching playlist {}...", playlist_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist created with {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program
/// with exit code 1. Only for unrecoverable errors at the CLI boundary;
/// library code propagates `error::Error` instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark. Used for
/// recoverable degradations (missing cover art, unmatched tracks) that the
/// user should notice but that do not stop the pipeline.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
