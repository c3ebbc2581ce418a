//! Top-track recommendations and playlists for Spotify
//!
//! This library backs the `ddpm` command-line tool. It logs a user in to
//! Spotify through the authorization code flow, loads their most played
//! tracks, asks Spotify for recommendations seeded from them and can save
//! those recommendations as a new playlist.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local callback server
//! - `cli` - Command-line interface implementations and terminal rendering
//! - `config` - Configuration management and environment variables
//! - `management` - Session state and the orchestrator that drives it
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Query parsing, URL building and playlist naming helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias used by the CLI layer, boxing any error that crosses an
/// async boundary.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line prefixed with a blue `[o]`.
///
/// ```
/// info!("Loaded {} top tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a status line prefixed with a green `[✓]`.
///
/// This is also how the user is told a playlist was created:
///
/// ```
/// success!("Playlist \"{}\" created successfully!", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `[!]` line and exits with status 1.
///
/// Reserved for the CLI layer, where a missing configuration or an unbound
/// callback port leaves nothing sensible to do. The session code never
/// calls it; remote failures there are reported with [`warning!`].
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a status line prefixed with a yellow `[!]`.
///
/// The diagnostic channel for remote failures that are logged and then
/// swallowed:
///
/// ```
/// warning!("Error fetching top tracks: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
