//! # CLI Module
//!
//! User-facing commands of `ddpm`.
//!
//! - [`login`] - one full session: log in through the browser, show top tracks
//!   and recommendations, then create playlists or shuffle from the terminal
//! - [`url`] - print the Spotify authorize URL
//!
//! The terminal screen is built by [`render::render_session`] from a snapshot
//! of the session and redrawn whenever the orchestrator reports a change.

mod login;
pub mod render;
mod url;

pub use login::LoginOptions;
pub use login::login;
pub use url::url;
