//! # API Module
//!
//! Handlers of the local HTTP server that receives the Spotify redirect.
//!
//! - [`index`] - landing page with a "Log in to Spotify" link
//! - [`login`] - redirects to the Spotify authorize page
//! - [`callback`] - hands the redirect query string to the session orchestrator
//! - [`health`] - status and version for quick checks
//!
//! Handlers are generic over the [`crate::spotify::SpotifyApi`] implementation
//! so the router can be exercised against a fake Spotify.

mod callback;
mod health;
mod login;

pub use callback::callback;
pub use health::health;
pub use login::index;
pub use login::login;
