//! # Spotify Integration Module
//!
//! HTTP access to the Spotify accounts service and Web API. The session
//! orchestrator talks to Spotify only through the [`SpotifyApi`] trait, which
//! [`SpotifyClient`] implements with `reqwest`.
//!
//! ## Endpoints
//!
//! - `POST /api/token` - authorization code exchange (HTTP Basic client credentials)
//! - `GET /me` - current user profile
//! - `GET /me/top/tracks` - five most played tracks, short term
//! - `GET /recommendations` - tracks seeded from track ids
//! - `GET /me/playlists` - used to number playlists created on the same day
//! - `POST /users/{id}/playlists` - create a public playlist
//! - `POST /playlists/{id}/tracks` - add track URIs
//!
//! Every call except the token exchange carries `Authorization: Bearer <token>`.
//! There is no retry, no token refresh and no pagination; a failed call is
//! reported as a [`SpotifyError`] and the caller decides what to do with it.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config::Config,
    types::{CreatePlaylistRequest, CreatePlaylistResponse, Playlist, Track, UserProfile},
};

pub mod auth;
pub mod playlist;
pub mod tracks;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no access token in response: {0}")]
    Auth(String),
    #[error("spotify responded with {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Remote operations the session needs from Spotify.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Trades an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, SpotifyError>;

    async fn current_user(&self, token: &str) -> Result<UserProfile, SpotifyError>;

    async fn top_tracks(&self, token: &str) -> Result<Vec<Track>, SpotifyError>;

    /// `seed_tracks` is a comma separated list of track ids.
    async fn recommendations(
        &self,
        token: &str,
        seed_tracks: &str,
    ) -> Result<Vec<Track>, SpotifyError>;

    async fn my_playlists(&self, token: &str) -> Result<Vec<Playlist>, SpotifyError>;

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError>;

    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError>;
}

/// `reqwest` backed Spotify client.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyClient {
    /// Builds a client for the endpoints and credentials in `config`.
    ///
    /// No request is made here. The client id and secret are kept for the
    /// token exchange, every other call authenticates with the access token
    /// it is given.
    ///
    /// # Example
    ///
    /// ```
    /// let config = Config::from_env()?;
    /// let client = SpotifyClient::new(&config);
    /// let token = client.exchange_code(&code).await?;
    /// let me = client.current_user(&token).await?;
    /// ```
    pub fn new(config: &Config) -> Self {
        SpotifyClient {
            http: Client::new(),
            api_url: config.api_url.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

/// Turns a non-success status into [`SpotifyError::Api`] and decodes the body.
async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, SpotifyError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(SpotifyError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn exchange_code(&self, code: &str) -> Result<String, SpotifyError> {
        self.request_token(code).await
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, SpotifyError> {
        self.get_current_user(token).await
    }

    async fn top_tracks(&self, token: &str) -> Result<Vec<Track>, SpotifyError> {
        self.get_top_tracks(token).await
    }

    async fn recommendations(
        &self,
        token: &str,
        seed_tracks: &str,
    ) -> Result<Vec<Track>, SpotifyError> {
        self.get_recommendations(token, seed_tracks).await
    }

    async fn my_playlists(&self, token: &str) -> Result<Vec<Playlist>, SpotifyError> {
        self.get_my_playlists(token).await
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        self.post_playlist(token, user_id, request).await
    }

    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        self.post_tracks(token, playlist_id, uris).await
    }
}
