use std::collections::HashSet;

use crate::{types::Track, utils};

/// Where the login handshake currently stands.
///
/// `Anonymous -> Exchanging -> Authenticated -> Ready`. A failed exchange
/// falls back to `Anonymous`; nothing leaves `Authenticated` or `Ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Exchanging,
    Authenticated,
    Ready,
}

/// Things that happened to the session.
///
/// `TokenAcquired` and `TopTracksUpdated` drive the follow-up fetches, the
/// rest are only of interest to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TokenAcquired,
    LoginFailed,
    IdentityLoaded,
    TopTracksUpdated,
    RecommendationsUpdated,
    /// The playlist in-progress flag was set (`true`) or cleared (`false`).
    PlaylistCreationChanged(bool),
    /// The shuffle in-progress flag was set (`true`) or cleared (`false`).
    ShufflingChanged(bool),
    PlaylistCreated(String),
}

/// Everything needed to create a playlist from the current recommendations.
#[derive(Debug, Clone)]
pub struct PlaylistTarget {
    pub access_token: String,
    pub user_id: String,
    pub uris: Vec<String>,
}

/// In-memory state of one login.
///
/// Lives for the whole process and is written only by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    is_logged_in: bool,
    user_id: Option<String>,
    state: SessionState,
    top_tracks: Vec<Track>,
    recommendations: Vec<Track>,
    creating_playlist: bool,
    shuffling: bool,
    attempted_codes: HashSet<String>,
    identity_loaded: bool,
    top_tracks_loaded: bool,
    top_tracks_seq: u64,
    recommendations_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn top_tracks(&self) -> &[Track] {
        &self.top_tracks
    }

    pub fn recommendations(&self) -> &[Track] {
        &self.recommendations
    }

    pub fn is_creating_playlist(&self) -> bool {
        self.creating_playlist
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    /// Claims `code` for exchange.
    ///
    /// Refused when a token is already held, another exchange is running,
    /// or this code has been tried before.
    pub fn begin_exchange(&mut self, code: &str) -> bool {
        if self.access_token.is_some() || self.state == SessionState::Exchanging {
            return false;
        }
        if !self.attempted_codes.insert(code.to_string()) {
            return false;
        }

        self.state = SessionState::Exchanging;
        true
    }

    pub fn complete_exchange(&mut self, token: Option<String>) {
        match token {
            Some(token) => {
                self.access_token = Some(token);
                self.is_logged_in = true;
                self.state = SessionState::Authenticated;
            }
            None => self.state = SessionState::Anonymous,
        }
    }

    pub fn set_user_id(&mut self, user_id: String) {
        self.user_id = Some(user_id);
        self.identity_loaded = true;
        self.promote();
    }

    /// Starts a top-track request and returns its sequence number.
    pub fn issue_top_tracks_request(&mut self) -> u64 {
        self.top_tracks_seq += 1;
        self.top_tracks_seq
    }

    /// Replaces the top tracks if `seq` is still the latest request.
    pub fn apply_top_tracks(&mut self, seq: u64, tracks: Vec<Track>) -> bool {
        if seq != self.top_tracks_seq {
            return false;
        }

        self.top_tracks = tracks;
        self.top_tracks_loaded = true;
        self.promote();
        true
    }

    pub fn issue_recommendations_request(&mut self) -> u64 {
        self.recommendations_seq += 1;
        self.recommendations_seq
    }

    /// Replaces the recommendations if `seq` is still the latest request.
    pub fn apply_recommendations(&mut self, seq: u64, tracks: Vec<Track>) -> bool {
        if seq != self.recommendations_seq {
            return false;
        }

        self.recommendations = tracks;
        true
    }

    /// Comma-joined ids of the known top tracks.
    pub fn seed_tracks(&self) -> Option<String> {
        utils::seed_tracks(&self.top_tracks)
    }

    pub fn begin_playlist_creation(&mut self) -> bool {
        if self.creating_playlist {
            return false;
        }
        self.creating_playlist = true;
        true
    }

    pub fn finish_playlist_creation(&mut self) {
        self.creating_playlist = false;
    }

    pub fn begin_shuffle(&mut self) -> bool {
        if self.shuffling {
            return false;
        }
        self.shuffling = true;
        true
    }

    pub fn finish_shuffle(&mut self) {
        self.shuffling = false;
    }

    /// `None` unless a token, a user id and at least one recommendation exist.
    pub fn playlist_target(&self) -> Option<PlaylistTarget> {
        if self.recommendations.is_empty() {
            return None;
        }

        Some(PlaylistTarget {
            access_token: self.access_token.clone()?,
            user_id: self.user_id.clone()?,
            uris: self
                .recommendations
                .iter()
                .map(|t| t.uri.clone())
                .collect(),
        })
    }

    fn promote(&mut self) {
        if self.state == SessionState::Authenticated && self.identity_loaded && self.top_tracks_loaded
        {
            self.state = SessionState::Ready;
        }
    }
}
