use std::{collections::VecDeque, sync::Arc};

use chrono::NaiveDate;
use tokio::sync::{Mutex, broadcast};

use crate::{
    info,
    management::session::{PlaylistTarget, Session, SessionEvent},
    spotify::{SpotifyApi, SpotifyError},
    success,
    types::CreatePlaylistRequest,
    utils, warning,
};

const EVENT_CAPACITY: usize = 64;

/// Result of a fetch that replaces a list in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was stored; carries the number of items.
    Applied(usize),
    /// A newer request for the same field was issued while this one ran.
    Superseded,
    /// Preconditions not met (no token, no seeds, already running), no call made.
    Skipped,
}

#[derive(Debug)]
pub enum ExchangeOutcome {
    LoggedIn,
    /// Token held, exchange running, or code already used. No call made.
    Skipped,
    Failed(SpotifyError),
}

#[derive(Debug)]
pub enum ResumeOutcome {
    NoCode,
    Exchange(ExchangeOutcome),
}

#[derive(Debug)]
pub enum PlaylistOutcome {
    Created {
        name: String,
        playlist_id: String,
        tracks_added: bool,
    },
    AlreadyInProgress,
    NotReady,
    Failed(SpotifyError),
}

/// Drives the login handshake and the fetches that depend on it.
///
/// Holds the [`Session`] behind a mutex and is its only writer. The lock is
/// released before every network call, so a response is applied with
/// whatever sequence number is current when it arrives.
pub struct SessionOrchestrator<A> {
    api: A,
    session: Arc<Mutex<Session>>,
    events: broadcast::Sender<SessionEvent>,
    login_url: String,
    playlist_prefix: String,
}

impl<A: SpotifyApi> SessionOrchestrator<A> {
    /// Creates an orchestrator with a fresh anonymous session.
    ///
    /// # Arguments
    ///
    /// * `api` - Spotify access, [`crate::spotify::SpotifyClient`] outside of tests
    /// * `login_url` - the full authorize URL the browser is sent to
    /// * `playlist_prefix` - first part of every created playlist name
    ///
    /// # Example
    ///
    /// ```
    /// let config = Config::from_env()?;
    /// let orchestrator = SessionOrchestrator::new(
    ///     SpotifyClient::new(&config),
    ///     utils::build_authorize_url(&config),
    ///     config.playlist_prefix.clone(),
    /// );
    /// ```
    pub fn new(api: A, login_url: impl Into<String>, playlist_prefix: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SessionOrchestrator {
            api,
            session: Arc::new(Mutex::new(Session::new())),
            events,
            login_url: login_url.into(),
            playlist_prefix: playlist_prefix.into(),
        }
    }

    /// Uses an existing session instead of a fresh one.
    pub fn with_session(mut self, session: Arc<Mutex<Session>>) -> Self {
        self.session = session;
        self
    }

    /// Returns a receiver for every [`SessionEvent`] sent from now on.
    ///
    /// A slow receiver may miss events (`RecvError::Lagged`); the session
    /// itself is the source of truth, events only say when to look again.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    /// Clones the current session for rendering or inspection.
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Sends the user to the authorize page.
    ///
    /// Leaves the session untouched. Returns `false` when no browser could
    /// be opened, the URL has then been printed for manual navigation.
    pub fn initiate_login(&self) -> bool {
        if webbrowser::open(&self.login_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                self.login_url
            );
            return false;
        }
        true
    }

    /// Picks up the authorization redirect.
    ///
    /// `query` is the raw query string of the redirect. A `code` parameter
    /// leads to an exchange unless the session already holds a token.
    pub async fn resume_from_redirect(&self, query: &str) -> ResumeOutcome {
        let params = utils::parse_query_params(query);

        if let Some(error) = params.get("error") {
            warning!("Authorization was not granted: {}", error);
        }

        match params.get("code") {
            Some(code) if !code.is_empty() => ResumeOutcome::Exchange(self.exchange_code(code).await),
            _ => ResumeOutcome::NoCode,
        }
    }

    /// Exchanges `code` for an access token, at most once per code.
    ///
    /// On success the identity, top tracks and recommendations are loaded
    /// before this returns.
    pub async fn exchange_code(&self, code: &str) -> ExchangeOutcome {
        if !self.session.lock().await.begin_exchange(code) {
            return ExchangeOutcome::Skipped;
        }

        match self.api.exchange_code(code).await {
            Ok(token) => {
                self.session.lock().await.complete_exchange(Some(token));
                success!("Logged in to Spotify");
                self.dispatch(SessionEvent::TokenAcquired).await;
                ExchangeOutcome::LoggedIn
            }
            Err(e) => {
                self.session.lock().await.complete_exchange(None);
                warning!("Failed to retrieve access token: {}", e);
                self.notify(SessionEvent::LoginFailed);
                ExchangeOutcome::Failed(e)
            }
        }
    }

    /// Loads the current user's id.
    ///
    /// Needs an access token, without one no call is made.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome::Applied(1))` - the user id is stored and
    ///   `IdentityLoaded` is broadcast
    /// * `Ok(FetchOutcome::Skipped)` - not logged in
    /// * `Err(SpotifyError)` - the profile request failed, nothing changes
    pub async fn fetch_identity(&self) -> Result<FetchOutcome, SpotifyError> {
        let outcome = self.load_identity().await?;
        if outcome != FetchOutcome::Skipped {
            self.notify(SessionEvent::IdentityLoaded);
        }
        Ok(outcome)
    }

    /// Replaces the top tracks, then refreshes recommendations when the new
    /// list is not empty.
    pub async fn fetch_top_tracks(&self) -> Result<FetchOutcome, SpotifyError> {
        let outcome = self.load_top_tracks().await?;
        if let FetchOutcome::Applied(n) = outcome {
            if n > 0 {
                self.dispatch(SessionEvent::TopTracksUpdated).await;
            }
        }
        Ok(outcome)
    }

    /// Replaces the recommendations, seeded with every known top track.
    pub async fn fetch_recommendations(&self) -> Result<FetchOutcome, SpotifyError> {
        let outcome = self.load_recommendations().await?;
        if let FetchOutcome::Applied(_) = outcome {
            self.notify(SessionEvent::RecommendationsUpdated);
        }
        Ok(outcome)
    }

    /// Asks for recommendations again with the same seeds.
    ///
    /// Spotify decides whether the answer differs. A second shuffle while one
    /// is running is skipped.
    ///
    /// Observers see `ShufflingChanged(true)` when the request starts and
    /// `ShufflingChanged(false)` once it has ended, whatever the result. A
    /// stored answer is reported with `RecommendationsUpdated` after the flag
    /// is already cleared, so a redraw on that event shows the final controls.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome::Applied(n))` - `n` recommendations replaced the old ones
    /// * `Ok(FetchOutcome::Superseded)` - a newer recommendation request won
    /// * `Ok(FetchOutcome::Skipped)` - already shuffling, no token or no seeds
    /// * `Err(SpotifyError)` - the request failed, the old list is kept
    pub async fn shuffle(&self) -> Result<FetchOutcome, SpotifyError> {
        if !self.session.lock().await.begin_shuffle() {
            return Ok(FetchOutcome::Skipped);
        }
        self.notify(SessionEvent::ShufflingChanged(true));

        let result = self.load_recommendations().await;
        self.session.lock().await.finish_shuffle();
        self.notify(SessionEvent::ShufflingChanged(false));

        match &result {
            Ok(FetchOutcome::Applied(_)) => self.notify(SessionEvent::RecommendationsUpdated),
            Ok(_) => {}
            Err(e) => warning!("Error fetching recommendations: {}", e),
        }
        result
    }

    /// Saves the current recommendations as today's next playlist.
    ///
    /// Same as [`SessionOrchestrator::create_playlist_on`] with the current
    /// UTC date.
    ///
    /// # Example
    ///
    /// ```
    /// match orchestrator.create_playlist().await {
    ///     PlaylistOutcome::Created { name, .. } => info!("Saved {}", name),
    ///     PlaylistOutcome::AlreadyInProgress => info!("Still working on it"),
    ///     PlaylistOutcome::NotReady => info!("Nothing to save yet"),
    ///     PlaylistOutcome::Failed(e) => warning!("{}", e),
    /// }
    /// ```
    pub async fn create_playlist(&self) -> PlaylistOutcome {
        self.create_playlist_on(utils::today()).await
    }

    /// Creates `"<prefix> - <date> - <n>"` and fills it with the current
    /// recommendations.
    ///
    /// # Flow
    ///
    /// 1. **Preconditions**: token, user id and at least one recommendation,
    ///    otherwise `NotReady` without any call
    /// 2. **Flag**: the in-progress flag is set and `PlaylistCreationChanged(true)`
    ///    broadcast; a flow already running gives `AlreadyInProgress`
    /// 3. **Numbering**: the user's playlists are listed to count the runs of `date`
    /// 4. **Creation**: a public playlist with the numbered name
    /// 5. **Tracks**: every recommendation URI is added in one request
    ///
    /// The flag is cleared and `PlaylistCreationChanged(false)` broadcast on
    /// every exit after step 2.
    ///
    /// # Error Handling
    ///
    /// - A failed listing or creation ends the flow with `Failed`
    /// - A failed track insertion still counts as created, the playlist exists
    ///   remotely and is left empty
    pub async fn create_playlist_on(&self, date: NaiveDate) -> PlaylistOutcome {
        let target = {
            let mut session = self.session.lock().await;
            let Some(target) = session.playlist_target() else {
                warning!("Nothing to put in a playlist yet");
                return PlaylistOutcome::NotReady;
            };
            if !session.begin_playlist_creation() {
                return PlaylistOutcome::AlreadyInProgress;
            }
            target
        };
        self.notify(SessionEvent::PlaylistCreationChanged(true));

        let outcome = self.run_playlist_flow(date, &target).await;
        self.session.lock().await.finish_playlist_creation();
        self.notify(SessionEvent::PlaylistCreationChanged(false));

        if let PlaylistOutcome::Created { name, .. } = &outcome {
            success!("Playlist \"{}\" created successfully!", name);
            self.notify(SessionEvent::PlaylistCreated(name.clone()));
        }
        outcome
    }

    async fn run_playlist_flow(
        &self,
        date: NaiveDate,
        target: &PlaylistTarget,
    ) -> PlaylistOutcome {
        let existing = match self.api.my_playlists(&target.access_token).await {
            Ok(playlists) => playlists,
            Err(e) => {
                warning!("Error checking for existing playlists: {}", e);
                return PlaylistOutcome::Failed(e);
            }
        };

        let name = utils::next_playlist_name(&self.playlist_prefix, date, &existing);
        let request = CreatePlaylistRequest {
            name: name.clone(),
            public: true,
        };

        let playlist_id = match self
            .api
            .create_playlist(&target.access_token, &target.user_id, &request)
            .await
        {
            Ok(created) => created.id,
            Err(e) => {
                warning!("Error creating playlist: {}", e);
                return PlaylistOutcome::Failed(e);
            }
        };

        let tracks_added = match self
            .api
            .add_tracks(&target.access_token, &playlist_id, &target.uris)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warning!("Error adding tracks to playlist {}: {}", name, e);
                false
            }
        };

        PlaylistOutcome::Created {
            name,
            playlist_id,
            tracks_added,
        }
    }

    /// Runs the follow-ups of `event` and of every event they raise.
    ///
    /// | event              | follow-up                          |
    /// |--------------------|------------------------------------|
    /// | `TokenAcquired`    | identity, then top tracks          |
    /// | `TopTracksUpdated` | recommendations                    |
    async fn dispatch(&self, event: SessionEvent) {
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            self.notify(event.clone());

            match event {
                SessionEvent::TokenAcquired => {
                    match self.load_identity().await {
                        Ok(FetchOutcome::Skipped) => {}
                        Ok(_) => pending.push_back(SessionEvent::IdentityLoaded),
                        Err(e) => warning!("Error fetching user profile: {}", e),
                    }
                    match self.load_top_tracks().await {
                        Ok(FetchOutcome::Applied(n)) if n > 0 => {
                            pending.push_back(SessionEvent::TopTracksUpdated)
                        }
                        Ok(FetchOutcome::Applied(_)) => info!("No top tracks for this account yet"),
                        Ok(_) => {}
                        Err(e) => warning!("Error fetching top tracks: {}", e),
                    }
                }
                SessionEvent::TopTracksUpdated => match self.load_recommendations().await {
                    Ok(FetchOutcome::Applied(_)) => {
                        pending.push_back(SessionEvent::RecommendationsUpdated)
                    }
                    Ok(_) => {}
                    Err(e) => warning!("Error fetching recommendations: {}", e),
                },
                _ => {}
            }
        }
    }

    fn notify(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn load_identity(&self) -> Result<FetchOutcome, SpotifyError> {
        let Some(token) = self.token().await else {
            return Ok(FetchOutcome::Skipped);
        };

        let profile = self.api.current_user(&token).await?;
        self.session.lock().await.set_user_id(profile.id);
        Ok(FetchOutcome::Applied(1))
    }

    async fn load_top_tracks(&self) -> Result<FetchOutcome, SpotifyError> {
        let (token, seq) = {
            let mut session = self.session.lock().await;
            let Some(token) = session.access_token().map(str::to_string) else {
                return Ok(FetchOutcome::Skipped);
            };
            (token, session.issue_top_tracks_request())
        };

        let tracks = self.api.top_tracks(&token).await?;
        let count = tracks.len();

        if self.session.lock().await.apply_top_tracks(seq, tracks) {
            Ok(FetchOutcome::Applied(count))
        } else {
            Ok(FetchOutcome::Superseded)
        }
    }

    async fn load_recommendations(&self) -> Result<FetchOutcome, SpotifyError> {
        let (token, seeds, seq) = {
            let mut session = self.session.lock().await;
            let Some(token) = session.access_token().map(str::to_string) else {
                return Ok(FetchOutcome::Skipped);
            };
            let Some(seeds) = session.seed_tracks() else {
                return Ok(FetchOutcome::Skipped);
            };
            (token, seeds, session.issue_recommendations_request())
        };

        let tracks = self.api.recommendations(&token, &seeds).await?;
        let count = tracks.len();

        if self.session.lock().await.apply_recommendations(seq, tracks) {
            Ok(FetchOutcome::Applied(count))
        } else {
            Ok(FetchOutcome::Superseded)
        }
    }

    async fn token(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .access_token()
            .map(str::to_string)
    }
}
