#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use ddpm::{
    management::{Session, SessionOrchestrator},
    spotify::{SpotifyApi, SpotifyError},
    types::{CreatePlaylistRequest, CreatePlaylistResponse, Image, Playlist, Track, TrackAlbum,
        TrackArtist, UserProfile},
};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Exchange(String),
    Me,
    TopTracks,
    Recommendations(String),
    MyPlaylists,
    CreatePlaylist {
        user_id: String,
        name: String,
        public: bool,
    },
    AddTracks {
        playlist_id: String,
        uris: Vec<String>,
    },
}

impl Call {
    fn kind(&self) -> &'static str {
        match self {
            Call::Exchange(_) => "exchange",
            Call::Me => "me",
            Call::TopTracks => "top_tracks",
            Call::Recommendations(_) => "recommendations",
            Call::MyPlaylists => "my_playlists",
            Call::CreatePlaylist { .. } => "create_playlist",
            Call::AddTracks { .. } => "add_tracks",
        }
    }
}

/// What the fake Spotify answers.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// `None` makes the token endpoint answer without an access token.
    pub token: Option<String>,
    pub user_id: String,
    pub top_tracks: Vec<Track>,
    /// Answers for successive recommendation calls, `default_recommendations` once drained.
    pub recommendations: VecDeque<Vec<Track>>,
    pub default_recommendations: Vec<Track>,
    pub playlists: Vec<Playlist>,
    pub fail: Vec<&'static str>,
}

#[derive(Default)]
struct FakeState {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
    creating_flag: Mutex<Vec<(&'static str, bool)>>,
    session: Mutex<Option<Arc<tokio::sync::Mutex<Session>>>>,
    gates: Mutex<HashMap<&'static str, VecDeque<Arc<Semaphore>>>>,
}

/// Recording stand-in for Spotify.
#[derive(Clone, Default)]
pub struct FakeSpotify {
    state: Arc<FakeState>,
}

impl FakeSpotify {
    pub fn new(script: Script) -> Self {
        let fake = FakeSpotify::default();
        *fake.state.script.lock().unwrap() = script;
        fake
    }

    /// Lets the fake note the playlist flag whenever it is called.
    pub fn watch(&self, session: Arc<tokio::sync::Mutex<Session>>) {
        *self.state.session.lock().unwrap() = Some(session);
    }

    /// Blocks the next call of `kind` until a permit is added to the returned gate.
    pub fn gate(&self, kind: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.state
            .gates
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(Arc::clone(&gate));
        gate
    }

    pub fn update(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.state.script.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn creating_flag_seen(&self) -> Vec<(&'static str, bool)> {
        self.state.creating_flag.lock().unwrap().clone()
    }

    async fn record(&self, call: Call) -> Result<(), SpotifyError> {
        let kind = call.kind();
        self.state.calls.lock().unwrap().push(call);

        let session = self.state.session.lock().unwrap().clone();
        if let Some(session) = session {
            let flag = session.lock().await.is_creating_playlist();
            self.state.creating_flag.lock().unwrap().push((kind, flag));
        }

        let gate = self
            .state
            .gates
            .lock()
            .unwrap()
            .get_mut(kind)
            .and_then(|q| q.pop_front());
        if let Some(gate) = gate {
            let _ = gate.acquire().await;
        }

        if self.state.script.lock().unwrap().fail.contains(&kind) {
            return Err(SpotifyError::Api {
                status: 500,
                body: format!("{} failed", kind),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(&self, code: &str) -> Result<String, SpotifyError> {
        self.record(Call::Exchange(code.to_string())).await?;
        let token = self.state.script.lock().unwrap().token.clone();
        token.ok_or_else(|| SpotifyError::Auth(r#"{"error":"invalid_grant"}"#.to_string()))
    }

    async fn current_user(&self, _token: &str) -> Result<UserProfile, SpotifyError> {
        self.record(Call::Me).await?;
        Ok(UserProfile {
            id: self.state.script.lock().unwrap().user_id.clone(),
            display_name: None,
        })
    }

    async fn top_tracks(&self, _token: &str) -> Result<Vec<Track>, SpotifyError> {
        // answer is taken when the call starts, not when a gate opens
        let tracks = self.state.script.lock().unwrap().top_tracks.clone();
        self.record(Call::TopTracks).await?;
        Ok(tracks)
    }

    async fn recommendations(
        &self,
        _token: &str,
        seed_tracks: &str,
    ) -> Result<Vec<Track>, SpotifyError> {
        let tracks = {
            let mut script = self.state.script.lock().unwrap();
            let default = script.default_recommendations.clone();
            script.recommendations.pop_front().unwrap_or(default)
        };
        self.record(Call::Recommendations(seed_tracks.to_string()))
            .await?;
        Ok(tracks)
    }

    async fn my_playlists(&self, _token: &str) -> Result<Vec<Playlist>, SpotifyError> {
        self.record(Call::MyPlaylists).await?;
        Ok(self.state.script.lock().unwrap().playlists.clone())
    }

    async fn create_playlist(
        &self,
        _token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        self.record(Call::CreatePlaylist {
            user_id: user_id.to_string(),
            name: request.name.clone(),
            public: request.public,
        })
        .await?;
        Ok(CreatePlaylistResponse {
            id: "new-playlist".to_string(),
            name: Some(request.name.clone()),
        })
    }

    async fn add_tracks(
        &self,
        _token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        self.record(Call::AddTracks {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        })
        .await
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        uri: format!("spotify:track:{}", id),
        album: TrackAlbum {
            images: vec![Image {
                url: format!("https://i.scdn.co/image/{}", id),
            }],
        },
        artists: vec![TrackArtist {
            name: format!("Artist {}", id),
        }],
    }
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

/// Five top tracks, recommendations r1..r3, user `user-1`.
pub fn default_script() -> Script {
    Script {
        token: Some("access-token".to_string()),
        user_id: "user-1".to_string(),
        top_tracks: tracks(&["1", "2", "3", "4", "5"]),
        default_recommendations: tracks(&["r1", "r2", "r3"]),
        ..Default::default()
    }
}

pub fn setup(script: Script) -> (Arc<SessionOrchestrator<FakeSpotify>>, FakeSpotify) {
    let fake = FakeSpotify::new(script);
    let session = Arc::new(tokio::sync::Mutex::new(Session::new()));
    fake.watch(Arc::clone(&session));

    let orchestrator =
        SessionOrchestrator::new(fake.clone(), "https://accounts.example/authorize", "P")
            .with_session(session);
    (Arc::new(orchestrator), fake)
}

/// Polls until `done` holds, panicking after about two seconds.
pub async fn eventually(mut done: impl FnMut() -> bool) {
    for _ in 0..400 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
