use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{Receiver, error::RecvError},
    time::{Instant, timeout_at},
};

use crate::{
    cli::render::render_session,
    config::Config,
    error, info,
    management::{FetchOutcome, PlaylistOutcome, SessionEvent, SessionOrchestrator},
    server,
    spotify::{SpotifyApi, SpotifyClient},
    utils, warning,
};

#[derive(Debug, Clone, Copy)]
pub struct LoginOptions {
    pub open_browser: bool,
    pub create_playlist: bool,
}

/// Runs one complete session: login, screen, then commands from stdin.
///
/// # Flow
///
/// 1. **Server Start**: binds the callback server on `SERVER_ADDRESS` before
///    anything else, so the redirect always finds a listener
/// 2. **Browser Launch**: opens the authorize page, or prints the login URL
///    when `--no-browser` is given or no browser can be started
/// 3. **Waiting**: a spinner runs until the token arrives or the login
///    timeout elapses
/// 4. **Session**: with `--create-playlist` the recommendations are saved
///    once and the command returns, otherwise the screen is drawn and
///    redrawn on every session event
///
/// # Commands
///
/// - `c` - create a playlist from the recommendations
/// - `s` - shuffle the recommendations
/// - `r` - redraw the screen
/// - `q` - quit (so does Ctrl-C or the end of stdin)
///
/// # Error Handling
///
/// - A callback port already in use terminates with an error
/// - A login that does not finish in time terminates with an error
/// - Failed Spotify calls are shown as warnings and the session goes on
pub async fn login(config: Config, options: LoginOptions) {
    let orchestrator = Arc::new(SessionOrchestrator::new(
        SpotifyClient::new(&config),
        utils::build_authorize_url(&config),
        config.playlist_prefix.clone(),
    ));
    let mut events = orchestrator.subscribe();

    let listener = match server::bind(config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!(
            "Cannot start callback server on {}: {}",
            config.server_addr, e
        ),
    };

    let server_orchestrator = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(listener, server_orchestrator).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if options.open_browser {
        orchestrator.initiate_login();
    } else {
        info!(
            "Open http://{}/login or the URL below to log in:\n{}",
            config.server_addr,
            orchestrator.login_url()
        );
    }

    let pb = spinner("Waiting for the Spotify redirect...");
    let logged_in = wait_for(&mut events, config.login_timeout, |e| {
        *e == SessionEvent::TokenAcquired
    })
    .await;
    pb.finish_and_clear();

    if !logged_in {
        error!("Authentication failed or timed out.");
    }

    if options.create_playlist {
        create_and_exit(&orchestrator, &mut events, config.login_timeout).await;
        return;
    }

    interact(&orchestrator, &mut events).await;
}

async fn create_and_exit<A: SpotifyApi + 'static>(
    orchestrator: &Arc<SessionOrchestrator<A>>,
    events: &mut Receiver<SessionEvent>,
    wait: Duration,
) {
    let has_recommendations = !orchestrator.snapshot().await.recommendations().is_empty();
    if !has_recommendations
        && !wait_for(events, wait, |e| *e == SessionEvent::RecommendationsUpdated).await
    {
        redraw(orchestrator).await;
        warning!("No recommendations arrived, nothing to save.");
        return;
    }

    redraw(orchestrator).await;
    report_playlist(orchestrator.create_playlist().await);
}

async fn interact<A: SpotifyApi + 'static>(
    orchestrator: &Arc<SessionOrchestrator<A>>,
    events: &mut Receiver<SessionEvent>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    redraw(orchestrator).await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::TokenAcquired) | Ok(SessionEvent::LoginFailed) => {}
                Ok(_) | Err(RecvError::Lagged(_)) => redraw(orchestrator).await,
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line {
                Ok(Some(command)) => match command.trim() {
                    "c" => {
                        let o = Arc::clone(orchestrator);
                        tokio::spawn(async move { report_playlist(o.create_playlist().await) });
                    }
                    "s" => {
                        let o = Arc::clone(orchestrator);
                        tokio::spawn(async move {
                            if let Ok(FetchOutcome::Skipped) = o.shuffle().await {
                                info!("Shuffle not available right now");
                            }
                        });
                    }
                    "r" => redraw(orchestrator).await,
                    "q" => break,
                    "" => {}
                    other => warning!("Unknown command '{}'", other),
                },
                Ok(None) | Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}

/// Consumes events until one matches `wanted` or `wait` elapses.
async fn wait_for<F>(events: &mut Receiver<SessionEvent>, wait: Duration, wanted: F) -> bool
where
    F: Fn(&SessionEvent) -> bool,
{
    let deadline = Instant::now() + wait;

    loop {
        match timeout_at(deadline, events.recv()).await {
            Ok(Ok(event)) if wanted(&event) => return true,
            Ok(Ok(SessionEvent::LoginFailed)) => {
                warning!("Login failed, try again from the browser.")
            }
            Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => {}
            Ok(Err(RecvError::Closed)) | Err(_) => return false,
        }
    }
}

async fn redraw<A: SpotifyApi + 'static>(orchestrator: &SessionOrchestrator<A>) {
    let session = orchestrator.snapshot().await;
    println!("\n{}\n", render_session(&session, orchestrator.login_url()));
}

fn report_playlist(outcome: PlaylistOutcome) {
    match outcome {
        PlaylistOutcome::Created {
            tracks_added: false,
            name,
            ..
        } => warning!("Playlist \"{}\" was created without tracks", name),
        PlaylistOutcome::Created { .. } => {}
        PlaylistOutcome::AlreadyInProgress => info!("A playlist is already being created"),
        PlaylistOutcome::NotReady => info!("No recommendations to save yet"),
        PlaylistOutcome::Failed(_) => {}
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
