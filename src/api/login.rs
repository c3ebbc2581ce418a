use std::sync::Arc;

use axum::{
    Extension,
    response::{Html, Redirect},
};

use crate::{management::SessionOrchestrator, spotify::SpotifyApi};

pub async fn index<A: SpotifyApi + 'static>(
    Extension(orchestrator): Extension<Arc<SessionOrchestrator<A>>>,
) -> Html<&'static str> {
    if orchestrator.snapshot().await.is_logged_in() {
        return Html("<h2>Logged in.</h2><p>Return to the terminal.</p>");
    }

    Html(
        "<h1>Spotify Recommendations Based on Your Top Tracks</h1>\
         <a href=\"/login\">Log in to Spotify</a>",
    )
}

/// Sends the browser on to the Spotify authorize page.
pub async fn login<A: SpotifyApi + 'static>(
    Extension(orchestrator): Extension<Arc<SessionOrchestrator<A>>>,
) -> Redirect {
    Redirect::to(orchestrator.login_url())
}
