use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};

use crate::{
    management::{ExchangeOutcome, ResumeOutcome, SessionOrchestrator, SessionState},
    spotify::SpotifyApi,
    warning,
};

/// Handles the Spotify redirect to `/callback`.
///
/// The exchange and the fetches that follow it run on their own task. The
/// handler only waits for that task, so a browser that closes the tab or
/// drops the connection mid-exchange cannot leave the session half way
/// through a login.
///
/// # Responses
///
/// - `Login successful.` - the code was exchanged for a token
/// - `Already logged in.` - a token is held, the redirect was replayed
/// - `Login already in progress.` - another exchange is running
/// - `This authorization code was already used.` - the code was tried before
///   and no token is held, links back to `/login`
/// - `Login failed.` - Spotify refused the code or could not be reached
/// - `Missing authorization code.` - no `code` parameter (or an `error` one)
pub async fn callback<A: SpotifyApi + 'static>(
    RawQuery(query): RawQuery,
    Extension(orchestrator): Extension<Arc<SessionOrchestrator<A>>>,
) -> Html<&'static str> {
    let query = query.unwrap_or_default();

    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.resume_from_redirect(&query).await }
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warning!("Login task did not finish: {}", e);
            return Html("<h4>Login failed.</h4>");
        }
    };

    match outcome {
        ResumeOutcome::Exchange(ExchangeOutcome::LoggedIn) => Html(
            "<h2>Login successful.</h2><p>Close this window and return to the terminal.</p>",
        ),
        ResumeOutcome::Exchange(ExchangeOutcome::Skipped) => {
            match orchestrator.snapshot().await.state() {
                SessionState::Anonymous => Html(
                    "<h4>This authorization code was already used.</h4>\
                     <p><a href=\"/login\">Log in again</a></p>",
                ),
                SessionState::Exchanging => {
                    Html("<h4>Login already in progress.</h4><p>Return to the terminal.</p>")
                }
                SessionState::Authenticated | SessionState::Ready => {
                    Html("<h4>Already logged in.</h4><p>Return to the terminal.</p>")
                }
            }
        }
        ResumeOutcome::Exchange(ExchangeOutcome::Failed(_)) => Html("<h4>Login failed.</h4>"),
        ResumeOutcome::NoCode => Html("<h4>Missing authorization code.</h4>"),
    }
}
