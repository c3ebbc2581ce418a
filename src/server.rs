use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, management::SessionOrchestrator, spotify::SpotifyApi};

pub fn router<A: SpotifyApi + 'static>(orchestrator: Arc<SessionOrchestrator<A>>) -> Router {
    Router::new()
        .route("/", get(api::index::<A>))
        .route("/login", get(api::login::<A>))
        .route("/callback", get(api::callback::<A>))
        .route("/health", get(api::health))
        .layer(Extension(orchestrator))
}

/// Binds the callback server. Binding happens before the browser is sent
/// to Spotify so the redirect always finds a listener.
pub async fn bind(addr: SocketAddr) -> Res<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

pub async fn start_api_server<A: SpotifyApi + 'static>(
    listener: TcpListener,
    orchestrator: Arc<SessionOrchestrator<A>>,
) -> Res<()> {
    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}
