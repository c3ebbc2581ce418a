use crate::{types::TokenResponse, utils};

use super::{SpotifyClient, SpotifyError};

impl SpotifyClient {
    /// Exchanges an authorization code for an access token.
    ///
    /// Uses the confidential client variant of the authorization code flow:
    /// the client id and secret travel as an HTTP Basic credential and the
    /// form body carries the code and the redirect URI that was used to
    /// obtain it.
    ///
    /// A response without `access_token` (Spotify answers `invalid_grant`
    /// with a JSON error body) is reported as [`SpotifyError::Auth`] carrying
    /// the raw body.
    pub(super) async fn request_token(&self, code: &str) -> Result<String, SpotifyError> {
        let res = self
            .http
            .post(&self.token_url)
            .header(
                "Authorization",
                utils::basic_auth_credential(&self.client_id, &self.client_secret),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let body = res.text().await?;
        let token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|t| t.access_token)
            .filter(|t| !t.is_empty());

        token.ok_or(SpotifyError::Auth(body))
    }
}
