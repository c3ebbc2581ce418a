use crate::types::{RecommendationsResponse, TopTracksResponse, Track, UserProfile};

use super::{SpotifyClient, SpotifyError, read_json};

impl SpotifyClient {
    /// Fetches the profile of the user the token belongs to.
    ///
    /// Only the user id is used; it is the owner of every playlist created
    /// later on.
    ///
    /// # Arguments
    ///
    /// * `token` - access token from the code exchange
    ///
    /// # Error Handling
    ///
    /// - Connection problems give [`SpotifyError::Transport`]
    /// - Any non-2xx status (an expired token answers 401) gives [`SpotifyError::Api`]
    /// - A body that is not a profile gives [`SpotifyError::Decode`]
    pub(super) async fn get_current_user(&self, token: &str) -> Result<UserProfile, SpotifyError> {
        let res = self
            .http
            .get(self.endpoint("/me"))
            .header("Authorization", Self::bearer(token))
            .send()
            .await?;

        read_json(res).await
    }

    /// Five most played tracks over the short term window (about four weeks).
    ///
    /// An account without listening history answers with an empty `items`
    /// list, which is returned as an empty `Vec` and not as an error.
    pub(super) async fn get_top_tracks(&self, token: &str) -> Result<Vec<Track>, SpotifyError> {
        let res = self
            .http
            .get(self.endpoint("/me/top/tracks?time_range=short_term&limit=5"))
            .header("Authorization", Self::bearer(token))
            .send()
            .await?;

        let top: TopTracksResponse = read_json(res).await?;
        Ok(top.items)
    }

    /// Asks for tracks similar to the given seeds.
    ///
    /// # Arguments
    ///
    /// * `token` - access token from the code exchange
    /// * `seed_tracks` - comma separated track ids, at most five
    ///
    /// # Example
    ///
    /// ```
    /// let tracks = client.get_recommendations(&token, "4uLU6hMCjMI75M1A2tKUQC,7ouMYWpwJ422jRcDASZB7P").await?;
    /// ```
    pub(super) async fn get_recommendations(
        &self,
        token: &str,
        seed_tracks: &str,
    ) -> Result<Vec<Track>, SpotifyError> {
        // track ids are base62, the comma list goes on the wire as is
        let res = self
            .http
            .get(self.endpoint(&format!("/recommendations?seed_tracks={}", seed_tracks)))
            .header("Authorization", Self::bearer(token))
            .send()
            .await?;

        let recommendations: RecommendationsResponse = read_json(res).await?;
        Ok(recommendations.tracks)
    }
}
