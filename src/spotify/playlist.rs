use crate::types::{
    AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
    CreatePlaylistResponse, GetUserPlaylistsResponse, Playlist,
};

use super::{SpotifyClient, SpotifyError, read_json};

impl SpotifyClient {
    /// First page of the current user's playlists.
    ///
    /// Used only to number the playlists created on one day, so a user with
    /// more playlists than fit on the first page may see a repeated number.
    pub(super) async fn get_my_playlists(&self, token: &str) -> Result<Vec<Playlist>, SpotifyError> {
        let res = self
            .http
            .get(self.endpoint("/me/playlists"))
            .header("Authorization", Self::bearer(token))
            .send()
            .await?;

        let playlists: GetUserPlaylistsResponse = read_json(res).await?;
        Ok(playlists.items)
    }

    /// Creates an empty playlist owned by `user_id`.
    ///
    /// # Arguments
    ///
    /// * `token` - access token with the `playlist-modify-public` scope
    /// * `user_id` - id from `/me`, percent-encoded into the path
    /// * `request` - name and visibility, sent as the JSON body
    ///
    /// # Returns
    ///
    /// The created playlist; its `id` is where the tracks go.
    pub(super) async fn post_playlist(
        &self,
        token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let res = self
            .http
            .post(self.endpoint(&format!(
                "/users/{}/playlists",
                urlencoding::encode(user_id)
            )))
            .header("Authorization", Self::bearer(token))
            .json(request)
            .send()
            .await?;

        read_json(res).await
    }

    /// Appends `uris` to the playlist in a single request.
    ///
    /// Spotify accepts up to 100 URIs per call, far more than a
    /// recommendation list holds.
    pub(super) async fn post_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let res = self
            .http
            .post(self.endpoint(&format!("/playlists/{}/tracks", playlist_id)))
            .header("Authorization", Self::bearer(token))
            .json(&body)
            .send()
            .await?;

        let _: AddTrackToPlaylistResponse = read_json(res).await?;
        Ok(())
    }
}
