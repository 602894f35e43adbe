use crate::{
    error::Error,
    spotify::gateway::Gateway,
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatedPlaylist,
        PlaylistDetails, PlaylistEntry, PlaylistTracksResponse,
    },
};

/// Spotify caps a single append call at 100 URIs.
pub const ADD_TRACKS_CHUNK_SIZE: usize = 100;

/// Fetches playlist metadata (name, description, cover images). A 404 from
/// the catalog is translated to `SourceNotFound` since the only playlists we
/// fetch by id are transformation sources.
pub async fn get_playlist(gateway: &Gateway, playlist_id: &str) -> Result<PlaylistDetails, Error> {
    gateway
        .get_json(&format!("/playlists/{playlist_id}"))
        .await
        .map_err(|e| e.into_source_not_found(playlist_id))
}

/// Enumerates the playlist's track entries, following `next` pages until the
/// catalog reports the end of the list.
pub async fn get_playlist_tracks(
    gateway: &Gateway,
    playlist_id: &str,
) -> Result<Vec<PlaylistEntry>, Error> {
    let mut entries = Vec::new();
    let mut path = format!("/playlists/{playlist_id}/tracks?limit=100");

    loop {
        let page: PlaylistTracksResponse = gateway
            .get_json(&path)
            .await
            .map_err(|e| e.into_source_not_found(playlist_id))?;
        entries.extend(page.items);

        match page.next {
            // `next` is an absolute URL; only the path and query matter to
            // the gateway, which owns the base URL.
            Some(next) => match path_and_query(&next) {
                Some(rest) => path = rest,
                None => break,
            },
            None => break,
        }
    }

    Ok(entries)
}

/// Creates an empty playlist for the given user.
pub async fn create_playlist(
    gateway: &Gateway,
    user_id: &str,
    request: &CreatePlaylistRequest,
) -> Result<CreatedPlaylist, Error> {
    gateway
        .post_json(&format!("/users/{user_id}/playlists"), request)
        .await
}

/// Appends a batch of track URIs. Callers are responsible for chunking to
/// [`ADD_TRACKS_CHUNK_SIZE`]; the returned snapshot id identifies the
/// playlist revision after the append.
pub async fn add_tracks(
    gateway: &Gateway,
    playlist_id: &str,
    uris: Vec<String>,
) -> Result<AddTracksResponse, Error> {
    let request = AddTracksRequest { uris };
    gateway
        .post_json(&format!("/playlists/{playlist_id}/tracks"), &request)
        .await
}

/// Uploads base64-encoded cover art. The body is the raw encoded string, not
/// JSON.
pub async fn upload_cover_image(
    gateway: &Gateway,
    playlist_id: &str,
    base64_image: String,
) -> Result<(), Error> {
    gateway
        .put_raw(
            &format!("/playlists/{playlist_id}/images"),
            base64_image,
            "image/png",
        )
        .await
}

fn path_and_query(url: &str) -> Option<String> {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest)?;
    after_scheme.find('/').map(|idx| {
        let full = &after_scheme[idx..];
        // Strip the API version prefix; the gateway base URL carries it.
        full.strip_prefix("/v1").unwrap_or(full).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::path_and_query;

    #[test]
    fn strips_host_and_version_prefix() {
        assert_eq!(
            path_and_query("https://api.spotify.com/v1/playlists/abc/tracks?offset=100&limit=100"),
            Some("/playlists/abc/tracks?offset=100&limit=100".to_string())
        );
    }

    #[test]
    fn keeps_unversioned_paths() {
        assert_eq!(
            path_and_query("http://127.0.0.1:4545/playlists/abc/tracks?offset=1"),
            Some("/playlists/abc/tracks?offset=1".to_string())
        );
    }
}
