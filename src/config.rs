//! Configuration management for loficli.
//!
//! Configuration values come from environment variables, optionally seeded
//! from a `.env` file in the platform-specific local data directory
//! (`loficli/.env`). Credentials have no defaults and must be set; the public
//! Spotify endpoint URLs fall back to their well-known values so a fresh
//! install only has to provide client id, secret and redirect URI.

use std::{env, path::PathBuf};

/// Loads environment variables from `loficli/.env` in the local data
/// directory, creating the directory first if necessary. A missing file is
/// not an error — the process environment may already carry everything.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("loficli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Bind address for the local OAuth callback server, e.g. `127.0.0.1:8080`.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

/// Spotify application client id.
///
/// # Panics
///
/// Panics if `SPOTIFY_API_AUTH_CLIENT_ID` is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Spotify application client secret, used as basic-auth credentials on the
/// refresh-token exchange. Keep it out of logs and version control.
///
/// # Panics
///
/// Panics if `SPOTIFY_API_AUTH_CLIENT_SECRET` is not set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// OAuth redirect URI; must match the URI registered with the Spotify app.
///
/// # Panics
///
/// Panics if `SPOTIFY_API_REDIRECT_URI` is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Scopes requested during authorization. The default covers reading the
/// source playlist and creating/decorating the destination playlist.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| {
        "playlist-read-private playlist-modify-public playlist-modify-private ugc-image-upload"
            .to_string()
    })
}

/// Spotify OAuth authorization endpoint.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Spotify Web API base URL (no trailing slash).
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Spotify OAuth token endpoint, used for both the PKCE code exchange and
/// refresh-token exchanges.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}
