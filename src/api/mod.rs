//! HTTP endpoints for the local OAuth callback server.
//!
//! Two routes only: [`callback`] completes the PKCE code exchange when
//! Spotify redirects back with an authorization code, and [`health`] lets
//! the auth flow (or a curious user) verify the temporary server is up.
//! Everything here is thin plumbing around [`crate::spotify::auth`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
