//! # Spotify Integration Module
//!
//! The primary integration layer between loficli and the Spotify Web API.
//! All outbound calls funnel through [`gateway::Gateway`], which attaches
//! bearer authentication from the session store and transparently absorbs
//! the two transient failure classes the catalog produces: rate limiting
//! (429 with a `Retry-After` hint) and expired access tokens (401/403 with a
//! usable refresh token). Everything else surfaces as a typed error.
//!
//! ## Submodules
//!
//! - [`auth`] - OAuth 2.0 PKCE flow: browser launch, local callback, code
//!   exchange, token persistence
//! - [`gateway`] - rate-limit-aware HTTP calling convention
//! - [`me`] - current-user profile (`GET /me`)
//! - [`playlist`] - playlist fetch/create/append and cover upload
//! - [`search`] - free-text track resolution (`GET /search`)
//!
//! ## API coverage
//!
//! - `GET /me`
//! - `GET /playlists/{id}`
//! - `GET /playlists/{id}/tracks`
//! - `POST /users/{id}/playlists`
//! - `PUT /playlists/{id}/images`
//! - `POST /playlists/{id}/tracks`
//! - `GET /search?q=...&type=track&limit=1`
//! - `POST <token endpoint>` (code exchange and refresh)

pub mod auth;
pub mod gateway;
pub mod me;
pub mod playlist;
pub mod search;
