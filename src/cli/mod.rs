//! Command-line entry points.
//!
//! Each submodule backs one subcommand of the binary: `auth` runs the OAuth
//! PKCE flow, `loify` drives the transformation pipeline for one playlist,
//! `logout` drops the persisted session. The functions here own all user
//! feedback; the library layers underneath return typed errors instead of
//! printing and exiting.

mod auth;
mod loify;
mod logout;

pub use auth::auth;
pub use loify::loify;
pub use logout::logout;
