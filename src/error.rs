//! Error taxonomy for the transformation pipeline.
//!
//! Token and network transients are resolved inside the gateway and session
//! layers; everything that escapes them is one of the variants below. The
//! orchestrator aborts only on `SourceNotFound` and destination-creation
//! failures — cover art and per-track search failures degrade instead of
//! propagating.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No live session for the current principal. The user has to run
    /// `loficli auth` before anything else works.
    #[error("not authenticated - run `loficli auth` first")]
    Unauthenticated,

    /// A refresh was requested but the stored session carries no refresh
    /// token. Fails fast instead of attempting a doomed exchange.
    #[error("session has no refresh token")]
    NoRefreshToken,

    /// The refresh-token exchange itself failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// The catalog answered with a non-2xx status that the gateway does not
    /// retry. These are caller/data errors; masking them would hide bugs.
    #[error("catalog returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Connection-level failure before any HTTP status was produced.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The source playlist does not exist; there is nothing to transform.
    #[error("source playlist `{0}` not found")]
    SourceNotFound(String),

    /// Cover art could not be fetched, decoded or re-encoded. Recoverable:
    /// the orchestrator substitutes the built-in default cover.
    #[error("cover art: {0}")]
    Image(String),

    /// The caller-supplied deadline elapsed before the pipeline finished.
    #[error("operation cancelled after {0} seconds")]
    Cancelled(u64),

    #[error("configuration: {0}")]
    Config(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl Error {
    /// Status-driven helper used by the playlist fetch phase: a 404 from the
    /// catalog on the source playlist becomes `SourceNotFound`, everything
    /// else keeps its upstream shape.
    pub fn into_source_not_found(self, playlist_id: &str) -> Self {
        match self {
            Error::Upstream { status: 404, .. } => {
                Error::SourceNotFound(playlist_id.to_string())
            }
            other => other,
        }
    }
}
