//! The playlist transformation state machine.
//!
//! One request walks `FetchSource → CreateDestination → SetCoverArt →
//! SearchTracks → AppendTracks → Done`; unrecoverable failures abort the walk
//! with a typed error naming the phase that gave up. The policy split is
//! deliberate: missing source or failed destination creation aborts (nothing
//! has been mutated upstream yet), while cover art and per-track search
//! failures only degrade the result. Atomicity between destination creation
//! and the append is not guaranteed — a crash in between leaves an empty
//! destination playlist behind.

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::sync::Semaphore;

use crate::{
    cover,
    error::Error,
    info,
    spotify::{self, gateway::Gateway, playlist::ADD_TRACKS_CHUNK_SIZE},
    transform,
    types::{CreatePlaylistRequest, CreatedPlaylist, PlaylistDetails, TrackObject},
    warning,
};

/// Default bound on simultaneous in-flight search requests. Small on purpose:
/// the fan-out shares one upstream rate-limit budget.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Pure configuration carried through the pipeline.
#[derive(Debug, Clone)]
pub struct TransformSpec {
    /// Style tag appended to every search query and embedded in the
    /// destination playlist's name and description.
    pub style: String,
    pub public: bool,
}

impl Default for TransformSpec {
    fn default() -> Self {
        TransformSpec {
            style: "lofi".to_string(),
            public: true,
        }
    }
}

/// Result of resolving one transformed query against the catalog.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(TrackObject),
    NotFound,
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStatus {
    /// Source cover fetched, recolored and uploaded.
    Recolored,
    /// Built-in default uploaded because the source had no cover or the
    /// recoloring failed.
    DefaultFallback,
}

/// What the caller gets back from a completed run: the created playlist plus
/// the degradation tally.
#[derive(Debug, Clone)]
pub struct LoifyReport {
    pub playlist: CreatedPlaylist,
    pub matched: usize,
    pub unmatched: usize,
    pub cover: CoverStatus,
}

struct SourcePlaylist {
    details: PlaylistDetails,
    tracks: Vec<TrackObject>,
}

enum Phase {
    FetchSource {
        playlist_id: String,
    },
    CreateDestination {
        source: SourcePlaylist,
    },
    SetCoverArt {
        source: SourcePlaylist,
        destination: CreatedPlaylist,
    },
    SearchTracks {
        tracks: Vec<TrackObject>,
        destination: CreatedPlaylist,
        cover: CoverStatus,
    },
    AppendTracks {
        outcomes: Vec<SearchOutcome>,
        destination: CreatedPlaylist,
        cover: CoverStatus,
    },
    Done(LoifyReport),
}

pub struct Pipeline {
    gateway: Gateway,
    http: Client,
    spec: TransformSpec,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl Pipeline {
    pub fn new(gateway: Gateway, spec: TransformSpec) -> Self {
        Pipeline {
            gateway,
            http: Client::new(),
            spec,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Caps the whole operation. On expiry the run stops dispatching work and
    /// returns `Error::Cancelled`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the state machine to completion for one source playlist.
    pub async fn run(&self, playlist_id: &str) -> Result<LoifyReport, Error> {
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, self.run_phases(playlist_id))
                .await
                .map_err(|_| Error::Cancelled(limit.as_secs()))?,
            None => self.run_phases(playlist_id).await,
        }
    }

    async fn run_phases(&self, playlist_id: &str) -> Result<LoifyReport, Error> {
        let mut phase = Phase::FetchSource {
            playlist_id: playlist_id.to_string(),
        };
        loop {
            phase = self.step(phase).await?;
            if let Phase::Done(report) = phase {
                return Ok(report);
            }
        }
    }

    async fn step(&self, phase: Phase) -> Result<Phase, Error> {
        match phase {
            Phase::FetchSource { playlist_id } => {
                let source = self.fetch_source(&playlist_id).await?;
                Ok(Phase::CreateDestination { source })
            }
            Phase::CreateDestination { source } => {
                let destination = self.create_destination(&source).await?;
                Ok(Phase::SetCoverArt {
                    source,
                    destination,
                })
            }
            Phase::SetCoverArt {
                source,
                destination,
            } => {
                let cover = self.set_cover_art(&source, &destination).await;
                Ok(Phase::SearchTracks {
                    tracks: source.tracks,
                    destination,
                    cover,
                })
            }
            Phase::SearchTracks {
                tracks,
                destination,
                cover,
            } => {
                let outcomes = self.search_tracks(tracks).await;
                Ok(Phase::AppendTracks {
                    outcomes,
                    destination,
                    cover,
                })
            }
            Phase::AppendTracks {
                outcomes,
                destination,
                cover,
            } => {
                let report = self.append_tracks(outcomes, destination, cover).await?;
                Ok(Phase::Done(report))
            }
            done @ Phase::Done(_) => Ok(done),
        }
    }

    async fn fetch_source(&self, playlist_id: &str) -> Result<SourcePlaylist, Error> {
        info!("Fetching source playlist {}...", playlist_id);
        let details = spotify::playlist::get_playlist(&self.gateway, playlist_id).await?;
        let entries = spotify::playlist::get_playlist_tracks(&self.gateway, playlist_id).await?;
        let tracks = entries.into_iter().map(|entry| entry.track).collect();
        Ok(SourcePlaylist { details, tracks })
    }

    async fn create_destination(&self, source: &SourcePlaylist) -> Result<CreatedPlaylist, Error> {
        let user = spotify::me::current_user(&self.gateway).await?;
        let request = CreatePlaylistRequest {
            name: transform::playlist_name(&source.details.name, &self.spec.style),
            description: transform::playlist_description(&source.details.name, &self.spec.style),
            public: self.spec.public,
            collaborative: false,
        };

        info!("Creating playlist \"{}\"...", request.name);
        spotify::playlist::create_playlist(&self.gateway, &user.id, &request).await
    }

    /// Never aborts the pipeline: any failure along fetch, recolor or upload
    /// degrades to the built-in default cover, and even a failed default
    /// upload only costs the playlist its custom art.
    async fn set_cover_art(
        &self,
        source: &SourcePlaylist,
        destination: &CreatedPlaylist,
    ) -> CoverStatus {
        let recolored = match source.details.cover_url() {
            Some(url) => match cover::recolor(&self.http, url).await {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    warning!("Cover recoloring failed, using default cover: {}", e);
                    None
                }
            },
            None => {
                info!("Source playlist has no cover image, using default cover");
                None
            }
        };

        let (encoded, status) = match recolored {
            Some(encoded) => (encoded, CoverStatus::Recolored),
            None => (
                cover::default_cover().to_string(),
                CoverStatus::DefaultFallback,
            ),
        };

        match spotify::playlist::upload_cover_image(&self.gateway, &destination.id, encoded).await {
            Ok(()) => status,
            Err(e) => {
                warning!("Cover upload failed: {}", e);
                CoverStatus::DefaultFallback
            }
        }
    }

    /// Fans the transformed queries out with a bounded number of in-flight
    /// requests and fans back in, re-sorting by source position so the result
    /// is deterministic for deterministic responses. Each search is
    /// best-effort: misses and errors become outcomes, never aborts.
    async fn search_tracks(&self, tracks: Vec<TrackObject>) -> Vec<SearchOutcome> {
        let total = tracks.len();
        info!("Searching {} styled track(s)...", total);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        for (index, track) in tracks.into_iter().enumerate() {
            let gateway = self.gateway.clone();
            let query = transform::track_query(&track.name, &self.spec.style);
            let limiter = Arc::clone(&limiter);
            let bar = bar.clone();

            handles.push(tokio::spawn(async move {
                // Closing the semaphore is not part of this design; acquire
                // can only fail then, so treat it as an errored search.
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (index, SearchOutcome::Errored(e.to_string())),
                };

                let outcome = match spotify::search::first_track_match(&gateway, &query).await {
                    Ok(Some(found)) => SearchOutcome::Found(found),
                    Ok(None) => SearchOutcome::NotFound,
                    Err(e) => SearchOutcome::Errored(e.to_string()),
                };
                bar.inc(1);
                (index, outcome)
            }));
        }

        let mut indexed = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(result) => indexed.push(result),
                Err(e) => {
                    warning!("Search task join error: {}", e);
                }
            }
        }
        bar.finish_and_clear();

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn append_tracks(
        &self,
        outcomes: Vec<SearchOutcome>,
        destination: CreatedPlaylist,
        cover: CoverStatus,
    ) -> Result<LoifyReport, Error> {
        let total = outcomes.len();
        let uris: Vec<String> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                SearchOutcome::Found(track) => Some(track.uri.clone()),
                SearchOutcome::NotFound | SearchOutcome::Errored(_) => None,
            })
            .collect();

        let matched = uris.len();
        let unmatched = total - matched;

        if uris.is_empty() {
            // An empty but valid styled playlist is the defined outcome for
            // "no track matched".
            warning!("No tracks matched; the new playlist stays empty");
        } else {
            info!("Adding {} track(s) to the new playlist...", matched);
            for chunk in uris.chunks(ADD_TRACKS_CHUNK_SIZE) {
                spotify::playlist::add_tracks(&self.gateway, &destination.id, chunk.to_vec())
                    .await?;
            }
        }

        Ok(LoifyReport {
            playlist: destination,
            matched,
            unmatched,
            cover,
        })
    }
}
