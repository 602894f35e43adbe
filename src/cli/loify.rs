use std::time::Duration;

use crate::{
    error, info,
    management::TokenManager,
    pipeline::{CoverStatus, Pipeline, TransformSpec},
    spotify::gateway::Gateway,
    success, warning,
};

pub async fn loify(
    playlist_id: String,
    style: String,
    concurrency: usize,
    timeout_secs: Option<u64>,
    private: bool,
) {
    let tokens = match TokenManager::load().await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("No session found. Please run loficli auth\n Error: {}", e);
        }
    };

    let gateway = Gateway::from_config(tokens);
    let spec = TransformSpec {
        style,
        public: !private,
    };

    let pipeline = Pipeline::new(gateway, spec)
        .with_concurrency(concurrency)
        .with_deadline(timeout_secs.map(Duration::from_secs));

    match pipeline.run(&playlist_id).await {
        Ok(report) => {
            success!(
                "Created playlist \"{}\" with {} track(s)",
                report.playlist.name,
                report.matched
            );
            if report.unmatched > 0 {
                warning!("{} track(s) could not be matched", report.unmatched);
            }
            if report.cover == CoverStatus::DefaultFallback {
                warning!("Cover art fell back to the built-in default image");
            }
            if let Some(href) = &report.playlist.href {
                info!("Playlist URL: {}", href);
            } else {
                info!("Playlist id: {}", report.playlist.id);
            }
        }
        Err(e) => {
            error!("Failed to loify playlist: {}", e);
        }
    }
}
