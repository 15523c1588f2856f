//! Run orchestrator
//!
//! Videos are processed strictly one after another on a single surface:
//! availability check, comment loading, extraction, accumulation and a
//! checkpoint save. Per-video failures are recorded and the run continues.
//! A shutdown signal stops the run between or during videos; the video in
//! flight at that moment is discarded.

use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::config::Config;
use crate::crawler::scroll::{load_comments, ScrollReport};
use crate::crawler::surface::RenderSurface;
use crate::error::{Error, Result};
use crate::models::{CommentRecord, RunProgress, VideoMetadata};
use crate::parser::{css, extract_from_html};
use crate::storage::checkpoint::CheckpointManager;
use crate::utils::{extract_video_id, truncate_text};

/// What happened to one video that did not fail
#[derive(Debug)]
pub enum VideoOutcome {
    Scraped(Vec<CommentRecord>),
    /// Comment list never produced a comment; not a failure
    NoComments(ScrollReport),
}

pub struct Orchestrator<'a, S: RenderSurface> {
    surface: &'a S,
    config: &'a Config,
    checkpoint: CheckpointManager,
}

impl<'a, S: RenderSurface> Orchestrator<'a, S> {
    pub fn new(surface: &'a S, config: &'a Config) -> Self {
        Self {
            surface,
            config,
            checkpoint: CheckpointManager::new(&config.run.checkpoint_path),
        }
    }

    /// Process every video in order and return the accumulated progress
    ///
    /// Stops early once `shutdown` carries `true`.
    pub async fn run(
        &self,
        videos: &[VideoMetadata],
        mut shutdown: watch::Receiver<bool>,
    ) -> RunProgress {
        let mut progress = RunProgress::new();
        let total = videos.len();

        for (index, video) in videos.iter().enumerate() {
            if *shutdown.borrow() {
                progress.interrupted = true;
                break;
            }

            let url = video.url.trim();
            let video_id = extract_video_id(url);
            tracing::info!(
                video = %video_id,
                title = %truncate_text(&video.title, 50),
                index = index + 1,
                total,
                "Processing video"
            );

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!(video = %video_id, "Interrupted by user, discarding current video");
                    progress.interrupted = true;
                    break;
                }
                result = self.process_video(video, url) => result,
            };
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(VideoOutcome::Scraped(records)) => {
                    let count = records.len();
                    crate::metrics::record_video("scraped", count, elapsed);
                    progress.record_success(url, records);
                    tracing::info!(
                        video = %video_id,
                        added = count,
                        total = progress.total_comments(),
                        "Added comments"
                    );
                }
                Ok(VideoOutcome::NoComments(report)) => {
                    crate::metrics::record_video("empty", 0, elapsed);
                    tracing::warn!(
                        video = %video_id,
                        region_found = report.region_found,
                        "Could not load comments, skipping"
                    );
                }
                Err(e) => {
                    crate::metrics::record_video("failed", 0, elapsed);
                    tracing::warn!(
                        video = %video_id,
                        category = e.category().as_str(),
                        error = %e,
                        "Video failed"
                    );
                    progress.record_failure(url, e.reason());
                }
            }

            self.save_checkpoint(&progress);

            if index + 1 < total && interruptible_sleep(self.config.run.video_delay(), &mut shutdown).await {
                progress.interrupted = true;
                break;
            }
        }

        if progress.interrupted {
            tracing::info!(
                processed = progress.processed_video_urls.len(),
                "Run interrupted, keeping accumulated comments"
            );
        }

        progress
    }

    /// Availability, loading and extraction for one video
    pub async fn process_video(&self, video: &VideoMetadata, url: &str) -> Result<VideoOutcome> {
        self.check_availability(url).await?;

        let report = load_comments(self.surface, &self.config.scroll).await;
        crate::metrics::record_scroll(report.terminal.as_str(), report.attempts);

        if report.final_count == 0 {
            return Ok(VideoOutcome::NoComments(report));
        }

        let html = self.surface.content().await?;
        let records = extract_from_html(&html, video, url);
        tracing::info!(
            loaded = report.final_count,
            extracted = records.len(),
            "Extracted comments"
        );

        if records.is_empty() {
            Ok(VideoOutcome::NoComments(report))
        } else {
            Ok(VideoOutcome::Scraped(records))
        }
    }

    /// Load the page and wait for the player
    async fn check_availability(&self, url: &str) -> Result<()> {
        let run = &self.config.run;

        if let Err(e) = self.surface.navigate(url).await {
            tracing::debug!(error = %e, "Navigation failed");
            return Err(Error::unavailable(url, "Video unavailable"));
        }
        tokio::time::sleep(run.page_load_wait()).await;

        match self
            .surface
            .wait_until_present(css::VIDEO_PLAYER, run.availability_timeout())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "Video player did not appear");
                Err(Error::unavailable(url, "Video unavailable"))
            }
        }
    }

    /// Save a snapshot; a failed save is logged and the run goes on
    pub fn save_checkpoint(&self, progress: &RunProgress) {
        if let Err(e) = self.checkpoint.save(&progress.snapshot()) {
            tracing::warn!(error = %e, "Failed to save checkpoint");
        }
    }
}

/// Run every video on `surface`, save a final checkpoint and release the surface
///
/// The surface is closed on every path out of the run, including interruption
/// and an empty video list.
pub async fn run_session<S: RenderSurface>(
    surface: &S,
    config: &Config,
    videos: &[VideoMetadata],
    shutdown: watch::Receiver<bool>,
) -> RunProgress {
    let orchestrator = Orchestrator::new(surface, config);
    let progress = orchestrator.run(videos, shutdown).await;
    orchestrator.save_checkpoint(&progress);

    if let Err(e) = surface.close().await {
        tracing::warn!(error = %e, "Failed to close rendering surface");
    }
    progress
}

/// Resolves once the channel carries `true`; never resolves if the sender is gone
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sleep for `duration`; true when interrupted by shutdown
async fn interruptible_sleep(duration: Duration, rx: &mut watch::Receiver<bool>) -> bool {
    if duration.is_zero() {
        return *rx.borrow();
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown_requested(rx) => true,
    }
}
