use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use tubecomments::config::Config;
use tubecomments::filter::filter;
use tubecomments::models::{RunProgress, RunSummary, VideoMetadata};
use tubecomments::storage::{load_videos, output_path, write_comments};

/// Scrape comments for every video in `input` that passes the filter
pub async fn scrape(config: Config, input: PathBuf, shutdown: watch::Receiver<bool>) -> Result<()> {
    println!("Starting Comment Scrape");
    println!("=======================");
    println!("Input: {}", input.display());

    let videos = load_videos(&input)?;
    let loaded = videos.len();
    let (videos, report) = filter(videos, &config.filter);

    for removal in &report.removals {
        println!("  {}: removed {}", removal.criterion, removal.removed);
    }
    println!("After filtering: {} videos (removed {})", report.kept, loaded - report.kept);

    if videos.is_empty() {
        tracing::warn!("No videos left after filtering, nothing to scrape");
        print_summary(&RunSummary::default(), None);
        return Ok(());
    }

    let progress = crawl(&config, &videos, shutdown).await?;

    let output = if progress.accumulated_records.is_empty() {
        tracing::warn!("No comments to save");
        None
    } else {
        let path = output_path(&config.run.output_dir, &chrono::Local::now());
        write_comments(&path, &progress.accumulated_records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path)
    };

    if let Some(path) = &config.run.metrics_path {
        if let Err(e) = tubecomments::metrics::dump_metrics(path) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to write metrics");
        }
    }

    print_summary(&RunSummary::from_progress(&progress), output.as_deref());
    Ok(())
}

#[cfg(feature = "browser")]
async fn crawl(
    config: &Config,
    videos: &[VideoMetadata],
    shutdown: watch::Receiver<bool>,
) -> Result<RunProgress> {
    use tubecomments::crawler::{run_session, ChromeSurface};

    let surface = ChromeSurface::launch(&config.browser).await?;
    Ok(run_session(&surface, config, videos, shutdown).await)
}

#[cfg(not(feature = "browser"))]
async fn crawl(
    _config: &Config,
    _videos: &[VideoMetadata],
    _shutdown: watch::Receiver<bool>,
) -> Result<RunProgress> {
    Err(tubecomments::error::Error::setup(
        "Browser support not compiled. Rebuild with: cargo build --features browser",
    )
    .into())
}

fn print_summary(summary: &RunSummary, output: Option<&Path>) {
    println!("\nScrape Summary");
    println!("==============");
    if let Some(path) = output {
        println!("Output file: {}", path.display());
    }
    println!("Total comments: {}", summary.total_comments);
    println!("Videos with comments: {}", summary.videos_with_comments);
    println!("Processed videos: {}", summary.processed_videos);
    println!("Failed videos: {}", summary.failed_videos);
    println!("Unique authors: {}", summary.unique_authors);
    println!("Total upvotes: {}", summary.total_upvotes);
    println!("Comments with replies: {}", summary.comments_with_replies);
    if let Some(avg) = summary.average_per_video() {
        println!("Average comments per video: {avg:.1}");
    }
    if summary.interrupted {
        println!("Run was interrupted; accumulated comments were saved.");
    }
}
