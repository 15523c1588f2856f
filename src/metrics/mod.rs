//! Prometheus metrics for the comment crawler
//!
//! Tracks per-video outcomes, extracted comments, scroll controller terminal
//! states and iteration counts, and filter removals.
//!
//! # Usage
//!
//! The binary calls [`init_metrics`] once at startup. Until it has succeeded
//! every `record_*` function is a no-op.

use prometheus::{
    register_counter, register_counter_vec, register_histogram, register_histogram_vec, Counter,
    CounterVec, Encoder, Histogram, HistogramVec, TextEncoder,
};
use std::path::Path;
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

struct CrawlerMetrics {
    videos: CounterVec,
    comments_extracted: Counter,
    filter_removed: CounterVec,
    scroll_outcomes: CounterVec,
    scroll_iterations: Histogram,
    video_duration: HistogramVec,
}

static CRAWLER_METRICS: OnceLock<CrawlerMetrics> = OnceLock::new();

/// Set on the first registration attempt, successful or not
static REGISTRATION_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; later calls are no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = tubecomments::metrics::init_metrics() {
///     tracing::warn!("Metrics initialization failed: {e}");
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if REGISTRATION_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    REGISTRATION_ATTEMPTED.set(true).ok();

    let crawler = CrawlerMetrics {
        videos: register_counter_vec!(
            "tubecomments_videos_total",
            "Videos handled by outcome (scraped, empty, failed)",
            &["outcome"]
        )?,
        comments_extracted: register_counter!(
            "tubecomments_comments_extracted_total",
            "Total comment records extracted"
        )?,
        filter_removed: register_counter_vec!(
            "tubecomments_filter_removed_total",
            "Videos removed by the filter per criterion",
            &["criterion"]
        )?,
        scroll_outcomes: register_counter_vec!(
            "tubecomments_scroll_outcomes_total",
            "Scroll controller terminal states",
            &["terminal"]
        )?,
        scroll_iterations: register_histogram!(
            "tubecomments_scroll_iterations",
            "Advance iterations issued per video",
            vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
        )?,
        video_duration: register_histogram_vec!(
            "tubecomments_video_duration_seconds",
            "Time spent on one video in seconds",
            &["outcome"],
            vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]
        )?,
    };

    CRAWLER_METRICS
        .set(crawler)
        .map_err(|_| "Crawler metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    CRAWLER_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Default registry in the Prometheus text exposition format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Write the text exposition to `path`
pub fn dump_metrics(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = encode_metrics()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Record one video's outcome
pub fn record_video(outcome: &str, comments: usize, duration_secs: f64) {
    let Some(m) = CRAWLER_METRICS.get() else {
        return;
    };

    m.videos.with_label_values(&[outcome]).inc();
    m.video_duration
        .with_label_values(&[outcome])
        .observe(duration_secs);

    if comments > 0 {
        m.comments_extracted.inc_by(comments as f64);
    }
}

/// Record the scroll controller's result for one video
pub fn record_scroll(terminal: &str, iterations: u32) {
    if let Some(m) = CRAWLER_METRICS.get() {
        m.scroll_outcomes.with_label_values(&[terminal]).inc();
        m.scroll_iterations.observe(f64::from(iterations));
    }
}

/// Record filter removals for one criterion
pub fn record_filter_removed(criterion: &str, removed: usize) {
    if removed == 0 {
        return;
    }
    if let Some(m) = CRAWLER_METRICS.get() {
        m.filter_removed
            .with_label_values(&[criterion])
            .inc_by(removed as f64);
    }
}

// ============================================================================
// Tests
// ============================================================================
