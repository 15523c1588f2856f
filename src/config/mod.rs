//! Configuration management for the tubecomments crawler
//!
//! Configuration is a static bundle loaded once at startup, either from defaults
//! with environment overrides or from a TOML file. Defaults mirror the values the
//! scraper has been tuned with in production.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
///
/// Sections missing from a TOML file take their production defaults, including
/// the filter bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Adaptive scroll controller tuning
    pub scroll: ScrollConfig,

    /// Video inclusion bounds
    pub filter: FilterBounds,

    /// Browser launch settings
    pub browser: BrowserSettings,

    /// Per-run settings (waits, output, checkpoint)
    pub run: RunConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Tuning for the adaptive scroll controller
///
/// Thresholds here are heuristics; none of them is load-bearing on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Coarse advances issued before waiting for the comment region
    pub initial_advances: u32,
    pub initial_advance_px: i64,
    pub initial_advance_delay_ms: u64,

    /// Maximum wait for the comment region to appear
    pub region_wait_ms: u64,
    pub region_focus_delay_ms: u64,

    /// Outer bound on advance iterations, regardless of state
    pub max_attempts: u32,

    /// Settle delay after each advance step
    pub settle_delay_ms: u64,
    /// Observed count above which the settle delay is lengthened
    pub heavy_list_threshold: usize,
    pub heavy_list_extra_delay_ms: u64,

    /// Consecutive stalls tolerated before finalizing
    pub patience: u32,

    /// Recovery strategy only runs while the observed count is below this
    pub recovery_list_threshold: usize,

    /// Stall count at which the trailing-section probe starts
    pub trailing_probe_stalls: u32,
    /// Trailing-section probe only runs while the observed count is below this
    pub trailing_probe_list_threshold: usize,
    /// Trailing items required (strictly more than) to call it end-of-list
    pub trailing_min_items: usize,

    /// Last-resort advances made while finalizing
    pub final_attempts: u32,
    pub final_settle_delay_ms: u64,

    /// Pause between the sub-actions of one advance step
    pub step_pause_ms: u64,
    pub nudge_px: i64,
    pub advance_px: i64,
    pub fallback_px: i64,
    pub continuation_delay_ms: u64,

    /// Recovery strategy shape
    pub recovery_full_advances: u32,
    pub recovery_retreat_px: i64,
    pub recovery_readvance_px: i64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            initial_advances: 5,
            initial_advance_px: 500,
            initial_advance_delay_ms: 1000,
            region_wait_ms: 10_000,
            region_focus_delay_ms: 3000,
            max_attempts: 5000,
            settle_delay_ms: 2000,
            heavy_list_threshold: 100,
            heavy_list_extra_delay_ms: 1000,
            patience: 1,
            recovery_list_threshold: 50,
            trailing_probe_stalls: 15,
            trailing_probe_list_threshold: 100,
            trailing_min_items: 15,
            final_attempts: 3,
            final_settle_delay_ms: 4000,
            step_pause_ms: 1000,
            nudge_px: 800,
            advance_px: 1200,
            fallback_px: 800,
            continuation_delay_ms: 3000,
            recovery_full_advances: 2,
            recovery_retreat_px: 500,
            recovery_readvance_px: 1000,
        }
    }
}

impl ScrollConfig {
    /// Settle delay for the given observed count
    #[must_use]
    pub fn settle_delay(&self, observed: usize) -> Duration {
        let extra = if observed > self.heavy_list_threshold {
            self.heavy_list_extra_delay_ms
        } else {
            0
        };
        Duration::from_millis(self.settle_delay_ms + extra)
    }

    #[must_use]
    pub fn region_wait(&self) -> Duration {
        Duration::from_millis(self.region_wait_ms)
    }

    #[must_use]
    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }

    #[must_use]
    pub fn final_settle_delay(&self) -> Duration {
        Duration::from_millis(self.final_settle_delay_ms)
    }

    #[must_use]
    pub fn continuation_delay(&self) -> Duration {
        Duration::from_millis(self.continuation_delay_ms)
    }

    /// Same thresholds with every wait set to zero
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.initial_advance_delay_ms = 0;
        self.region_wait_ms = 0;
        self.region_focus_delay_ms = 0;
        self.settle_delay_ms = 0;
        self.heavy_list_extra_delay_ms = 0;
        self.final_settle_delay_ms = 0;
        self.step_pause_ms = 0;
        self.continuation_delay_ms = 0;
        self
    }
}

/// Inclusion bounds applied to each video's declared metrics
///
/// `None` disables a bound. A minimum of exactly zero is also disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBounds {
    pub min_comments: Option<u64>,
    pub max_comments: Option<u64>,
    pub min_likes: Option<u64>,
    pub max_likes: Option<u64>,
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
}

impl FilterBounds {
    /// Bounds used by the production scraper
    pub fn production() -> Self {
        Self {
            min_comments: Some(10),
            min_likes: Some(0),
            min_views: Some(500),
            ..Self::default()
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run in headless mode
    pub headless: bool,

    /// Explicit Chrome/Chromium executable; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,

    pub window_width: u32,
    pub window_height: u32,

    /// Skip image loading to save bandwidth
    pub disable_images: bool,

    /// Additional Chrome arguments
    pub chrome_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            window_width: 1920,
            window_height: 1080,
            disable_images: true,
            chrome_args: Vec::new(),
        }
    }
}

/// Per-run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Wait after navigation before checking the player
    pub page_load_wait_ms: u64,

    /// Maximum wait for the video player to appear
    pub availability_timeout_ms: u64,

    /// Delay between videos
    pub video_delay_ms: u64,

    /// Directory for the output dataset
    pub output_dir: PathBuf,

    /// Checkpoint file, overwritten after every video
    pub checkpoint_path: PathBuf,

    /// Prometheus text dump written at run end
    pub metrics_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_load_wait_ms: 3000,
            availability_timeout_ms: 10_000,
            video_delay_ms: 2000,
            output_dir: PathBuf::from("comments_data"),
            checkpoint_path: PathBuf::from("progress.json"),
            metrics_path: None,
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn page_load_wait(&self) -> Duration {
        Duration::from_millis(self.page_load_wait_ms)
    }

    #[must_use]
    pub fn availability_timeout(&self) -> Duration {
        Duration::from_millis(self.availability_timeout_ms)
    }

    #[must_use]
    pub fn video_delay(&self) -> Duration {
        Duration::from_millis(self.video_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Optional log file, written in addition to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            filter: FilterBounds::production(),
            browser: BrowserSettings::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(headless) = env_parse::<bool>("TUBECOMMENTS_HEADLESS") {
            config.browser.headless = headless;
        }
        if let Ok(path) = std::env::var("TUBECOMMENTS_CHROME") {
            config.browser.chrome_executable = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var("TUBECOMMENTS_OUTPUT_DIR") {
            config.run.output_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("TUBECOMMENTS_CHECKPOINT") {
            config.run.checkpoint_path = PathBuf::from(path);
        }
        if let Some(attempts) = env_parse::<u32>("TUBECOMMENTS_MAX_SCROLL_ATTEMPTS") {
            config.scroll.max_attempts = attempts;
        }
        if let Some(patience) = env_parse::<u32>("TUBECOMMENTS_PATIENCE") {
            config.scroll.patience = patience;
        }
        if let Ok(level) = std::env::var("TUBECOMMENTS_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("TUBECOMMENTS_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.run.availability_timeout_ms == 0 {
            errors.push("availability_timeout_ms must be > 0".into());
        }
        if self.run.page_load_wait_ms == 0 {
            errors.push("page_load_wait_ms must be > 0".into());
        }
        if self.scroll.max_attempts == 0 {
            errors.push("max_attempts must be > 0".into());
        }
        if self.scroll.settle_delay_ms == 0 {
            errors.push("settle_delay_ms must be > 0".into());
        }
        if self.scroll.patience == 0 {
            errors.push("patience must be > 0".into());
        }
        if self.scroll.max_attempts < self.scroll.patience {
            errors.push("max_attempts must be >= patience".into());
        }

        let f = &self.filter;
        for (name, min, max) in [
            ("comments", f.min_comments, f.max_comments),
            ("likes", f.min_likes, f.max_likes),
            ("views", f.min_views, f.max_views),
        ] {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    errors.push(format!("min_{name} ({min}) must not exceed max_{name} ({max})"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::config(errors.join("; ")))
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
