//! tubecomments - Video comment crawler
//!
//! Loads each video page's lazily rendered comment list with an adaptive
//! scroll controller, extracts typed comment records and writes one dataset
//! per run, with a checkpoint after every video.
//!
//! # Architecture
//!
//! - [`config`] - Static configuration bundle and validation
//! - [`crawler`] - Rendering surface contract, scroll controller, run orchestrator
//! - [`parser`] - Count parsing, locators and comment extraction
//! - [`filter`] - Declared-metric bounds applied before any rendering
//! - [`models`] - Core data structures and types
//! - [`storage`] - Input/output CSV and checkpoint persistence
//! - [`metrics`] - Prometheus counters and histograms
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use tubecomments::config::Config;
//! use tubecomments::crawler::{run_session, ChromeSurface};
//! use tubecomments::filter::filter;
//! use tubecomments::storage::load_videos;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let videos = load_videos("videos.csv".as_ref())?;
//!     let (videos, _report) = filter(videos, &config.filter);
//!
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!     let surface = ChromeSurface::launch(&config.browser).await?;
//!     let progress = run_session(&surface, &config, &videos, shutdown).await;
//!     println!("{} comments", progress.total_comments());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, FilterBounds, ScrollConfig};
    pub use crate::crawler::{load_comments, run_session, RenderSurface, ScrollReport, Terminal};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::filter::{filter, FilterReport};
    pub use crate::models::{CommentContent, CommentRecord, RunProgress, RunSummary, VideoMetadata};
    pub use crate::parser::{parse_count, parse_reply_count};
}

pub use models::{CommentRecord, RunProgress, VideoMetadata};
