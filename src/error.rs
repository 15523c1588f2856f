//! Unified error handling for the tubecomments crate
//!
//! Failures are classified by how far they are allowed to travel:
//!
//! - per-field extraction failures never leave [`crate::parser::extract`]
//! - per-step interaction failures are absorbed by the scroll controller
//! - per-video failures ([`Error::Availability`] and friends) are recorded by the
//!   orchestrator and the run continues
//! - setup, input and configuration failures abort the run
//!
//! # Usage
//!
//! ```rust,ignore
//! use tubecomments::error::{Error, ErrorCategory};
//!
//! fn handle(err: Error) {
//!     if err.is_fatal() {
//!         eprintln!("aborting: {err}");
//!     } else {
//!         tracing::warn!(category = ?err.category(), "skipping video: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::crawler::surface::SurfaceError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Target page or its content failed to load
    Availability,
    /// A rendering-surface interaction failed
    Interaction,
    /// The rendering capability could not be initialized
    Setup,
    /// Input file could not be read or parsed
    Input,
    /// Checkpoint, output or other I/O
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label used in log lines and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Interaction => "interaction",
            Self::Setup => "setup",
            Self::Input => "input",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the tubecomments crate
#[derive(Error, Debug)]
pub enum Error {
    /// The video page (or its player) did not load
    #[error("{reason}: {url}")]
    Availability { url: String, reason: String },

    /// Rendering surface interaction that could not be absorbed locally
    #[error("Interaction error: {0}")]
    Interaction(#[from] SurfaceError),

    /// Browser could not be launched or connected
    #[error("Setup error: {0}")]
    Setup(String),

    /// Input video list is missing or malformed
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML config parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create an availability error for a video URL
    pub fn unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Availability {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a setup error
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Availability { .. } => ErrorCategory::Availability,
            Self::Interaction(_) => ErrorCategory::Interaction,
            Self::Setup(_) => ErrorCategory::Setup,
            Self::Input(_) | Self::Csv(_) => ErrorCategory::Input,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Config(_) | Self::Toml(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Human-readable reason recorded for a failed video
    pub fn reason(&self) -> String {
        match self {
            Self::Availability { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error terminates the whole run rather than one video
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Setup | ErrorCategory::Input | ErrorCategory::Config
        )
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::unavailable("https://www.youtube.com/watch?v=abc", "Video unavailable");
        assert_eq!(err.category(), ErrorCategory::Availability);

        let err: Error = SurfaceError::Closed.into();
        assert_eq!(err.category(), ErrorCategory::Interaction);
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::setup("chrome not found").is_fatal());
        assert!(Error::input("missing file").is_fatal());
        assert!(Error::config("patience must be > 0").is_fatal());
        assert!(!Error::unavailable("u", "Video unavailable").is_fatal());
        assert!(!Error::other("boom").is_fatal());
    }

    #[test]
    fn test_availability_display() {
        let err = Error::unavailable("https://youtu.be/x", "Video unavailable");
        assert_eq!(err.to_string(), "Video unavailable: https://youtu.be/x");
        assert_eq!(err.reason(), "Video unavailable");
        assert_eq!(Error::setup("no chrome").reason(), "Setup error: no chrome");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let unified: Error = io_err.into();
        assert!(matches!(unified, Error::Io(_)));
        assert_eq!(unified.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ErrorCategory::Availability.as_str(), "availability");
        assert_eq!(ErrorCategory::Setup.as_str(), "setup");
    }
}
