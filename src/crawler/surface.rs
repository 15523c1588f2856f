//! Rendering capability contract
//!
//! The crawler core talks to the browser only through [`RenderSurface`]. A
//! surface owns one page; node handles are only meaningful on the surface that
//! produced them and may go stale as the page re-renders.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single surface interaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("timed out after {elapsed:?} waiting for {locator}")]
    Timeout { locator: String, elapsed: Duration },

    #[error("element not found: {0}")]
    NotFound(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("surface closed")]
    Closed,
}

impl SurfaceError {
    pub fn script(msg: impl ToString) -> Self {
        Self::Script(msg.to_string())
    }

    pub fn navigation(msg: impl ToString) -> Self {
        Self::Navigation(msg.to_string())
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A page the crawler can drive
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Handle to a rendered element
    type Node: Send + Sync;

    /// Load `url` in the page
    async fn navigate(&self, url: &str) -> SurfaceResult<()>;

    /// All elements matching `locator`, in document order
    async fn query_all(&self, locator: &str) -> SurfaceResult<Vec<Self::Node>>;

    /// Poll until an element matching `locator` exists or `timeout` passes
    async fn wait_until_present(&self, locator: &str, timeout: Duration)
        -> SurfaceResult<Self::Node>;

    async fn click(&self, node: &Self::Node) -> SurfaceResult<()>;

    async fn is_displayed(&self, node: &Self::Node) -> SurfaceResult<bool>;

    async fn scroll_into_view(&self, node: &Self::Node) -> SurfaceResult<()>;

    /// Scroll the viewport vertically by `px` (negative scrolls up)
    async fn scroll_by(&self, px: i64) -> SurfaceResult<()>;

    /// Scroll the viewport to the bottom of the document
    async fn scroll_to_bottom(&self) -> SurfaceResult<()>;

    /// Bottom edge of `node`'s bounding box relative to the viewport top
    ///
    /// Negative when the element lies entirely above the viewport.
    async fn bottom_edge(&self, node: &Self::Node) -> SurfaceResult<f64>;

    /// Number of elements matching `locator`
    async fn count(&self, locator: &str) -> SurfaceResult<usize> {
        Ok(self.query_all(locator).await?.len())
    }

    /// Serialized DOM of the current page
    async fn content(&self) -> SurfaceResult<String>;

    /// Release the page and its browser
    async fn close(&self) -> SurfaceResult<()>;
}
