//! Common test utilities
//!
//! `FakeSurface` is a scripted rendering surface: every count of comment
//! threads returns the next value of the current page's schedule, repeating
//! the last value once the schedule runs out.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

use tubecomments::config::Config;
use tubecomments::crawler::surface::{RenderSurface, SurfaceError, SurfaceResult};
use tubecomments::models::VideoMetadata;
use tubecomments::parser::css;

// ============================================================================
// Scripted pages
// ============================================================================

/// Behaviour of one fake video page
#[derive(Debug, Clone)]
pub struct FakePage {
    /// Player appears (page available)
    pub available: bool,
    /// Comment region appears
    pub region_present: bool,
    /// Thread count returned by successive count queries
    pub schedule: Vec<usize>,
    /// Related sidebar items rendered
    pub related_items: usize,
    /// A visible continuation affordance is rendered
    pub continuation: bool,
    /// Viewport interactions fail
    pub interactions_fail: bool,
}

impl FakePage {
    pub fn with_schedule(schedule: Vec<usize>) -> Self {
        Self {
            available: true,
            region_present: true,
            schedule,
            related_items: 0,
            continuation: false,
            interactions_fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_schedule(vec![0])
        }
    }

    pub fn without_region() -> Self {
        Self {
            region_present: false,
            ..Self::with_schedule(vec![0])
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode {
    pub locator: String,
    pub index: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    current: Option<String>,
    count_queries: usize,
    last_count: usize,
    navigations: Vec<String>,
    content_calls: usize,
    clicks: usize,
    scrolls_to_bottom: usize,
    closed: bool,
}

/// Scripted [`RenderSurface`] keyed by URL
#[derive(Default)]
pub struct FakeSurface {
    pages: HashMap<String, FakePage>,
    state: Mutex<FakeState>,
    /// Fires when this URL is navigated to
    interrupt_on: Option<(String, watch::Sender<bool>)>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface already showing one page, for driving the controller directly
    pub fn showing(page: FakePage) -> Self {
        let surface = Self::new().with_page("https://www.youtube.com/watch?v=current", page);
        surface.state.lock().unwrap().current = Some("https://www.youtube.com/watch?v=current".into());
        surface
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn interrupt_on(mut self, url: &str, tx: watch::Sender<bool>) -> Self {
        self.interrupt_on = Some((url.to_string(), tx));
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn content_calls(&self) -> usize {
        self.state.lock().unwrap().content_calls
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn scrolls_to_bottom(&self) -> usize {
        self.state.lock().unwrap().scrolls_to_bottom
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn page(&self) -> SurfaceResult<FakePage> {
        let state = self.state.lock().unwrap();
        if state.closed {
            return Err(SurfaceError::Closed);
        }
        state
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| SurfaceError::NotFound("no page loaded".into()))
    }

    fn interaction(&self) -> SurfaceResult<()> {
        if self.page()?.interactions_fail {
            Err(SurfaceError::script("scripted interaction failure"))
        } else {
            Ok(())
        }
    }

    fn nodes(locator: &str, n: usize) -> Vec<FakeNode> {
        (0..n)
            .map(|index| FakeNode {
                locator: locator.to_string(),
                index,
            })
            .collect()
    }
}

#[async_trait]
impl RenderSurface for FakeSurface {
    type Node = FakeNode;

    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        if let Some((target, tx)) = &self.interrupt_on {
            if target == url {
                let _ = tx.send(true);
            }
        }

        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(SurfaceError::navigation(format!("unknown url {url}")));
        }
        state.current = Some(url.to_string());
        state.count_queries = 0;
        state.last_count = 0;
        Ok(())
    }

    async fn query_all(&self, locator: &str) -> SurfaceResult<Vec<FakeNode>> {
        let page = self.page()?;
        if page.interactions_fail {
            return Err(SurfaceError::script("scripted query failure"));
        }
        let n = match locator {
            l if l == css::COMMENT_THREAD => self.state.lock().unwrap().last_count,
            l if l == css::COMMENT_REGION => usize::from(page.region_present),
            l if l == css::CONTINUATION || l == css::RECOVERY_CONTINUATION => {
                usize::from(page.continuation)
            }
            l if l == css::RELATED_ITEM => page.related_items,
            _ => 0,
        };
        Ok(Self::nodes(locator, n))
    }

    async fn wait_until_present(&self, locator: &str, timeout: Duration) -> SurfaceResult<FakeNode> {
        let page = self.page()?;
        let present = match locator {
            l if l == css::VIDEO_PLAYER => page.available,
            l if l == css::COMMENT_REGION => page.available && page.region_present,
            _ => false,
        };
        if present {
            Ok(FakeNode {
                locator: locator.to_string(),
                index: 0,
            })
        } else {
            Err(SurfaceError::Timeout {
                locator: locator.to_string(),
                elapsed: timeout,
            })
        }
    }

    async fn click(&self, _node: &FakeNode) -> SurfaceResult<()> {
        self.interaction()?;
        self.state.lock().unwrap().clicks += 1;
        Ok(())
    }

    async fn is_displayed(&self, _node: &FakeNode) -> SurfaceResult<bool> {
        self.page().map(|p| p.continuation)
    }

    async fn scroll_into_view(&self, _node: &FakeNode) -> SurfaceResult<()> {
        self.interaction()
    }

    async fn scroll_by(&self, _px: i64) -> SurfaceResult<()> {
        self.interaction()
    }

    async fn scroll_to_bottom(&self) -> SurfaceResult<()> {
        self.interaction()?;
        self.state.lock().unwrap().scrolls_to_bottom += 1;
        Ok(())
    }

    async fn bottom_edge(&self, _node: &FakeNode) -> SurfaceResult<f64> {
        self.interaction()?;
        Ok(240.0)
    }

    async fn count(&self, locator: &str) -> SurfaceResult<usize> {
        let page = self.page()?;
        match locator {
            l if l == css::COMMENT_THREAD => {
                let mut state = self.state.lock().unwrap();
                let index = state.count_queries.min(page.schedule.len().saturating_sub(1));
                let value = page.schedule.get(index).copied().unwrap_or(0);
                state.count_queries += 1;
                state.last_count = value;
                Ok(value)
            }
            l if l == css::RELATED_ITEM => Ok(page.related_items),
            l if l == css::CONTINUATION_ITEM => Ok(usize::from(page.continuation)),
            other => Ok(self.query_all(other).await?.len()),
        }
    }

    async fn content(&self) -> SurfaceResult<String> {
        self.page()?;
        let mut state = self.state.lock().unwrap();
        state.content_calls += 1;
        Ok(watch_page_html(state.last_count))
    }

    async fn close(&self) -> SurfaceResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(SurfaceError::Closed);
        }
        state.closed = true;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// One rendered comment thread
pub fn thread_html(index: usize, text: &str) -> String {
    format!(
        r#"<ytd-comment-thread-renderer>
  <div id="comment">
    <div id="header">
      <a id="author-text"><span> @viewer{index} </span></a>
      <span class="published-time-text"><a>{index} days ago</a></span>
    </div>
    <div id="content"><span id="content-text">{text}</span></div>
    <div id="toolbar">
      <span id="vote-count-middle">{index}</span>
      <button aria-label="Dislike this comment"></button>
    </div>
  </div>
  <div id="replies"><div id="more-replies"><span>{index} replies</span></div></div>
</ytd-comment-thread-renderer>"#
    )
}

/// A watch page with `n` comment threads and a related sidebar
pub fn watch_page_html(n: usize) -> String {
    let threads: String = (1..=n)
        .map(|i| thread_html(i, &format!("comment number {i}")))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <div id="movie_player"></div>
  <div id="comments"><div id="contents">{threads}</div></div>
  <div id="related">
    <ytd-compact-video-renderer></ytd-compact-video-renderer>
  </div>
</body></html>"#
    )
}

// ============================================================================
// Config and data helpers
// ============================================================================

/// Default thresholds with every wait removed; checkpoint inside `dir`
pub fn fast_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.scroll = config.scroll.without_delays();
    config.run.page_load_wait_ms = 0;
    config.run.availability_timeout_ms = 0;
    config.run.video_delay_ms = 0;
    config.run.output_dir = dir.join("out");
    config.run.checkpoint_path = dir.join("progress.json");
    config
}

pub fn video(no: usize, url: &str) -> VideoMetadata {
    VideoMetadata {
        sequence_no: no.to_string(),
        published_date: "2024-01-01".to_string(),
        channel_name: "테스트채널".to_string(),
        title: format!("영상 {no}"),
        url: url.to_string(),
        declared_comment_count: "1,234".to_string(),
        declared_like_count: "100".to_string(),
        declared_view_count: "10,000".to_string(),
    }
}

pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}
