//! Headless Chrome surface over the DevTools protocol
//!
//! Viewport operations are small scripts evaluated in the page; element
//! operations are functions called on the element's remote object.

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::BrowserSettings;
use crate::crawler::surface::{RenderSurface, SurfaceError, SurfaceResult};
use crate::error::{Error, Result};

/// Poll interval for [`RenderSurface::wait_until_present`]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const IS_DISPLAYED_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length);
}"#;

const SCROLL_INTO_VIEW_FN: &str =
    "function() { this.scrollIntoView({behavior: 'smooth', block: 'center'}); }";

const CLICK_FN: &str = "function() { this.click(); }";

const BOTTOM_EDGE_FN: &str = "function() { return this.getBoundingClientRect().bottom; }";

/// One Chrome instance with a single page
pub struct ChromeSurface {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSurface {
    /// Launch Chrome and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        tracing::info!(headless = settings.headless, "Launching browser");

        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height);

        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !settings.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-first-run");

        if settings.disable_images {
            builder = builder.arg("--blink-settings=imagesEnabled=false");
        }
        for arg in &settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| Error::setup(format!("Failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::setup(format!("Failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(Error::setup(format!("Failed to open page: {e}")));
            }
        };

        tracing::info!("Browser ready");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
        })
    }

    async fn call_on(&self, node: &Element, function: &str) -> SurfaceResult<Option<serde_json::Value>> {
        let returns = node
            .call_js_fn(function, false)
            .await
            .map_err(SurfaceError::script)?;
        Ok(returns.result.value)
    }

    async fn run_script(&self, script: String) -> SurfaceResult<()> {
        self.page
            .evaluate(script)
            .await
            .map_err(SurfaceError::script)?;
        Ok(())
    }
}

#[async_trait]
impl RenderSurface for ChromeSurface {
    type Node = Element;

    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(SurfaceError::navigation)?;
        Ok(())
    }

    async fn query_all(&self, locator: &str) -> SurfaceResult<Vec<Element>> {
        self.page
            .find_elements(locator)
            .await
            .map_err(SurfaceError::script)
    }

    async fn wait_until_present(&self, locator: &str, timeout: Duration) -> SurfaceResult<Element> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(mut found) = self.page.find_elements(locator).await {
                if !found.is_empty() {
                    return Ok(found.swap_remove(0));
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SurfaceError::Timeout {
                    locator: locator.to_string(),
                    elapsed: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, node: &Element) -> SurfaceResult<()> {
        self.call_on(node, CLICK_FN).await.map(|_| ())
    }

    async fn is_displayed(&self, node: &Element) -> SurfaceResult<bool> {
        let value = self.call_on(node, IS_DISPLAYED_FN).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn scroll_into_view(&self, node: &Element) -> SurfaceResult<()> {
        self.call_on(node, SCROLL_INTO_VIEW_FN).await.map(|_| ())
    }

    async fn scroll_by(&self, px: i64) -> SurfaceResult<()> {
        self.run_script(format!("window.scrollBy(0, {px});")).await
    }

    async fn scroll_to_bottom(&self) -> SurfaceResult<()> {
        self.run_script("window.scrollTo(0, document.body.scrollHeight);".to_string())
            .await
    }

    async fn bottom_edge(&self, node: &Element) -> SurfaceResult<f64> {
        self.call_on(node, BOTTOM_EDGE_FN)
            .await?
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SurfaceError::script("bounding rect unavailable"))
    }

    async fn content(&self) -> SurfaceResult<String> {
        self.page.content().await.map_err(SurfaceError::script)
    }

    async fn close(&self) -> SurfaceResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Err(SurfaceError::Closed);
        };

        let result = browser.close().await;
        if result.is_ok() {
            let _ = browser.wait().await;
        }
        self.handler.abort();

        tracing::info!("Browser closed");
        result.map(|_| ()).map_err(SurfaceError::script)
    }
}
