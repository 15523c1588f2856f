//! Adaptive scroll controller
//!
//! Drives a [`RenderSurface`] through a lazily rendered comment list and decides
//! when to stop. The policy is an explicit state machine:
//!
//! ```text
//! Initializing ──region found──▶ Loading ◀──────────────┐
//!      │                          │   ▲                  │
//!  not found                 no growth │ growth      growth
//!      │                          ▼   │                  │
//!      │                        Stalling ──patience──▶ Finalizing ──▶ Done | Exhausted
//!      ▼                           └──trailing section──▶ ┘
//!  Exhausted
//! ```
//!
//! Every advance step absorbs its own interaction failures, so the controller
//! always terminates with a count; it never returns an error.

use std::fmt;
use std::time::Duration;

use crate::config::ScrollConfig;
use crate::crawler::surface::{RenderSurface, SurfaceResult};
use crate::parser::css;

// ============================================================================
// State
// ============================================================================

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Loading,
    Stalling,
    Finalizing,
    Done,
    Exhausted,
}

/// Terminal outcome of one controller run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Outer attempt budget spent with comments observed
    Done,
    /// No more content found (count may be zero)
    Exhausted,
}

impl Terminal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-video loading state; discarded when the controller returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub observed_count: usize,
    pub consecutive_stall_count: u32,
    pub attempts_made: u32,
}

/// Result of one controller run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    pub final_count: usize,
    pub terminal: Terminal,
    /// Advance iterations issued (loading plus finalizing)
    pub attempts: u32,
    /// Whether the comment region appeared at all
    pub region_found: bool,
    /// Observed count after every iteration, for diagnostics
    pub observed: Vec<usize>,
}

impl ScrollReport {
    fn not_found() -> Self {
        Self {
            final_count: 0,
            terminal: Terminal::Exhausted,
            attempts: 0,
            region_found: false,
            observed: Vec::new(),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Scroll controller bound to one surface for one video
pub struct ScrollController<'a, S: RenderSurface> {
    surface: &'a S,
    config: &'a ScrollConfig,
    state: ScrollState,
    history: Vec<usize>,
}

impl<'a, S: RenderSurface> ScrollController<'a, S> {
    pub fn new(surface: &'a S, config: &'a ScrollConfig) -> Self {
        Self {
            surface,
            config,
            state: ScrollState::default(),
            history: Vec::new(),
        }
    }

    /// Current state, mostly for tests
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Run the state machine to a terminal phase
    pub async fn run(mut self) -> ScrollReport {
        let mut phase = Phase::Initializing;

        let terminal = loop {
            phase = match phase {
                Phase::Initializing => {
                    if !self.initialize().await {
                        return ScrollReport::not_found();
                    }
                    Phase::Loading
                }
                Phase::Loading => self.load().await,
                Phase::Stalling => self.stall().await,
                Phase::Finalizing => self.finalize().await,
                Phase::Done => break Terminal::Done,
                Phase::Exhausted => break Terminal::Exhausted,
            };
        };

        tracing::info!(
            count = self.state.observed_count,
            attempts = self.state.attempts_made,
            terminal = %terminal,
            "Scroll completed"
        );

        ScrollReport {
            final_count: self.state.observed_count,
            terminal,
            attempts: self.state.attempts_made,
            region_found: true,
            observed: self.history,
        }
    }

    // ------------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------------

    /// Bring the comment region into view; false when it never appears
    async fn initialize(&mut self) -> bool {
        let cfg = self.config;
        tracing::info!("Scrolling to comments section");

        for _ in 0..cfg.initial_advances {
            if let Err(e) = self.surface.scroll_by(cfg.initial_advance_px).await {
                tracing::debug!(error = %e, "Initial advance failed");
            }
            pause(Duration::from_millis(cfg.initial_advance_delay_ms)).await;
        }

        let region = match self
            .surface
            .wait_until_present(css::COMMENT_REGION, cfg.region_wait())
            .await
        {
            Ok(region) => region,
            Err(e) => {
                tracing::warn!(error = %e, "Comment region not found");
                return false;
            }
        };

        if let Err(e) = self.surface.scroll_into_view(&region).await {
            tracing::debug!(error = %e, "Could not focus comment region");
        }
        pause(Duration::from_millis(cfg.region_focus_delay_ms)).await;

        self.state.observed_count = self.current_count().await;
        tracing::info!(count = self.state.observed_count, "Comment region focused");
        true
    }

    async fn load(&mut self) -> Phase {
        if self.budget_spent() {
            tracing::info!(attempts = self.state.attempts_made, "Attempt budget spent");
            return Phase::Finalizing;
        }

        self.state.attempts_made += 1;
        self.advance().await;
        pause(self.config.settle_delay(self.state.observed_count)).await;

        let previous = self.state.observed_count;
        let current = self.current_count().await;

        tracing::info!(
            attempt = self.state.attempts_made,
            max = self.config.max_attempts,
            count = current,
            previous,
            "Scroll iteration"
        );

        if self.observe(current) {
            tracing::info!(new = current - previous, total = current, "New comments loaded");
            self.history.push(current);
            Phase::Loading
        } else {
            self.state.consecutive_stall_count += 1;
            self.history.push(self.state.observed_count);
            tracing::info!(
                stalls = self.state.consecutive_stall_count,
                patience = self.config.patience,
                "No new comments"
            );
            Phase::Stalling
        }
    }

    async fn stall(&mut self) -> Phase {
        if self.should_recover() {
            tracing::info!(count = self.state.observed_count, "Thin thread, trying recovery");
            self.recover().await;
        }

        if self.patience_exhausted() {
            tracing::info!(stalls = self.state.consecutive_stall_count, "Patience exhausted");
            return Phase::Finalizing;
        }

        if self.should_probe_trailing() && self.trailing_section_reached().await {
            tracing::info!(
                stalls = self.state.consecutive_stall_count,
                "Trailing related section reached, finalizing early"
            );
            return Phase::Finalizing;
        }

        Phase::Loading
    }

    async fn finalize(&mut self) -> Phase {
        let cfg = self.config;
        let remaining = cfg.max_attempts.saturating_sub(self.state.attempts_made);
        let tries = cfg.final_attempts.min(remaining);

        for attempt in 1..=tries {
            tracing::info!(attempt, of = tries, "Final scroll attempt");
            self.state.attempts_made += 1;
            self.advance().await;
            pause(cfg.final_settle_delay()).await;

            let current = self.current_count().await;
            if self.observe(current) {
                tracing::info!(total = current, "Final attempt found more comments");
                self.history.push(current);
                return Phase::Loading;
            }
            self.history.push(self.state.observed_count);
        }

        if self.budget_spent() && self.state.observed_count > 0 {
            Phase::Done
        } else {
            tracing::info!(count = self.state.observed_count, "No more comments found");
            Phase::Exhausted
        }
    }

    // ------------------------------------------------------------------------
    // Transition guards
    // ------------------------------------------------------------------------

    fn budget_spent(&self) -> bool {
        self.state.attempts_made >= self.config.max_attempts
    }

    fn patience_exhausted(&self) -> bool {
        self.state.consecutive_stall_count >= self.config.patience
    }

    fn should_recover(&self) -> bool {
        self.state.consecutive_stall_count >= self.config.patience / 2
            && self.state.observed_count < self.config.recovery_list_threshold
    }

    fn should_probe_trailing(&self) -> bool {
        self.state.consecutive_stall_count >= self.config.trailing_probe_stalls
            && self.state.observed_count < self.config.trailing_probe_list_threshold
    }

    /// Record growth; returns false (and leaves the count alone) otherwise
    fn observe(&mut self, current: usize) -> bool {
        if current > self.state.observed_count {
            self.state.observed_count = current;
            self.state.consecutive_stall_count = 0;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------------
    // Surface actions
    // ------------------------------------------------------------------------

    /// Rendered thread count; a failed query counts as no growth
    async fn current_count(&self) -> usize {
        match self.surface.count(css::COMMENT_THREAD).await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(error = %e, "Comment count query failed");
                self.state.observed_count
            }
        }
    }

    /// One advance step; falls back to a minimal scroll on any failure
    async fn advance(&self) {
        if let Err(e) = self.try_advance().await {
            tracing::debug!(error = %e, "Advance step failed, using fallback scroll");
            if let Err(e) = self.surface.scroll_by(self.config.fallback_px).await {
                tracing::debug!(error = %e, "Fallback scroll failed");
            }
        }
    }

    async fn try_advance(&self) -> SurfaceResult<()> {
        let cfg = self.config;
        let s = self.surface;

        let threads = s.query_all(css::COMMENT_THREAD).await?;
        if let Some(last) = threads.last() {
            s.scroll_into_view(last).await?;
            pause(cfg.step_pause()).await;
            s.scroll_by(cfg.nudge_px).await?;
            pause(cfg.step_pause()).await;
        }

        match self.click_continuation(css::CONTINUATION, true).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "Continuation lookup failed"),
        }

        s.scroll_by(cfg.advance_px).await?;
        pause(cfg.step_pause()).await;

        // Re-center if the viewport drifted entirely past the comment region
        if let Some(region) = s.query_all(css::COMMENT_REGION).await?.first() {
            if s.bottom_edge(region).await? < 0.0 {
                s.scroll_into_view(region).await?;
                pause(cfg.step_pause()).await;
            }
        }

        Ok(())
    }

    /// Activate the first displayed continuation matching `locator`
    async fn click_continuation(&self, locator: &str, focus_first: bool) -> SurfaceResult<bool> {
        let s = self.surface;
        for node in s.query_all(locator).await? {
            if !s.is_displayed(&node).await? {
                continue;
            }
            if focus_first {
                s.scroll_into_view(&node).await?;
                pause(self.config.step_pause()).await;
            }
            s.click(&node).await?;
            tracing::info!("Clicked continuation");
            pause(self.config.continuation_delay()).await;
            return Ok(true);
        }
        Ok(false)
    }

    /// Slow full-height advances, a retreat/readvance wiggle, then a continuation click
    async fn recover(&self) {
        if let Err(e) = self.try_recover().await {
            tracing::debug!(error = %e, "Recovery failed");
        }
    }

    async fn try_recover(&self) -> SurfaceResult<()> {
        let cfg = self.config;
        let s = self.surface;

        for i in 1..=cfg.recovery_full_advances {
            s.scroll_to_bottom().await?;
            pause(cfg.step_pause()).await;
            tracing::debug!(pass = i, of = cfg.recovery_full_advances, "Recovery scroll to bottom");
        }

        s.scroll_by(-cfg.recovery_retreat_px).await?;
        pause(cfg.step_pause()).await;
        s.scroll_by(cfg.recovery_readvance_px).await?;
        pause(cfg.step_pause() * 2).await;

        if let Err(e) = self.click_continuation(css::RECOVERY_CONTINUATION, false).await {
            tracing::debug!(error = %e, "Recovery continuation click failed");
        }
        Ok(())
    }

    /// Related items have taken over and nothing is left to load
    async fn trailing_section_reached(&self) -> bool {
        let related = match self.surface.count(css::RELATED_ITEM).await {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "Related section probe failed");
                return false;
            }
        };
        if related <= self.config.trailing_min_items {
            return false;
        }

        // A failed continuation lookup is read as "still loading"
        match self.surface.count(css::CONTINUATION_ITEM).await {
            Ok(continuations) => continuations == 0,
            Err(_) => false,
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Run a fresh controller for the page currently loaded in `surface`
pub async fn load_comments<S: RenderSurface>(surface: &S, config: &ScrollConfig) -> ScrollReport {
    ScrollController::new(surface, config).run().await
}
