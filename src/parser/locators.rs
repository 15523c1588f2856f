//! Locators for the rendered video watch page
//!
//! The raw CSS strings in [`css`] are handed to the rendering surface for live
//! queries; the compiled [`Selector`]s below are used against DOM snapshots.

use lazy_static::lazy_static;
use scraper::Selector;

/// Raw CSS locators shared by the live surface and snapshot parsing
pub mod css {
    /// Comment section container
    pub const COMMENT_REGION: &str = "#comments";
    /// One top-level comment thread
    pub const COMMENT_THREAD: &str = "ytd-comment-thread-renderer";
    /// "Load more" continuation affordances
    pub const CONTINUATION: &str =
        "ytd-continuation-item-renderer, tp-yt-paper-button[aria-label*='Show more']";
    /// Pending continuation; present while the list can still grow
    pub const CONTINUATION_ITEM: &str = "ytd-continuation-item-renderer";
    /// Continuation affordances tried during recovery
    pub const RECOVERY_CONTINUATION: &str =
        "ytd-continuation-item-renderer, .ytd-continuation-item-renderer";
    /// Related-video sidebar items
    pub const RELATED_ITEM: &str = "ytd-compact-video-renderer";
    /// Video player; its presence marks the page as available
    pub const VIDEO_PLAYER: &str = "#movie_player";

    // Within a thread
    pub const MAIN_COMMENT: &str = "#comment";
    pub const CONTENT_TEXT: &str = "#content-text";
    pub const AUTHOR_TEXT: &str = "#author-text";
    pub const VOTE_COUNT: &str = "#vote-count-middle";
    pub const MORE_REPLIES: &str = "#more-replies";
    pub const PUBLISHED_TIME: &str = ".published-time-text a";
    pub const PINNED_BADGE: &str = "[aria-label*='Pinned']";
    pub const CREATOR_HEART: &str = "#creator-heart";
    pub const DISLIKE_BUTTON: &str = "[aria-label*='Dislike']";
}

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", stringify!($s)))
    };
}

lazy_static! {
    static ref THREAD: Selector = parse_selector!(css::COMMENT_THREAD);
    static ref MAIN_COMMENT: Selector = parse_selector!(css::MAIN_COMMENT);
    static ref CONTENT_TEXT: Selector = parse_selector!(css::CONTENT_TEXT);
    static ref AUTHOR_TEXT: Selector = parse_selector!(css::AUTHOR_TEXT);
    static ref VOTE_COUNT: Selector = parse_selector!(css::VOTE_COUNT);
    static ref MORE_REPLIES: Selector = parse_selector!(css::MORE_REPLIES);
    static ref PUBLISHED_TIME: Selector = parse_selector!(css::PUBLISHED_TIME);
    static ref PINNED_BADGE: Selector = parse_selector!(css::PINNED_BADGE);
    static ref CREATOR_HEART: Selector = parse_selector!(css::CREATOR_HEART);
    static ref DISLIKE_BUTTON: Selector = parse_selector!(css::DISLIKE_BUTTON);
}

/// Compiled selectors for one comment thread
pub struct CommentSelectors {
    pub thread: &'static Selector,
    pub main_comment: &'static Selector,
    pub content_text: &'static Selector,
    pub author_text: &'static Selector,
    pub vote_count: &'static Selector,
    pub more_replies: &'static Selector,
    pub published_time: &'static Selector,
    pub pinned_badge: &'static Selector,
    pub creator_heart: &'static Selector,
    pub dislike_button: &'static Selector,
}

impl CommentSelectors {
    pub fn get() -> Self {
        Self {
            thread: &THREAD,
            main_comment: &MAIN_COMMENT,
            content_text: &CONTENT_TEXT,
            author_text: &AUTHOR_TEXT,
            vote_count: &VOTE_COUNT,
            more_replies: &MORE_REPLIES,
            published_time: &PUBLISHED_TIME,
            pinned_badge: &PINNED_BADGE,
            creator_heart: &CREATOR_HEART,
            dislike_button: &DISLIKE_BUTTON,
        }
    }
}
