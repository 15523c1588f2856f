//! Comment extraction over a rendered DOM snapshot
//!
//! Each field is read by its own accessor returning a [`FieldResult`]; failures
//! are merged into the record as explicit defaults so a missing widget never
//! costs the rest of the comment. Only the comment text is mandatory.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::locators::CommentSelectors;
use super::{parse_count, parse_reply_count};
use crate::models::{CommentContent, CommentRecord, VideoMetadata};
use crate::utils::{clean_multiline, normalize_whitespace};

/// Per-field extraction failure; never escapes this module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} not found")]
    Missing(&'static str),

    #[error("{0} is empty")]
    Empty(&'static str),
}

pub type FieldResult<T> = Result<T, FieldError>;

// ============================================================================
// Field accessors
// ============================================================================

fn first_within<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

fn text_within(
    scope: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
    clean: fn(&str) -> String,
) -> FieldResult<String> {
    let element = first_within(scope, selector).ok_or(FieldError::Missing(field))?;
    let raw: String = element.text().collect();
    let text = clean(&raw);
    if text.is_empty() {
        Err(FieldError::Empty(field))
    } else {
        Ok(text)
    }
}

fn comment_text(comment: ElementRef<'_>, s: &CommentSelectors) -> FieldResult<String> {
    text_within(comment, s.content_text, "comment text", clean_multiline)
}

fn author(comment: ElementRef<'_>, s: &CommentSelectors) -> FieldResult<String> {
    text_within(comment, s.author_text, "author", normalize_whitespace)
}

fn upvotes(comment: ElementRef<'_>, s: &CommentSelectors) -> FieldResult<u64> {
    text_within(comment, s.vote_count, "vote count", normalize_whitespace)
        .map(|t| parse_count(&t))
}

fn reply_count(thread: ElementRef<'_>, s: &CommentSelectors) -> FieldResult<u64> {
    text_within(thread, s.more_replies, "reply count", normalize_whitespace)
        .map(|t| parse_reply_count(&t))
}

fn timestamp_label(comment: ElementRef<'_>, s: &CommentSelectors) -> FieldResult<String> {
    text_within(comment, s.published_time, "timestamp", normalize_whitespace)
}

fn has_marker(comment: ElementRef<'_>, selector: &Selector) -> bool {
    first_within(comment, selector).is_some()
}

/// Merge a field result, logging the failure and falling back to the default
fn or_default<T: Default>(result: FieldResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::trace!(error = %e, "Field defaulted");
        T::default()
    })
}

// ============================================================================
// Pipeline
// ============================================================================

/// Extract one comment thread node
///
/// Returns `None` when the node has no main comment or its text is missing or
/// empty. Every other field defaults independently.
pub fn extract(thread: ElementRef<'_>) -> Option<CommentContent> {
    let s = CommentSelectors::get();
    let comment = first_within(thread, s.main_comment)?;

    let text = match comment_text(comment, &s) {
        Ok(text) => text,
        Err(e) => {
            tracing::trace!(error = %e, "Comment rejected");
            return None;
        }
    };

    Some(CommentContent {
        text,
        author: or_default(author(comment, &s)),
        upvotes: or_default(upvotes(comment, &s)),
        downvotes: 0,
        reply_count: or_default(reply_count(thread, &s)),
        timestamp_label: or_default(timestamp_label(comment, &s)),
        is_pinned: has_marker(comment, s.pinned_badge),
        is_hearted: has_marker(comment, s.creator_heart),
        has_dislike_affordance: has_marker(comment, s.dislike_button),
    })
}

/// Extract a batch of thread nodes in rendered order
///
/// Positions are 1-based and count successful extractions only. `video_url`
/// is used when the metadata carries no URL of its own.
pub fn extract_all<'a, I>(nodes: I, video: &VideoMetadata, video_url: &str) -> Vec<CommentRecord>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    let resolved_url = video.url_or(video_url).to_string();
    let scraped_at = Utc::now();

    nodes
        .into_iter()
        .filter_map(extract)
        .enumerate()
        .map(|(i, content)| CommentRecord {
            content,
            video: video.clone(),
            video_url: resolved_url.clone(),
            position: i + 1,
            scraped_at,
        })
        .collect()
}

/// Parse a page snapshot and extract every rendered comment thread
pub fn extract_from_html(html: &str, video: &VideoMetadata, video_url: &str) -> Vec<CommentRecord> {
    let document = Html::parse_document(html);
    let s = CommentSelectors::get();
    let records = extract_all(document.select(s.thread), video, video_url);

    tracing::debug!(count = records.len(), "Extracted comments from snapshot");
    records
}
