// Core data structures for the tubecomments crawler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One row of the input video list
///
/// Carried through untouched; declared metrics stay as the raw (possibly
/// locale-formatted) strings and are normalized only where compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(rename = "No.", alias = "sequence_no", default)]
    pub sequence_no: String,

    #[serde(rename = "날짜", alias = "published_date", default)]
    pub published_date: String,

    #[serde(rename = "채널명", alias = "channel_name", default)]
    pub channel_name: String,

    #[serde(rename = "제목", alias = "title", default)]
    pub title: String,

    #[serde(rename = "URL", alias = "url", default)]
    pub url: String,

    #[serde(rename = "댓글 수", alias = "comment_count", default)]
    pub declared_comment_count: String,

    #[serde(rename = "좋아요 수", alias = "like_count", default)]
    pub declared_like_count: String,

    #[serde(rename = "조회수", alias = "view_count", default)]
    pub declared_view_count: String,
}

impl VideoMetadata {
    /// Metadata URL, or `fallback` when the input row has none
    pub fn url_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.url.trim().is_empty() {
            fallback
        } else {
            self.url.trim()
        }
    }
}

/// Fields read from a single rendered comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentContent {
    pub text: String,
    pub author: String,
    pub upvotes: u64,
    /// Always 0; the platform does not expose dislike counts
    pub downvotes: u64,
    pub reply_count: u64,
    /// Relative label as rendered ("2 weeks ago"), not parsed
    pub timestamp_label: String,
    pub is_pinned: bool,
    pub is_hearted: bool,
    pub has_dislike_affordance: bool,
}

/// One scraped comment annotated with its source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub content: CommentContent,
    pub video: VideoMetadata,
    /// Resolved video URL (metadata URL or the URL that was visited)
    pub video_url: String,
    /// 1-based order among successfully extracted comments of this video
    pub position: usize,
    pub scraped_at: DateTime<Utc>,
}

impl CommentRecord {
    /// Output column names, in file order
    pub const COLUMNS: [&'static str; 19] = [
        "video_no",
        "video_date",
        "channel_name",
        "video_title",
        "video_url",
        "total_comments",
        "total_likes",
        "total_views",
        "comment_position",
        "comment_text",
        "author_name",
        "upvotes",
        "downvotes",
        "reply_count",
        "timestamp",
        "is_pinned",
        "is_hearted",
        "has_dislike_button",
        "scraped_at",
    ];

    /// Render as an output row matching [`Self::COLUMNS`]
    pub fn to_row(&self) -> Vec<String> {
        let v = &self.video;
        let c = &self.content;
        vec![
            v.sequence_no.clone(),
            v.published_date.clone(),
            v.channel_name.clone(),
            v.title.clone(),
            self.video_url.clone(),
            v.declared_comment_count.clone(),
            v.declared_like_count.clone(),
            v.declared_view_count.clone(),
            self.position.to_string(),
            c.text.clone(),
            c.author.clone(),
            c.upvotes.to_string(),
            c.downvotes.to_string(),
            c.reply_count.to_string(),
            c.timestamp_label.clone(),
            c.is_pinned.to_string(),
            c.is_hearted.to_string(),
            c.has_dislike_affordance.to_string(),
            self.scraped_at.to_rfc3339(),
        ]
    }
}

/// A video that could not be scraped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedVideo {
    pub url: String,
    pub reason: String,
    #[serde(rename = "timestamp")]
    pub failed_at: DateTime<Utc>,
}

/// Process-wide accumulator owned by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    pub processed_video_urls: BTreeSet<String>,
    pub failed_videos: Vec<FailedVideo>,
    pub accumulated_records: Vec<CommentRecord>,
    /// Set when the run stopped early on user request
    pub interrupted: bool,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a video's records and mark it processed
    pub fn record_success(&mut self, url: &str, records: Vec<CommentRecord>) {
        self.accumulated_records.extend(records);
        self.processed_video_urls.insert(url.to_string());
    }

    pub fn record_failure(&mut self, url: &str, reason: impl Into<String>) {
        self.failed_videos.push(FailedVideo {
            url: url.to_string(),
            reason: reason.into(),
            failed_at: Utc::now(),
        });
    }

    pub fn total_comments(&self) -> usize {
        self.accumulated_records.len()
    }

    /// Checkpoint view of the current progress
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed_videos: self.processed_video_urls.iter().cloned().collect(),
            failed_videos: self.failed_videos.clone(),
            total_comments_scraped: self.total_comments(),
            last_updated: Utc::now(),
        }
    }
}

/// Checkpoint payload; a snapshot, overwritten after every video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub processed_videos: Vec<String>,
    pub failed_videos: Vec<FailedVideo>,
    pub total_comments_scraped: usize,
    pub last_updated: DateTime<Utc>,
}

/// End-of-run statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total_comments: usize,
    pub videos_with_comments: usize,
    pub processed_videos: usize,
    pub failed_videos: usize,
    pub unique_authors: usize,
    pub total_upvotes: u64,
    pub comments_with_replies: usize,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn from_progress(progress: &RunProgress) -> Self {
        let records = &progress.accumulated_records;
        let videos: HashSet<&str> = records.iter().map(|r| r.video_url.as_str()).collect();
        let authors: HashSet<&str> = records.iter().map(|r| r.content.author.as_str()).collect();

        Self {
            total_comments: records.len(),
            videos_with_comments: videos.len(),
            processed_videos: progress.processed_video_urls.len(),
            failed_videos: progress.failed_videos.len(),
            unique_authors: authors.len(),
            total_upvotes: records.iter().map(|r| r.content.upvotes).sum(),
            comments_with_replies: records.iter().filter(|r| r.content.reply_count > 0).count(),
            interrupted: progress.interrupted,
        }
    }

    /// Average comments per processed video
    pub fn average_per_video(&self) -> Option<f64> {
        if self.processed_videos == 0 {
            None
        } else {
            Some(self.total_comments as f64 / self.processed_videos as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, author: &str, upvotes: u64, replies: u64) -> CommentRecord {
        CommentRecord {
            content: CommentContent {
                text: "hello".to_string(),
                author: author.to_string(),
                upvotes,
                reply_count: replies,
                ..Default::default()
            },
            video: VideoMetadata::default(),
            video_url: url.to_string(),
            position: 1,
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_url_fallback() {
        let mut video = VideoMetadata::default();
        assert_eq!(video.url_or("https://x"), "https://x");
        video.url = " https://y ".to_string();
        assert_eq!(video.url_or("https://x"), "https://y");
    }

    #[test]
    fn test_row_matches_columns() {
        let row = record("u", "a", 3, 0).to_row();
        assert_eq!(row.len(), CommentRecord::COLUMNS.len());
        assert_eq!(row[4], "u");
        assert_eq!(row[8], "1");
        assert_eq!(row[11], "3");
        assert_eq!(row[12], "0");
    }

    #[test]
    fn test_progress_snapshot() {
        let mut progress = RunProgress::new();
        progress.record_success("v1", vec![record("v1", "a", 1, 0), record("v1", "b", 2, 1)]);
        progress.record_failure("v2", "Video unavailable");

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.processed_videos, vec!["v1".to_string()]);
        assert_eq!(snapshot.failed_videos.len(), 1);
        assert_eq!(snapshot.total_comments_scraped, 2);
    }

    #[test]
    fn test_run_summary() {
        let mut progress = RunProgress::new();
        progress.record_success("v1", vec![record("v1", "a", 1, 0), record("v1", "a", 2, 3)]);
        progress.record_success("v3", vec![record("v3", "b", 5, 0)]);
        progress.record_failure("v2", "Video unavailable");

        let summary = RunSummary::from_progress(&progress);
        assert_eq!(summary.total_comments, 3);
        assert_eq!(summary.videos_with_comments, 2);
        assert_eq!(summary.processed_videos, 2);
        assert_eq!(summary.failed_videos, 1);
        assert_eq!(summary.unique_authors, 2);
        assert_eq!(summary.total_upvotes, 8);
        assert_eq!(summary.comments_with_replies, 1);
        assert_eq!(summary.average_per_video(), Some(1.5));
    }

    #[test]
    fn test_empty_summary_has_no_average() {
        let summary = RunSummary::from_progress(&RunProgress::new());
        assert_eq!(summary.average_per_video(), None);
    }
}
