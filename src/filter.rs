//! Video filter applied before any rendering work
//!
//! Each bound compares a declared metric, normalized with
//! [`parse_metric`](crate::parser::parse_metric), inclusively. A minimum of
//! zero never excludes anything.

use std::fmt;

use crate::config::FilterBounds;
use crate::models::VideoMetadata;
use crate::parser::parse_metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Comments,
    Likes,
    Views,
}

impl Metric {
    fn declared(self, video: &VideoMetadata) -> u64 {
        let raw = match self {
            Self::Comments => &video.declared_comment_count,
            Self::Likes => &video.declared_like_count,
            Self::Views => &video.declared_view_count,
        };
        parse_metric(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min(u64),
    Max(u64),
}

/// One active filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criterion {
    metric: Metric,
    bound: Bound,
}

impl Criterion {
    fn admits(&self, video: &VideoMetadata) -> bool {
        let value = self.metric.declared(video);
        match self.bound {
            Bound::Min(min) => value >= min,
            Bound::Max(max) => value <= max,
        }
    }

    /// Config-style name, e.g. `min_views`
    pub fn name(&self) -> &'static str {
        match (self.metric, self.bound) {
            (Metric::Comments, Bound::Min(_)) => "min_comments",
            (Metric::Comments, Bound::Max(_)) => "max_comments",
            (Metric::Likes, Bound::Min(_)) => "min_likes",
            (Metric::Likes, Bound::Max(_)) => "max_likes",
            (Metric::Views, Bound::Min(_)) => "min_views",
            (Metric::Views, Bound::Max(_)) => "max_views",
        }
    }

    pub fn threshold(&self) -> u64 {
        match self.bound {
            Bound::Min(v) | Bound::Max(v) => v,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.bound {
            Bound::Min(_) => ">=",
            Bound::Max(_) => "<=",
        };
        write!(f, "{} {op} {}", self.name(), self.threshold())
    }
}

/// Active criteria in evaluation order; absent bounds and zero minimums are dropped
pub fn criteria(bounds: &FilterBounds) -> Vec<Criterion> {
    let candidates = [
        (Metric::Comments, bounds.min_comments.map(Bound::Min)),
        (Metric::Likes, bounds.min_likes.map(Bound::Min)),
        (Metric::Views, bounds.min_views.map(Bound::Min)),
        (Metric::Comments, bounds.max_comments.map(Bound::Max)),
        (Metric::Likes, bounds.max_likes.map(Bound::Max)),
        (Metric::Views, bounds.max_views.map(Bound::Max)),
    ];

    candidates
        .into_iter()
        .filter_map(|(metric, bound)| match bound? {
            Bound::Min(0) => None,
            bound => Some(Criterion { metric, bound }),
        })
        .collect()
}

/// Videos removed by one criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub criterion: Criterion,
    pub removed: usize,
}

/// Outcome of a filter pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub input: usize,
    pub kept: usize,
    pub removals: Vec<Removal>,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.input - self.kept
    }
}

/// Keep the videos that satisfy every active bound, preserving input order
///
/// Criteria are applied one after another so the report attributes each
/// removal to the first criterion that rejected the video.
pub fn filter(videos: Vec<VideoMetadata>, bounds: &FilterBounds) -> (Vec<VideoMetadata>, FilterReport) {
    let input = videos.len();
    let mut remaining = videos;
    let mut removals = Vec::new();

    for criterion in criteria(bounds) {
        let before = remaining.len();
        remaining.retain(|v| criterion.admits(v));
        let removed = before - remaining.len();

        tracing::info!(criterion = %criterion, removed, remaining = remaining.len(), "Applied filter");
        crate::metrics::record_filter_removed(criterion.name(), removed);
        removals.push(Removal { criterion, removed });
    }

    let report = FilterReport {
        input,
        kept: remaining.len(),
        removals,
    };
    tracing::info!(input, kept = report.kept, "Video filtering complete");

    (remaining, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(comments: &str, likes: &str, views: &str) -> VideoMetadata {
        VideoMetadata {
            url: format!("https://www.youtube.com/watch?v={views}"),
            declared_comment_count: comments.to_string(),
            declared_like_count: likes.to_string(),
            declared_view_count: views.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_bounds_keeps_everything() {
        let videos = vec![video("1", "1", "1"), video("", "", "")];
        let (kept, report) = filter(videos.clone(), &FilterBounds::default());
        assert_eq!(kept, videos);
        assert!(report.removals.is_empty());
    }

    #[test]
    fn test_min_views_inclusive() {
        let bounds = FilterBounds {
            min_views: Some(500),
            ..Default::default()
        };
        let videos = vec![video("0", "0", "100"), video("0", "0", "500"), video("0", "0", "900")];
        let (kept, report) = filter(videos, &bounds);

        let views: Vec<&str> = kept.iter().map(|v| v.declared_view_count.as_str()).collect();
        assert_eq!(views, vec!["500", "900"]);
        assert_eq!(report.removed(), 1);
        assert_eq!(report.removals[0].criterion.name(), "min_views");
    }

    #[test]
    fn test_zero_minimum_is_disabled() {
        let bounds = FilterBounds {
            min_comments: Some(0),
            ..Default::default()
        };
        assert!(criteria(&bounds).is_empty());

        let videos = vec![video("0", "0", "0"), video("garbage", "", "")];
        let (kept, _) = filter(videos, &bounds);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_max_bounds_and_locale_formats() {
        let bounds = FilterBounds {
            max_comments: Some(1000),
            min_likes: Some(10),
            ..Default::default()
        };
        let videos = vec![
            video("1,000", "10", "0"),
            video("1,001", "50", "0"),
            video(" 999 ", "9", "0"),
        ];
        let (kept, report) = filter(videos, &bounds);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].declared_comment_count, "1,000");

        let names: Vec<&str> = report.removals.iter().map(|r| r.criterion.name()).collect();
        assert_eq!(names, vec!["min_likes", "max_comments"]);
        assert_eq!(report.removals[0].removed, 1);
        assert_eq!(report.removals[1].removed, 1);
    }

    #[test]
    fn test_production_bounds() {
        let criteria = criteria(&FilterBounds::production());
        let names: Vec<String> = criteria.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["min_comments >= 10", "min_views >= 500"]);
    }
}
