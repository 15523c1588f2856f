//! Common utilities and helper functions

use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use url::Url;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Trim every line and drop the blank ones, keeping line breaks
pub fn clean_multiline(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Video identifier for log lines and file names
///
/// Reads the `v` query parameter of a watch URL or the path of a `youtu.be`
/// short link. Anything else gets a stable `unknown_NNNN` placeholder.
pub fn extract_video_id(video_url: &str) -> String {
    if let Ok(parsed) = Url::parse(video_url.trim()) {
        if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
            if !id.is_empty() {
                return id.into_owned();
            }
        }

        if parsed.host_str() == Some("youtu.be") {
            if let Some(id) = parsed.path_segments().and_then(|mut s| s.next()) {
                if !id.is_empty() {
                    return id.to_string();
                }
            }
        }
    }

    let mut hasher = DefaultHasher::new();
    video_url.hash(&mut hasher);
    format!("unknown_{}", hasher.finish() % 10_000)
}

/// Truncate text to a maximum number of characters, for log lines
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
