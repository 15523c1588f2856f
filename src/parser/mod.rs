//! Rendered-page parsing: count normalization, locators and comment extraction
//!
//! Count parsing is deliberately lossy but total: malformed input maps to `0`
//! and never fails the caller.

pub mod extract;
pub mod locators;

pub use extract::{extract, extract_all, extract_from_html, FieldError, FieldResult};
pub use locators::{css, CommentSelectors};

use regex::Regex;
use std::sync::LazyLock;

/// First run of ASCII digits anywhere in a string
static DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Unit suffixes, checked in this order
const MULTIPLIERS: [(char, u64); 2] = [('K', 1_000), ('M', 1_000_000)];

/// Parse a human-readable count ("1.2K", "3M", "1,234") into an integer
///
/// Thousands separators and surrounding whitespace are removed and the text is
/// uppercased. A `K`/`M` suffix scales the decimal prefix, truncating the
/// result. Anything unparseable yields `0`.
///
/// # Example
/// ```
/// use tubecomments::parser::parse_count;
///
/// assert_eq!(parse_count("1.2K"), 1200);
/// assert_eq!(parse_count("950"), 950);
/// assert_eq!(parse_count("abc"), 0);
/// ```
pub fn parse_count(text: &str) -> u64 {
    let normalized = text.trim().replace(',', "").to_uppercase();
    if normalized.is_empty() {
        return 0;
    }

    for (suffix, multiplier) in MULTIPLIERS {
        if normalized.contains(suffix) {
            let number = normalized.replace(suffix, "");
            return scale_decimal(number.trim(), multiplier).unwrap_or(0);
        }
    }

    normalized.parse::<u64>().unwrap_or(0)
}

/// Extract the first run of digits ("12 replies", "View 3 replies")
///
/// # Example
/// ```
/// use tubecomments::parser::parse_reply_count;
///
/// assert_eq!(parse_reply_count("View 3 replies"), 3);
/// assert_eq!(parse_reply_count("Reply"), 0);
/// ```
pub fn parse_reply_count(text: &str) -> u64 {
    DIGITS_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Normalize a declared metric ("1,234", " 5 000 ", "1234.0") for comparison
///
/// Separators and whitespace are stripped and the rest is read as a number,
/// truncated toward zero. Failures and negatives map to `0`.
pub fn parse_metric(text: &str) -> u64 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<u64>() {
        return n;
    }

    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Multiply a non-negative decimal string by `multiplier` exactly, truncating
fn scale_decimal(number: &str, multiplier: u64) -> Option<u64> {
    let (whole, frac) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(multiplier)?;

    // Each fractional digit contributes digit * multiplier / 10^k
    let mut scale = multiplier;
    for digit in frac.chars().filter_map(|c| c.to_digit(10)) {
        scale /= 10;
        if scale == 0 {
            break;
        }
        value = value.checked_add(u64::from(digit) * scale)?;
    }

    Some(value)
}
