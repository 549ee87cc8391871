//! Utility functions for topic slugs and timestamped names

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a topic slug, in characters
const MAX_SLUG_LEN: usize = 50;

// Hard-coded patterns compile; expect is confined to these two initializers.
#[allow(clippy::expect_used)]
fn strip_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Drop everything that is not a word character, whitespace, or hyphen
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid pattern"))
}

#[allow(clippy::expect_used)]
fn collapse_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("valid pattern"))
}

/// Convert a free-text topic into a filesystem-safe slug
///
/// Non-word characters are stripped, runs of whitespace and hyphens collapse
/// to a single underscore, the result is lowercased and truncated to 50
/// characters.
///
/// # Examples
///
/// ```
/// use blog_writer::utils::slugify;
///
/// assert_eq!(slugify("AI in 2024"), "ai_in_2024");
/// assert_eq!(slugify("Rust: Fast & Safe!"), "rust_fast_safe");
/// ```
#[must_use]
pub fn slugify(topic: &str) -> String {
    let stripped = strip_pattern().replace_all(topic, "");
    let collapsed = collapse_pattern().replace_all(&stripped, "_");
    collapsed.to_lowercase().chars().take(MAX_SLUG_LEN).collect()
}

/// Build a unique directory/file stem from a topic and a point in time
///
/// The result is `<slug>_<YYYYMMDD_HHMMSS>`. Second resolution means two
/// calls with the same topic within one second produce the same name; the
/// storage engine treats that as an update of the same record.
#[must_use]
pub fn timestamped_slug(topic: &str, when: DateTime<Utc>) -> String {
    format!("{}_{}", slugify(topic), when.format("%Y%m%d_%H%M%S"))
}
