//! Artifact content normalization
//!
//! Generative pipelines frequently wrap an entire markdown document in a
//! code fence (```` ```markdown ... ``` ````). Stripping that wrapper here
//! keeps the committed content clean without touching fences that belong to
//! the document body.

/// Strip a document-level code fence from artifact content
///
/// Operating on the trimmed content: if the first line starts with a triple
/// backtick (optionally followed by a language tag) that line is removed; a
/// trailing line consisting of a bare triple backtick is removed as well,
/// and leading blank lines left behind by the wrapper are dropped.
///
/// Content without a leading fence is returned byte-identical, which makes
/// the operation idempotent: the output never starts with a fence line.
#[must_use]
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    let mut lines: Vec<&str> = trimmed.lines().collect();

    match lines.first() {
        Some(first) if first.trim_start().starts_with("```") => {
            lines.remove(0);
            if lines.last().is_some_and(|last| last.trim() == "```") {
                lines.pop();
            }
            lines.join("\n").trim_start_matches('\n').to_string()
        }
        _ => content.to_string(),
    }
}
