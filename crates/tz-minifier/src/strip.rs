//! Regex-based whitespace and comment stripping.
//!
//! Not syntax aware: comment-like text inside string literals (`"http://x"`,
//! `"/* keep */"`) is stripped as well.

use regex::Regex;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static RE_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());

/// Delete every whitespace run.
pub fn remove_whitespace(code: &str) -> String {
    RE_WHITESPACE.replace_all(code, "").into_owned()
}

/// Drop block and line comments, then collapse whitespace runs to one space.
pub fn remove_whitespace_and_comments(code: &str) -> String {
    let without_blocks = RE_BLOCK_COMMENT.replace_all(code, " ");
    let without_lines = RE_LINE_COMMENT.replace_all(&without_blocks, "");
    RE_WHITESPACE.replace_all(&without_lines, " ").trim().to_string()
}
