//! Line classification helpers for the structure indexer.

use regex::Regex;
use std::sync::OnceLock;

/// Extract the heading level from a line of markdown text.
///
/// Returns `Some(level)` if the line is a valid heading (1-6 #'s followed by whitespace
/// or end of line), or `None` otherwise.
///
/// # Examples
///
/// ```
/// # use shelfmark::parser::utils::get_heading_level;
/// assert_eq!(get_heading_level("# Title"), Some(1));
/// assert_eq!(get_heading_level("## Section"), Some(2));
/// assert_eq!(get_heading_level("not a heading"), None);
/// assert_eq!(get_heading_level("#NoSpace"), None);
/// ```
pub fn get_heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&ch| ch == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    match trimmed[level..].chars().next() {
        None => Some(level),
        Some(ch) if ch.is_whitespace() => Some(level),
        Some(_) => None,
    }
}

/// Check whether a line opens a list item (`-`, `*`, `+`, `1.` or `1)` markers).
pub fn is_list_item(line: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d{1,9}[.)])(?:\s|$)").unwrap());
    re.is_match(line)
}

/// `---`, `***` or `___` (optionally spaced) on a line of their own.
pub fn is_thematic_break(line: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"^ {0,3}(?:(?:\*\s*){3,}|(?:-\s*){3,}|(?:_\s*){3,})$").unwrap());
    re.is_match(line)
}

/// Opening marker of a fenced code block, if the line starts one.
pub fn code_fence(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    ["```", "~~~"]
        .into_iter()
        .find(|fence| trimmed.starts_with(fence))
}

pub fn is_footnote_definition(line: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"^\[\^[^\]]+\]:").unwrap());
    re.is_match(line)
}

/// Block id written at the end of a line (`text ^abc123`).
pub fn trailing_block_id(line: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"(?:^|\s)\^([A-Za-z0-9-]+)\s*$").unwrap());
    re.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Block id standing alone on its line (`^abc123`), which belongs to the block above.
pub fn standalone_block_id(line: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"^\s*\^([A-Za-z0-9-]+)\s*$").unwrap());
    re.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Heading text with the `#` run and any trailing block id removed.
pub fn heading_text(line: &str) -> String {
    let text = line.trim_start().trim_start_matches('#').trim();
    match trailing_block_id(text) {
        Some(id) => text[..text.len() - id.len() - 1].trim_end().to_string(),
        None => text.to_string(),
    }
}
