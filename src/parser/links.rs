//! Outlink detection.
//!
//! An outlink is a wikilink to another note, `[[Name]]` or `[[Name|alias]]`.
//! Links whose target contains a `.` point at attachments (`[[cover.png]]`)
//! or explicit files and are not counted.

use regex::Regex;
use std::sync::OnceLock;

fn outlink_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\[[^\]\.\n]+\]\]").unwrap())
}

/// Extract all outlinks from markdown content, in document order, as written.
///
/// # Examples
///
/// ```
/// # use shelfmark::parser::links::extract_outlinks;
/// let links = extract_outlinks("See [[Dune]] and ![[cover.png]].");
/// assert_eq!(links, vec!["[[Dune]]"]);
/// ```
pub fn extract_outlinks(content: &str) -> Vec<&str> {
    outlink_pattern()
        .find_iter(content)
        .map(|m| m.as_str())
        .collect()
}
