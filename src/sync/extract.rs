//! Pull headings and highlights out of a book's body.
//!
//! This is the only place the sync pipeline looks at raw text; everything
//! downstream works on [`Entry`] values.

use crate::highlight::{IDEA_CLOSE, IDEA_OPEN};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Number of leading `#`.
    pub level: usize,
    /// The heading line exactly as written.
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightEntry {
    pub text: String,
    /// Block id from the `%%^id^%%` tag, if the highlight has one.
    pub id: Option<String>,
    pub ideas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Heading(Heading),
    Highlight(HighlightEntry),
}

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Tags may sit inside the `==...==` span (as composed) or directly after it.
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?m)^(?P<heading>#{1,6}[ \t].*)$|==(?P<body>.+?)==(?P<tail>(?:%%💬.*?💬%%|%%\^[^\^\n]*?\^%%)*)",
        )
        .unwrap()
    })
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%%\^(.*?)\^%%").unwrap())
}

fn idea_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%%💬(.+?)💬%%").unwrap())
}

/// Parse one highlight from its `==`-delimited body and any trailing tags.
fn parse_highlight(body: &str, tail: &str) -> HighlightEntry {
    let tagged = format!("{body}{tail}");

    let text_end = [body.find(IDEA_OPEN), body.find("%%^")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(body.len());

    HighlightEntry {
        text: body[..text_end].to_string(),
        id: id_pattern()
            .captures(&tagged)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        ideas: idea_pattern()
            .captures_iter(&tagged)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

/// Headings and highlights in document order.
pub fn extract_entries(body: &str) -> Vec<Entry> {
    entry_pattern()
        .captures_iter(body)
        .filter_map(|caps| {
            if let Some(heading) = caps.name("heading") {
                let line = heading.as_str().trim_end().to_string();
                let level = line.chars().take_while(|&c| c == '#').count();
                return Some(Entry::Heading(Heading { level, line }));
            }
            let body = caps.name("body")?.as_str();
            let tail = caps.name("tail").map_or("", |m| m.as_str());
            Some(Entry::Highlight(parse_highlight(body, tail)))
        })
        .collect()
}

/// One filtering pass: a heading survives only if something deeper follows it.
fn drop_empty_headings_once(entries: Vec<Entry>) -> Vec<Entry> {
    let keep: Vec<bool> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match (entry, entries.get(i + 1)) {
            (Entry::Highlight(_), _) => true,
            (Entry::Heading(_), None) => false,
            (Entry::Heading(_), Some(Entry::Highlight(_))) => true,
            (Entry::Heading(this), Some(Entry::Heading(next))) => next.level > this.level,
        })
        .collect();

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}

/// Remove headings with no highlights beneath them.
///
/// Removing a heading can leave its parent empty, so passes repeat until one
/// removes nothing.
pub fn drop_empty_headings(mut entries: Vec<Entry>) -> Vec<Entry> {
    loop {
        let before = entries.len();
        entries = drop_empty_headings_once(entries);
        if entries.len() == before {
            return entries;
        }
    }
}

/// Counts written back to the book's front-matter after a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub outlinks: u64,
    pub highlights: u64,
    pub thinks: u64,
}

impl Metrics {
    pub fn from_body(body: &str) -> Self {
        let (highlights, thinks) = extract_entries(body)
            .iter()
            .filter_map(|entry| match entry {
                Entry::Highlight(h) => Some(h.ideas.len() as u64),
                Entry::Heading(_) => None,
            })
            .fold((0, 0), |(count, ideas), n| (count + 1, ideas + n));

        Self {
            outlinks: crate::parser::extract_outlinks(body).len() as u64,
            highlights,
            thinks,
        }
    }
}
