//! Spotlight Selector: resurface a few random quotes on the home document.
//!
//! The home document carries a directive region
//!
//! ```text
//! %%quote|3%%
//! ...replaced on every refresh...
//! %%quote-end%%
//! ```
//!
//! whose contents are rebuilt from the quote lines of the synced notes.

use crate::config::Config;
use crate::error::Result;
use crate::vault::{self, DocumentStore};
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const REGION_END: &str = "%%quote-end%%";

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%%quote\|([^%\n]*)%%").unwrap())
}

fn region_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)(%%quote\|[^%\n]*%%).*?(%%quote-end%%)").unwrap())
}

fn quote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)> \[!quote\] \[.*?\]\(.*?\.md#\^.*?\)").unwrap())
}

/// Choose `n` distinct elements uniformly at random.
///
/// When `n` covers the whole pool the pool comes back as is, in order.
pub fn pick<T: Clone, R: Rng + ?Sized>(pool: &[T], n: usize, rng: &mut R) -> Vec<T> {
    if n >= pool.len() {
        return pool.to_vec();
    }

    let mut picked = HashSet::with_capacity(n);
    let mut result = Vec::with_capacity(n);
    while result.len() < n {
        let index = rng.gen_range(0..pool.len());
        if picked.insert(index) {
            result.push(pool[index].clone());
        }
    }
    result
}

/// Number of quotes requested by the directive, or `None` without one.
/// A zero or unreadable count means one.
pub fn parse_directive(text: &str) -> Option<usize> {
    let caps = directive_pattern().captures(text)?;
    let count = caps[1].trim().parse::<usize>().ok().filter(|&n| n > 0);
    Some(count.unwrap_or(1))
}

/// A quote line from a notes document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    /// Notes document the quote came from.
    pub source: String,
}

impl Quote {
    /// The quote with a callout header linking back to its notes document.
    pub fn render(&self) -> String {
        let header = format!("> [!quote] [{}]({})\n>", vault::basename(&self.source), self.source);
        self.text.replacen("> [!quote]", &header, 1)
    }
}

/// Every quote line found in the documents directly inside `notes_folder`.
pub fn collect_quotes(store: &dyn DocumentStore, notes_folder: &str) -> Result<Vec<Quote>> {
    let folder = notes_folder.trim_matches('/');
    let mut quotes = Vec::new();
    for path in store.list()?.into_iter().filter(|p| vault::parent(p) == folder) {
        let content = store.read(&path)?;
        quotes.extend(quote_pattern().find_iter(&content).map(|m| Quote {
            text: m.as_str().to_string(),
            source: path.clone(),
        }));
    }
    Ok(quotes)
}

/// Replace the body of the first directive region with `replacement`,
/// keeping both markers. `None` when the text has no complete region.
pub fn fill_region(text: &str, replacement: &str) -> Option<String> {
    let caps = region_pattern().captures(text)?;
    let whole = caps.get(0)?;
    let open = caps.get(1)?.as_str();

    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..whole.start()]);
    out.push_str(open);
    out.push_str("\n\n");
    out.push_str(replacement);
    out.push_str("\n\n");
    out.push_str(REGION_END);
    out.push_str(&text[whole.end()..]);
    Some(out)
}

#[derive(Debug, Clone)]
pub struct Spotlight {
    enabled: bool,
    home: String,
    notes_folder: String,
}

impl Spotlight {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.spotlight.enabled,
            home: config.home_path(),
            notes_folder: config.notes.folder.clone(),
        }
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn is_home(&self, path: &str) -> bool {
        path == self.home
    }

    /// Rebuild the directive region of the home document.
    ///
    /// Returns whether the document was written.
    pub fn refresh<R: Rng + ?Sized>(&self, store: &dyn DocumentStore, rng: &mut R) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }

        let text = store.read(&self.home)?;
        let Some(count) = parse_directive(&text) else {
            debug!(home = %self.home, "no quote directive");
            return Ok(false);
        };

        let quotes = collect_quotes(store, &self.notes_folder)?;
        let rendered: Vec<String> = pick(&quotes, count, rng).iter().map(Quote::render).collect();

        match fill_region(&text, &rendered.join("\n\n")) {
            Some(updated) if updated != text => {
                store.write(&self.home, &updated)?;
                info!(home = %self.home, picked = rendered.len(), pool = quotes.len(), "spotlight refreshed");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
