//! Note Synchronizer: mirror a book's highlights into a reading-notes document.
//!
//! Sync is a pure function of the source document followed by a
//! change-detecting write, so running it repeatedly without editing the book
//! never touches the notes document or the book's metrics.

pub mod extract;

pub use extract::{Entry, Heading, HighlightEntry, Metrics, drop_empty_headings, extract_entries};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frontmatter::{self, FrontMatter};
use crate::parser::extract_outlinks;
use crate::ui::Ui;
use crate::vault::{self, DocumentStore};
use md5::{Digest, Md5};
use tracing::{debug, info, warn};

/// Deterministic block id derived from text: the MD5 hex digest, so ids
/// written by earlier versions of the notes keep resolving.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Md5::digest(text.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Not a tracked book; nothing was read or written.
    Skipped,
    /// The notes document already matched.
    Unchanged,
    Created(String),
    Updated(String),
}

impl SyncOutcome {
    pub fn wrote(&self) -> bool {
        matches!(self, SyncOutcome::Created(_) | SyncOutcome::Updated(_))
    }
}

#[derive(Debug, Clone)]
pub struct Synchronizer {
    book_folder: String,
    book_tag: String,
    notes_folder: String,
    notes_tag: String,
    outlinks: bool,
    metrics: bool,
    block_id: bool,
}

impl Synchronizer {
    pub fn new(config: &Config) -> Self {
        Self {
            book_folder: config.tracking.folder.clone(),
            book_tag: config.notes.book_tag.clone(),
            notes_folder: config.notes.folder.clone(),
            notes_tag: config.notes.notes_tag.clone(),
            outlinks: config.notes.outlinks,
            metrics: config.notes.metrics,
            block_id: config.notes.block_id,
        }
    }

    /// Where the notes for `source` live.
    pub fn destination(&self, source: &str) -> String {
        vault::join(&self.notes_folder, vault::file_name(source))
    }

    fn in_scope(&self, path: &str) -> bool {
        vault::is_markdown(path) && vault::parent(path) == self.book_folder.trim_matches('/')
    }

    /// Render the notes document for a book.
    pub fn render(&self, source: &str, frontmatter: &FrontMatter, body: &str) -> String {
        let mut content = format!("---\ntags: {}\n---", self.notes_tag);

        if self.outlinks {
            let links = extract_outlinks(body);
            if !links.is_empty() {
                content.push_str("\n\n# Outlinks\n\n");
                content.push_str(&links.join(" / "));
            }
        }

        if let Some(review) = frontmatter.book_review.as_deref() {
            content.push_str(&format!("\n\n# Review\n\n> [!tip] {review}"));
            if self.block_id {
                content.push_str(&format!(" ^{}", content_hash(review)));
            }
        }

        let entries = drop_empty_headings(extract_entries(body));
        if !entries.is_empty() {
            content.push_str("\n\n# Highlights\n\n");
        }
        for entry in &entries {
            match entry {
                Entry::Heading(heading) => content.push_str(&heading.line),
                Entry::Highlight(highlight) => content.push_str(&self.render_highlight(source, highlight)),
            }
            content.push_str("\n\n");
        }

        content
    }

    fn render_highlight(&self, source: &str, highlight: &HighlightEntry) -> String {
        let target = match &highlight.id {
            Some(id) => format!("{source}#^{id}"),
            None => source.to_string(),
        };
        let mut out = format!("> [!quote] [{}]({})", highlight.text, target);
        for idea in &highlight.ideas {
            out.push_str(&format!("\n> 💬 {idea}"));
        }
        if self.block_id {
            out.push_str(&format!(" ^{}", content_hash(&highlight.text)));
        }
        out
    }

    /// Sync one book. Documents outside the book folder or without the book
    /// tag are skipped silently.
    pub fn sync(&self, store: &dyn DocumentStore, ui: &dyn Ui, source: &str) -> Result<SyncOutcome> {
        if !self.in_scope(source) || !store.exists(source) {
            debug!(source, "not a tracked book, skipping sync");
            return Ok(SyncOutcome::Skipped);
        }

        let text = store.read(source)?;
        let split = frontmatter::split(&text);
        let fm = FrontMatter::parse(split.yaml.unwrap_or_default()).map_err(|e| Error::Yaml {
            path: source.to_string(),
            source: e,
        })?;
        if !fm.has_tag(&self.book_tag) {
            debug!(source, tag = %self.book_tag, "book tag missing, skipping sync");
            return Ok(SyncOutcome::Skipped);
        }

        let content = self.render(source, &fm, split.body);
        let destination = self.destination(source);

        let outcome = if store.exists(&destination) {
            if store.read(&destination)? == content {
                return Ok(SyncOutcome::Unchanged);
            }
            store.write(&destination, &content)?;
            SyncOutcome::Updated(destination)
        } else {
            store.create(&destination, &content)?;
            SyncOutcome::Created(destination)
        };

        if self.metrics {
            let metrics = Metrics::from_body(split.body);
            store.update_frontmatter(source, &mut |fm| {
                fm.outlinks = Some(metrics.outlinks);
                fm.highlights = Some(metrics.highlights);
                fm.thinks = Some(metrics.thinks);
            })?;
        }

        info!(source, ?outcome, "synced reading notes");
        ui.notice(&format!("{} - synced", vault::file_name(source)));
        Ok(outcome)
    }

    /// Sync every tagged book. A failing book is reported and does not stop the rest.
    pub fn sync_all(&self, store: &dyn DocumentStore, ui: &dyn Ui) -> Result<Vec<(String, SyncOutcome)>> {
        let mut outcomes = Vec::new();
        for path in store.list()?.into_iter().filter(|p| self.in_scope(p)) {
            match self.sync(store, ui, &path) {
                Ok(SyncOutcome::Skipped) => {}
                Ok(outcome) => outcomes.push((path, outcome)),
                Err(e) => {
                    warn!(path, error = %e, "sync failed");
                    ui.notice(&format!("{} - sync failed: {}", vault::file_name(&path), e));
                }
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedUi;
    use crate::vault::MemoryVault;
    use pretty_assertions::assert_eq;

    fn synchronizer() -> Synchronizer {
        Synchronizer::new(&Config::default())
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hello!"));
        assert_eq!(content_hash("hello").len(), 32);
        assert_eq!(content_hash("hello"), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_render_full_document() {
        let sync = synchronizer();
        let fm = FrontMatter {
            book_review: Some("A classic".to_string()),
            ..FrontMatter::default()
        };
        let body = "# Part One\n\n## Empty chapter\n\n## Chapter 1\nSee [[Paul]].\n==hello%%💬nice💬%%%%^abc12^%%==\n\n# Part Two";
        let rendered = sync.render("Books/Dune.md", &fm, body);

        let expected = format!(
            "---\ntags: reading-notes\n---\n\n# Outlinks\n\n[[Paul]]\n\n# Review\n\n> [!tip] A classic ^{}\n\n# Highlights\n\n# Part One\n\n## Chapter 1\n\n> [!quote] [hello](Books/Dune.md#^abc12)\n> 💬 nice ^{}\n\n",
            content_hash("A classic"),
            content_hash("hello"),
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_without_block_ids_or_outlinks() {
        let mut config = Config::default();
        config.notes.block_id = false;
        config.notes.outlinks = false;
        let sync = Synchronizer::new(&config);

        let rendered = sync.render("Books/Dune.md", &FrontMatter::default(), "[[Paul]] ==spice==");
        assert_eq!(
            rendered,
            "---\ntags: reading-notes\n---\n\n# Highlights\n\n> [!quote] [spice](Books/Dune.md)\n\n"
        );
    }

    #[test]
    fn test_sync_skips_out_of_scope() {
        let sync = synchronizer();
        let vault = MemoryVault::new();
        let ui = ScriptedUi::new();
        vault.insert("Elsewhere/Dune.md", "---\ntags: book\n---\n==x==");
        vault.insert("Books/Untagged.md", "==x==");
        vault.insert("Books/cover.png", "");

        for path in ["Elsewhere/Dune.md", "Books/Untagged.md", "Books/cover.png", "Books/Missing.md"] {
            assert_eq!(sync.sync(&vault, &ui, path).unwrap(), SyncOutcome::Skipped);
        }
        assert!(ui.notices().is_empty());
    }

    #[test]
    fn test_sync_twice_is_idempotent() {
        let sync = synchronizer();
        let vault = MemoryVault::new();
        let ui = ScriptedUi::new();
        vault.insert("Books/Dune.md", "---\ntags: book\n---\n# Title\n==hello%%^abc12^%%==");

        let first = sync.sync(&vault, &ui, "Books/Dune.md").unwrap();
        assert_eq!(first, SyncOutcome::Created("Books/Notes/Dune.md".to_string()));
        let source_after_first = vault.read("Books/Dune.md").unwrap();

        let second = sync.sync(&vault, &ui, "Books/Dune.md").unwrap();
        assert_eq!(second, SyncOutcome::Unchanged);
        assert_eq!(vault.write_count("Books/Notes/Dune.md"), 1);
        assert_eq!(vault.read("Books/Dune.md").unwrap(), source_after_first);
        assert_eq!(ui.notices(), vec!["Dune.md - synced"]);
    }

    #[test]
    fn test_sync_writes_metrics() {
        let sync = synchronizer();
        let vault = MemoryVault::new();
        let ui = ScriptedUi::new();
        vault.insert(
            "Books/Dune.md",
            "---\ntags: [book]\n---\n[[Paul]]\n==a%%💬x💬%%%%^1^%%==\n==b%%^2^%%==",
        );

        sync.sync(&vault, &ui, "Books/Dune.md").unwrap();
        let fm = vault.frontmatter("Books/Dune.md").unwrap();
        assert_eq!(fm.outlinks, Some(1));
        assert_eq!(fm.highlights, Some(2));
        assert_eq!(fm.thinks, Some(1));
    }

    #[test]
    fn test_sync_updates_changed_notes() {
        let sync = synchronizer();
        let vault = MemoryVault::new();
        let ui = ScriptedUi::new();
        vault.insert("Books/Dune.md", "---\ntags: book\n---\n==one%%^a^%%==");
        vault.insert("Books/Notes/Dune.md", "stale");

        let outcome = sync.sync(&vault, &ui, "Books/Dune.md").unwrap();
        assert_eq!(outcome, SyncOutcome::Updated("Books/Notes/Dune.md".to_string()));
        assert!(vault.read("Books/Notes/Dune.md").unwrap().contains("[one](Books/Dune.md#^a)"));
    }

    #[test]
    fn test_sync_all_only_touches_tagged_books() {
        let sync = synchronizer();
        let vault = MemoryVault::new();
        let ui = ScriptedUi::new();
        vault.insert("Books/A.md", "---\ntags: book\n---\n==a==");
        vault.insert("Books/B.md", "---\ntags: novel\n---\n==b==");
        vault.insert("Books/C.md", "---\ntags: book\n---\n==c==");

        let outcomes = sync.sync_all(&vault, &ui).unwrap();
        let paths: Vec<_> = outcomes.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["Books/A.md", "Books/C.md"]);
        assert!(!vault.exists("Books/Notes/B.md"));
    }
}
