//! # shelfmark
//!
//! A reading tracker and highlight-sync engine for markdown vaults.
//!
//! Books live as markdown documents in one folder of a vault. While a book is
//! read, shelfmark tracks reading time and scroll progress in its
//! front-matter, turns selections into tagged highlights anchored to `^id`
//! block references, mirrors those highlights into a reading-notes document,
//! and resurfaces random quotes on a home page.
//!
//! ## Features
//!
//! - Block ids attached to the paragraph, list item or heading under the cursor
//! - `==text%%💬idea💬%%%%^id^%%==` highlight markup
//! - Debounced reading time and monotonic progress tracking
//! - Idempotent reading-notes sync with structural heading filtering
//! - Random quote spotlight and card notes
//!
//! ## Example
//!
//! ```rust
//! use shelfmark::{Config, MemoryVault, ScriptedUi, Synchronizer, SyncOutcome};
//!
//! let vault = MemoryVault::new();
//! vault.insert("Books/Dune.md", "---\ntags: book\n---\n# Part One\n==spice%%^a1b2c3^%%==\n");
//!
//! let sync = Synchronizer::new(&Config::default());
//! let outcome = sync.sync(&vault, &ScriptedUi::new(), "Books/Dune.md").unwrap();
//! assert_eq!(outcome, SyncOutcome::Created("Books/Notes/Dune.md".to_string()));
//! ```

/// Configuration module for persisting user preferences.
///
/// Folders, tags, timings and feature switches, loaded from a TOML file.
pub mod config;

/// Editor surface used by the highlight and card commands.
pub mod editor;

pub mod error;

/// Typed front-matter and the split/render codec around it.
pub mod frontmatter;

/// Highlight Composer.
pub mod highlight;

/// Block Locator.
pub mod locator;

/// Parser module for markdown structure.
///
/// Builds the block index (sections, list items, headings and their `^id`
/// markers) and extracts outlinks.
pub mod parser;

/// Spotlight Selector for the home document.
pub mod spotlight;

/// Note Synchronizer.
pub mod sync;

pub mod toolbox;

/// Progress Tracker, its clock and debounce scheduler.
pub mod tracker;

/// Prompts and notices.
pub mod ui;

/// Document stores backed by a directory or by memory.
pub mod vault;

// Re-export commonly used types for convenience
pub use config::Config;
pub use editor::{BufferEditor, Editor};
pub use error::{Error, Result};
pub use frontmatter::FrontMatter;
pub use spotlight::Spotlight;
pub use sync::{SyncOutcome, Synchronizer};
pub use toolbox::Toolbox;
pub use tracker::{ProgressTracker, ProgressUpdate, ScrollView, ViewMode};
pub use ui::{ScriptedUi, TerminalUi, Ui};
pub use vault::{DocumentStore, FsVault, MemoryVault};
