use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub flip: FlipConfig,

    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub spotlight: SpotlightConfig,

    #[serde(default)]
    pub cards: CardsConfig,
}

/// Reading time and progress tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Folder whose documents are books (tracked and synced)
    #[serde(default = "default_book_folder")]
    pub folder: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Longest stretch without a page turn that still counts as reading
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long to wait after the last page turn before persisting
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Reject progress jumps larger than two viewports
    #[serde(default)]
    pub strict_progress: bool,

    /// Offer to stamp `readingDate` / `completionDate`
    #[serde(default = "default_true")]
    pub record_status: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            folder: default_book_folder(),
            enabled: true,
            timeout_ms: default_timeout_ms(),
            delay_ms: default_delay_ms(),
            strict_progress: false,
            record_status: true,
        }
    }
}

/// Page flipping on click in the reading view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Added to the viewport height on every flip (negative keeps some overlap)
    #[serde(default = "default_flip_revise")]
    pub revise: f64,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            revise: default_flip_revise(),
        }
    }
}

/// Reading-notes synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Where notes documents are written
    #[serde(default = "default_notes_folder")]
    pub folder: String,

    /// Books must carry this tag to be synced
    #[serde(default = "default_book_tag")]
    pub book_tag: String,

    /// Tag written into every notes document
    #[serde(default = "default_notes_tag")]
    pub notes_tag: String,

    #[serde(default = "default_true")]
    pub outlinks: bool,

    /// Write outlink/highlight/idea counts back to the book
    #[serde(default = "default_true")]
    pub metrics: bool,

    /// Give every synced highlight a content-derived block id
    #[serde(default = "default_true")]
    pub block_id: bool,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            folder: default_notes_folder(),
            book_tag: default_book_tag(),
            notes_tag: default_notes_tag(),
            outlinks: true,
            metrics: true,
            block_id: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotlightConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Document (without `.md`) holding the `%%quote|n%%` directive
    #[serde(default = "default_home")]
    pub home: String,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            home: default_home(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardsConfig {
    #[serde(default = "default_cards_folder")]
    pub folder: String,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            folder: default_cards_folder(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_book_folder() -> String {
    "Books".to_string()
}

fn default_notes_folder() -> String {
    "Books/Notes".to_string()
}

fn default_book_tag() -> String {
    "book".to_string()
}

fn default_notes_tag() -> String {
    "reading-notes".to_string()
}

fn default_home() -> String {
    "Home".to_string()
}

fn default_cards_folder() -> String {
    "Cards".to_string()
}

fn default_timeout_ms() -> u64 {
    5 * 60 * 1000
}

fn default_delay_ms() -> u64 {
    3 * 1000
}

fn default_flip_revise() -> f64 {
    -80.0
}

impl Config {
    /// `<platform config dir>/shelfmark/config.toml`, where `save` writes.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shelfmark").join("config.toml"))
    }

    /// Files `load` looks at, in order. macOS also honours
    /// `~/.config/shelfmark/config.toml` ahead of Application Support.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        #[cfg(target_os = "macos")]
        paths.extend(dirs::home_dir().map(|p| p.join(".config").join("shelfmark").join("config.toml")));
        paths.extend(Self::config_path());
        paths
    }

    /// First readable config on the search path, else defaults.
    pub fn load() -> Self {
        for path in Self::search_paths() {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Self::default()
    }

    /// Load an explicitly named config file. Unlike [`Config::load`], a missing
    /// or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Write the config to [`Config::config_path`], returning where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent.display().to_string(), e))?;
        }

        fs::write(&path, self.to_toml()?).map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(path)
    }

    /// Path of the home document holding the spotlight directive
    pub fn home_path(&self) -> String {
        format!("{}.md", self.spotlight.home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracking.folder, "Books");
        assert_eq!(config.tracking.timeout_ms, 300_000);
        assert_eq!(config.tracking.delay_ms, 3_000);
        assert_eq!(config.flip.revise, -80.0);
        assert_eq!(config.notes.folder, "Books/Notes");
        assert_eq!(config.home_path(), "Home.md");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml(
            "[tracking]\nfolder = \"Library\"\nstrict_progress = true\n\n[notes]\nblock_id = false\n",
        )
        .unwrap();
        assert_eq!(config.tracking.folder, "Library");
        assert!(config.tracking.strict_progress);
        assert_eq!(config.tracking.delay_ms, 3_000);
        assert!(!config.notes.block_id);
        assert!(config.notes.outlinks);
        assert_eq!(config.spotlight.home, "Home");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.cards.folder = "Zettel".to_string();
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            Config::from_toml("[tracking\nfolder = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_search_paths_end_with_platform_path() {
        let paths = Config::search_paths();
        assert_eq!(paths.last(), Config::config_path().as_ref());
        assert!(paths.iter().all(|p| p.ends_with("shelfmark/config.toml")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cards]\nfolder = \"Zettel\"\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().cards.folder, "Zettel");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("nope.toml")).is_err());
    }
}
