//! Document storage.
//!
//! Documents are addressed by vault-relative paths using `/` as separator,
//! e.g. `Books/Dune.md`. [`DocumentStore`] is the seam between the engine and
//! whatever actually holds the files; [`FsVault`] backs it with a directory
//! and [`MemoryVault`] keeps everything in memory.

mod fs;
mod memory;

pub use fs::FsVault;
pub use memory::MemoryVault;

use crate::error::{Error, Result};
use crate::frontmatter::{self, FrontMatter};

pub trait DocumentStore {
    /// Read the full text of a document.
    fn read(&self, path: &str) -> Result<String>;

    /// Replace the full text of an existing document.
    fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Create a new document, failing with [`Error::AlreadyExists`] if one is there.
    fn create(&self, path: &str, content: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// All markdown documents in the vault, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Read and parse a document's front-matter.
    fn frontmatter(&self, path: &str) -> Result<FrontMatter> {
        let text = self.read(path)?;
        let split = frontmatter::split(&text);
        FrontMatter::parse(split.yaml.unwrap_or_default()).map_err(|source| Error::Yaml {
            path: path.to_string(),
            source,
        })
    }

    /// Read-modify-write a document's front-matter, leaving the body untouched.
    fn update_frontmatter(&self, path: &str, apply: &mut dyn FnMut(&mut FrontMatter)) -> Result<()> {
        let text = self.read(path)?;
        let split = frontmatter::split(&text);
        let yaml_error = |source| Error::Yaml {
            path: path.to_string(),
            source,
        };

        let mut fm = FrontMatter::parse(split.yaml.unwrap_or_default()).map_err(yaml_error)?;
        apply(&mut fm);
        let updated = frontmatter::render(&fm, split.body).map_err(yaml_error)?;

        if updated != text {
            self.write(path, &updated)?;
        }
        Ok(())
    }
}

/// Folder part of a path, `""` for documents at the vault root.
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// File name including extension.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// File name without extension.
pub fn basename(path: &str) -> &str {
    let name = file_name(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

pub fn extension(path: &str) -> Option<&str> {
    file_name(path).rsplit_once('.').map(|(_, ext)| ext)
}

pub fn is_markdown(path: &str) -> bool {
    extension(path) == Some("md")
}

/// Join a folder and a file name, treating an empty folder as the vault root.
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}
