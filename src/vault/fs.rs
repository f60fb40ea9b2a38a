use super::{DocumentStore, is_markdown};
use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A vault backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path, rejecting anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Atomic write: write to temp file, then rename
    fn write_atomic(&self, path: &str, target: &Path, content: &str) -> Result<()> {
        let parent_dir = target
            .parent()
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        fs::create_dir_all(parent_dir).map_err(|e| Error::io(path, e))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir).map_err(|e| Error::io(path, e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(path, e))?;
        temp_file.flush().map_err(|e| Error::io(path, e))?;
        temp_file
            .persist(target)
            .map_err(|e| Error::io(path, e.error))?;

        debug!(path, bytes = content.len(), "wrote document");
        Ok(())
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir.display().to_string(), e))?;
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let hidden = entry.file_name().to_str().is_none_or(|name| name.starts_with('.'));
            if hidden {
                continue;
            }
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let relative = relative
                    .components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .collect::<Vec<_>>()
                    .join("/");
                if is_markdown(&relative) {
                    out.push(relative);
                }
            }
        }
        Ok(())
    }
}

impl DocumentStore for FsVault {
    fn read(&self, path: &str) -> Result<String> {
        let target = self.resolve(path)?;
        fs::read_to_string(&target).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_string()),
            _ => Error::io(path, e),
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Err(Error::NotFound(path.to_string()));
        }
        self.write_atomic(path, &target, content)
    }

    fn create(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if target.exists() {
            return Err(Error::AlreadyExists(path.to_string()));
        }
        self.write_atomic(path, &target, content)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        self.collect(&self.root, &mut out)?;
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());

        vault.create("Books/Notes/Dune.md", "first").unwrap();
        assert!(vault.exists("Books/Notes/Dune.md"));
        assert_eq!(vault.read("Books/Notes/Dune.md").unwrap(), "first");

        vault.write("Books/Notes/Dune.md", "second").unwrap();
        assert_eq!(vault.read("Books/Notes/Dune.md").unwrap(), "second");
    }

    #[test]
    fn test_create_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault.create("Home.md", "x").unwrap();
        assert!(matches!(
            vault.create("Home.md", "y"),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        assert!(matches!(vault.read("nope.md"), Err(Error::NotFound(_))));
        assert!(matches!(vault.write("nope.md", "x"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        assert!(matches!(vault.read("../etc/passwd"), Err(Error::InvalidPath(_))));
        assert!(matches!(vault.read("/etc/passwd"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_list_skips_hidden_and_non_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault.create("Books/Dune.md", "").unwrap();
        vault.create("Home.md", "").unwrap();
        vault.create(".obsidian/workspace.md", "").unwrap();
        fs::write(dir.path().join("Books/cover.png"), b"png").unwrap();

        assert_eq!(vault.list().unwrap(), vec!["Books/Dune.md", "Home.md"]);
    }
}
