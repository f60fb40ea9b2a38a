use super::{DocumentStore, is_markdown};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-memory vault that also counts writes per document.
///
/// Useful for driving the engine without a filesystem and for asserting that
/// idempotent operations really leave documents alone.
#[derive(Debug, Default)]
pub struct MemoryVault {
    documents: RefCell<BTreeMap<String, String>>,
    writes: RefCell<BTreeMap<String, usize>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write.
    pub fn insert(&self, path: &str, content: &str) {
        self.documents
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
    }

    /// Number of `write`/`create` calls that reached `path`.
    pub fn write_count(&self, path: &str) -> usize {
        self.writes.borrow().get(path).copied().unwrap_or(0)
    }

    fn record(&self, path: &str, content: &str) {
        self.insert(path, content);
        *self.writes.borrow_mut().entry(path.to_string()).or_insert(0) += 1;
    }
}

impl DocumentStore for MemoryVault {
    fn read(&self, path: &str) -> Result<String> {
        self.documents
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        if !self.exists(path) {
            return Err(Error::NotFound(path.to_string()));
        }
        self.record(path, content);
        Ok(())
    }

    fn create(&self, path: &str, content: &str) -> Result<()> {
        if self.exists(path) {
            return Err(Error::AlreadyExists(path.to_string()));
        }
        self.record(path, content);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.documents.borrow().contains_key(path)
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .documents
            .borrow()
            .keys()
            .filter(|p| is_markdown(p))
            .cloned()
            .collect())
    }
}
