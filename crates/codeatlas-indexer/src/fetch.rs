//! Content fetchers: where file bytes come from

use anyhow::{Context, Result};
use async_trait::async_trait;
use codeatlas_core::FileDescriptor;
use std::collections::HashMap;
use std::path::PathBuf;

/// Retrieves the raw bytes of one file of the tree.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, file: &FileDescriptor) -> Result<Vec<u8>>;
}

/// Reads files relative to a local root directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentFetcher for FsFetcher {
    async fn fetch(&self, file: &FileDescriptor) -> Result<Vec<u8>> {
        let relative = file.content_handle.as_deref().unwrap_or(&file.path);
        let path = self.root.join(relative.trim_start_matches('/'));
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Serves file contents from memory, keyed by tree path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, file: &FileDescriptor) -> Result<Vec<u8>> {
        self.files
            .get(&file.path)
            .cloned()
            .with_context(|| format!("No content for {}", file.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_fetcher_reads_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.js"), "let a = 1;").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        let bytes = fetcher.fetch(&FileDescriptor::file("src/a.js", 10)).await.unwrap();
        assert_eq!(bytes, b"let a = 1;");

        assert!(fetcher.fetch(&FileDescriptor::file("src/missing.js", 0)).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new().with_file("a.js", "x();");
        assert_eq!(fetcher.fetch(&FileDescriptor::file("a.js", 4)).await.unwrap(), b"x();");
        assert!(fetcher.fetch(&FileDescriptor::file("b.js", 0)).await.is_err());
    }
}
