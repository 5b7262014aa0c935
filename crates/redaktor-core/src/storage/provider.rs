//! Content providers
//!
//! A content provider is the byte-string boundary under the document store:
//! it hands back whatever text was last saved and replaces it on save. The
//! file-backed implementation lives in [`super::persistence`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StorageResult;

/// Pluggable source and sink for the serialized document
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Return the stored content, or an empty string if nothing was saved yet
    async fn provide_content(&self) -> StorageResult<String>;

    /// Replace the stored content
    async fn save_content(&self, content: &str) -> StorageResult<()>;

    /// Keep a copy of content that could not be decoded, before the next save
    /// replaces it. Returns where the copy went; providers without a place
    /// for it return `None`.
    async fn preserve_unreadable(&self, _content: &str) -> StorageResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// Provider that holds content in memory
///
/// Used by tests and by callers that want a throwaway document. Writes can be
/// made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryContentProvider {
    content: Mutex<String>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `content` already stored
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(content.into()),
            ..Self::default()
        }
    }

    /// Currently stored content
    pub async fn content(&self) -> String {
        self.content.lock().await.clone()
    }

    /// Number of successful saves so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentProvider for MemoryContentProvider {
    async fn provide_content(&self) -> StorageResult<String> {
        Ok(self.content.lock().await.clone())
    }

    async fn save_content(&self, content: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("memory provider is read-only").into());
        }
        *self.content.lock().await = content.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider with nothing stored that discards every save
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContentProvider;

#[async_trait]
impl ContentProvider for EmptyContentProvider {
    async fn provide_content(&self) -> StorageResult<String> {
        Ok(String::new())
    }

    async fn save_content(&self, _content: &str) -> StorageResult<()> {
        Ok(())
    }
}
