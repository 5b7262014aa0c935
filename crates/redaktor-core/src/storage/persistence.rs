//! File-backed document persistence
//!
//! Stores the serialized document as a single JSON file. Uses atomic writes
//! (write to temp file, then rename) so a save either fully replaces the old
//! content or leaves it untouched.
//!
//! Storage location: `~/.local/share/redaktor/editor_db.json` (configurable via `Config`)

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::provider::ContentProvider;
use crate::config::Config;

/// Content provider reading and writing one file
#[derive(Debug, Clone)]
pub struct FileContentProvider {
    path: PathBuf,
}

impl FileContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider for the document file named by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.document_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where unreadable content is copied, e.g. `editor_db.json.corrupt`
    pub fn corrupt_copy_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ContentProvider for FileContentProvider {
    /// A missing file reads as empty content (first run)
    async fn provide_content(&self) -> StorageResult<String> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No document at {:?} yet", self.path);
                Ok(String::new())
            }
            Err(e) => Err(StorageError::from_read_io(e, self.path.clone())),
        }
    }

    async fn save_content(&self, content: &str) -> StorageResult<()> {
        atomic_write(&self.path, content.as_bytes()).await
    }

    async fn preserve_unreadable(&self, content: &str) -> StorageResult<Option<PathBuf>> {
        let backup_path = self.corrupt_copy_path();
        atomic_write(&backup_path, content.as_bytes()).await?;
        Ok(Some(backup_path))
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state, even if the
/// calling task is dropped halfway through.
async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    // Same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|source| StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })?;

    Ok(())
}
