//! Document store
//!
//! Loads and saves the whole document through a [`ContentProvider`]. Loading
//! never fails: unreadable or malformed content is logged and replaced by an
//! empty document so the application always has something to work with.
//! Malformed content is first handed back to the provider to be copied aside,
//! since the next save overwrites it. Saving propagates errors to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use super::codec;
use super::error::{StorageError, StorageResult};
use super::provider::ContentProvider;
use crate::models::Document;

/// Whole-document persistence over a content provider
#[derive(Clone)]
pub struct DocumentStore {
    provider: Arc<dyn ContentProvider>,
    pretty: bool,
}

impl DocumentStore {
    /// Create a store writing pretty-printed JSON
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            provider,
            pretty: true,
        }
    }

    /// Choose between pretty-printed and compact output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Load the document, falling back to an empty one
    pub async fn load(&self) -> Document {
        let content = match self.provider.provide_content().await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read document, starting empty: {}", e);
                return Document::empty();
            }
        };

        if content.trim().is_empty() {
            debug!("Stored content is empty, starting with an empty document");
            return Document::empty();
        }

        match codec::decode(&content) {
            Ok(doc) => {
                debug!(
                    "Loaded document with {} page(s), {} element(s)",
                    doc.pages.len(),
                    doc.element_count()
                );
                doc
            }
            Err(e) => {
                match self.provider.preserve_unreadable(&content).await {
                    Ok(Some(backup_path)) => {
                        let corrupt = StorageError::CorruptDocument {
                            details: e.to_string(),
                            backup_path,
                        };
                        warn!("{}, starting empty", corrupt);
                    }
                    Ok(None) => warn!("Stored document is unreadable, starting empty: {}", e),
                    Err(backup_err) => warn!(
                        "Stored document is unreadable ({}) and could not be copied aside: {}",
                        e, backup_err
                    ),
                }
                Document::empty()
            }
        }
    }

    /// Encode and write the whole document
    pub async fn save(&self, doc: &Document) -> StorageResult<()> {
        let encoded = self.encode(doc)?;
        self.provider.save_content(&encoded).await?;
        debug!("Saved document ({} bytes)", encoded.len());
        Ok(())
    }

    /// Encode a document in this store's output style
    pub fn encode(&self, doc: &Document) -> StorageResult<String> {
        codec::encode(doc, self.pretty)
    }
}
