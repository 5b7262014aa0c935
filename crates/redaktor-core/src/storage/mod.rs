//! Storage layer
//!
//! Handles whole-document persistence.
//!
//! ## Architecture
//!
//! - **ContentProvider**: raw text source/sink (file, memory, nothing)
//! - **codec**: JSON encoding of the document graph
//! - **DocumentStore**: load with empty-document fallback, save with errors
//!
//! Every save rewrites the entire document; there is no incremental update.

pub mod codec;
pub mod document_store;
pub mod error;
pub mod persistence;
pub mod provider;

pub use document_store::DocumentStore;
pub use error::{StorageError, StorageResult};
pub use persistence::FileContentProvider;
pub use provider::{ContentProvider, EmptyContentProvider, MemoryContentProvider};
