//! Redaktor Core Library
//!
//! This crate provides the core functionality for Redaktor, a local
//! notebook/wiki made of pages, where each page is an ordered list of text
//! and link elements.
//!
//! # Architecture
//!
//! - **Document**: the whole notebook is one value, saved as one JSON file
//! - **Repository**: sole mutator of the in-memory document; every change is
//!   written through to the store
//! - **Use cases**: async entry point for clients, returning refreshed pages
//!
//! # Quick Start
//!
//! ```text
//! let editor = redaktor_core::open(&Config::load()?);
//!
//! let start = editor.fetch_start_page().await?;
//! let saved = editor
//!     .create_or_update_element(&start.id, TextElement::new("hello").into())
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - `models`: pages, elements and the document
//! - `repository`: page/element operations and persistence discipline
//! - `usecase`: async façade consumed by clients
//! - `links`: read-time resolution of link targets
//! - `ids`, `ordering`: id generation and swap-based reordering
//! - `storage`: content providers, JSON codec, document store
//! - `config`: application configuration

pub mod config;
pub mod ids;
pub mod links;
pub mod models;
pub mod ordering;
pub mod repository;
pub mod storage;
pub mod usecase;

use std::sync::Arc;

pub use config::Config;
pub use links::{DanglingLink, LinkTarget, ResolvedLink};
pub use models::{
    Document, Element, LinkElement, OpaqueElement, Page, PageSnapshot, TextElement,
};
pub use repository::{DocumentRepository, EditorRepository, RepositoryError, RepositoryResult};
pub use storage::{ContentProvider, DocumentStore, FileContentProvider, StorageError};
pub use usecase::{EditorUseCase, SavedElement, UseCaseError, UseCaseResult};

/// Open the file-backed editor described by `config`
pub fn open(config: &Config) -> EditorUseCase {
    EditorUseCase::new(Arc::new(DocumentRepository::open(config)))
}
