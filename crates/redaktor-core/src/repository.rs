//! Document repository
//!
//! The `DocumentRepository` owns the in-memory document and is its only
//! mutator. The document is loaded lazily on first use and kept for the
//! lifetime of the repository.
//!
//! ## Mutation discipline
//!
//! Every mutating operation runs inside one critical section:
//!
//! 1. lock the document (loading it first if needed)
//! 2. build a modified copy; on a lookup failure return the error with the
//!    in-memory document untouched
//! 3. replace the in-memory document with the copy
//! 4. write the whole document to the store
//!
//! Step 3 happens before step 4, so a failed write leaves memory ahead of
//! disk and the error is returned to the caller. Lookups are linear scans.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::ids::fresh_id;
use crate::links::{self, DanglingLink, LinkTarget};
use crate::models::{Document, Element, LinkElement, Page};
use crate::ordering::swap_by_id;
use crate::storage::{codec, DocumentStore, FileContentProvider, StorageError};

/// Title given to a lazily created start page
pub const START_PAGE_TITLE: &str = "index";

/// Errors returned by repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Page not found: '{page_id}'")]
    PageNotFound { page_id: String },

    #[error("Element '{element_id}' not found on page '{page_id}'")]
    ElementNotFound { page_id: String, element_id: String },

    /// Bulk import was given text that is not a document
    #[error("Rejected document content: {details}")]
    InvalidContent { details: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RepositoryError {
    fn page_not_found(page_id: &str) -> Self {
        RepositoryError::PageNotFound {
            page_id: page_id.to_string(),
        }
    }

    fn element_not_found(page_id: &str, element_id: String) -> Self {
        RepositoryError::ElementNotFound {
            page_id: page_id.to_string(),
            element_id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::PageNotFound { .. } | RepositoryError::ElementNotFound { .. }
        )
    }

    /// The underlying storage failure, if this is one
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            RepositoryError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Page/element operations consumed by the use-case layer
///
/// One call is one logical operation. Implementations must serialize
/// mutations against the same document.
#[async_trait]
pub trait EditorRepository: Send + Sync {
    /// The start page, created on first use if unset
    async fn fetch_start_page(&self) -> RepositoryResult<Page>;

    async fn fetch_page_by_id(&self, page_id: &str) -> RepositoryResult<Page>;

    /// All pages in catalog order, with element bodies cleared
    async fn fetch_pages(&self) -> RepositoryResult<Vec<Page>>;

    /// Append `element` (unknown id) or replace the element with the same id
    ///
    /// Returns the id the element is stored under.
    async fn create_or_update_element(
        &self,
        page_id: &str,
        element: Element,
    ) -> RepositoryResult<String>;

    async fn delete_element(&self, page_id: &str, element_id: &str) -> RepositoryResult<()>;

    async fn delete_page(&self, page_id: &str) -> RepositoryResult<()>;

    /// Swap the positions of two elements within a page
    async fn reorder_elements(
        &self,
        page_id: &str,
        first_element_id: &str,
        second_element_id: &str,
    ) -> RepositoryResult<()>;

    /// Swap the positions of two pages in the catalog
    async fn reorder_pages(&self, first_page_id: &str, second_page_id: &str)
        -> RepositoryResult<()>;

    /// Append a blank page with a fresh id
    async fn create_page(&self) -> RepositoryResult<()>;

    async fn update_page(&self, page_id: &str, title: &str) -> RepositoryResult<()>;

    /// Export the whole document as text
    async fn load_db_content(&self) -> RepositoryResult<String>;

    /// Replace the whole document with `content`
    async fn save_db_content(&self, content: &str) -> RepositoryResult<()>;

    /// Resolve a link against the current pages
    async fn resolve_link(&self, link: &LinkElement) -> RepositoryResult<LinkTarget>;

    /// Links whose target page no longer exists
    async fn dangling_links(&self) -> RepositoryResult<Vec<DanglingLink>>;
}

/// Repository backed by a [`DocumentStore`]
pub struct DocumentRepository {
    store: DocumentStore,
    /// `None` until the first operation loads the document
    state: Mutex<Option<Document>>,
}

impl DocumentRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            state: Mutex::new(None),
        }
    }

    /// Repository over the document file named by `config`
    pub fn open(config: &Config) -> Self {
        let provider = Arc::new(FileContentProvider::from_config(config));
        Self::new(DocumentStore::new(provider).with_pretty(config.pretty_json))
    }

    /// Copy of the current document
    pub async fn snapshot(&self) -> Document {
        let mut guard = self.state.lock().await;
        self.ensure_loaded(&mut guard).await.clone()
    }

    async fn ensure_loaded<'a>(&self, slot: &'a mut Option<Document>) -> &'a mut Document {
        if slot.is_none() {
            let doc = self.store.load().await;
            debug!("Document loaded into memory");
            *slot = Some(doc);
        }
        slot.get_or_insert_with(Document::empty)
    }

    /// Run `op` on a copy of the document, install the result, persist it
    async fn mutate<T, F>(&self, op: F) -> RepositoryResult<T>
    where
        F: FnOnce(&Document) -> RepositoryResult<(Document, T)> + Send,
        T: Send,
    {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;

        let (next, value) = op(&*current)?;
        *current = next;
        self.store.save(current).await?;
        Ok(value)
    }
}

#[async_trait]
impl EditorRepository for DocumentRepository {
    async fn fetch_start_page(&self) -> RepositoryResult<Page> {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;

        if let Some(page) = current.start_page() {
            return Ok(page.clone());
        }
        if !current.start_page_id.is_empty() {
            warn!(
                "Start page '{}' no longer exists, creating a new one",
                current.start_page_id
            );
        }

        let mut next = current.clone();
        let page_id = fresh_id(|id| next.page(id).is_some());
        let page = Page::new(page_id, START_PAGE_TITLE);
        next.start_page_id = page.id.clone();
        next.pages.push(page.clone());

        *current = next;
        self.store.save(current).await?;
        info!("Created start page {}", page.id);
        Ok(page)
    }

    async fn fetch_page_by_id(&self, page_id: &str) -> RepositoryResult<Page> {
        let mut guard = self.state.lock().await;
        self.ensure_loaded(&mut guard)
            .await
            .page(page_id)
            .cloned()
            .ok_or_else(|| RepositoryError::page_not_found(page_id))
    }

    async fn fetch_pages(&self) -> RepositoryResult<Vec<Page>> {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;
        Ok(current.pages.iter().map(Page::without_elements).collect())
    }

    async fn create_or_update_element(
        &self,
        page_id: &str,
        element: Element,
    ) -> RepositoryResult<String> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            let page = next
                .page_mut(page_id)
                .ok_or_else(|| RepositoryError::page_not_found(page_id))?;

            let stored_id = match page.element_position(element.id()) {
                Some(index) => {
                    let id = element.id().to_string();
                    page.elements[index] = element;
                    debug!("Updated element {} on page {}", id, page_id);
                    id
                }
                None => {
                    let supplied = element.id().to_string();
                    let id = fresh_id(|candidate| {
                        candidate == supplied || page.element(candidate).is_some()
                    });
                    let mut element = element;
                    element.set_id(id.clone());
                    page.elements.push(element);
                    debug!("Appended element {} to page {}", id, page_id);
                    id
                }
            };
            Ok((next, stored_id))
        })
        .await
    }

    async fn delete_element(&self, page_id: &str, element_id: &str) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            if let Some(page) = next.page_mut(page_id) {
                page.elements.retain(|e| e.id() != element_id);
            }
            Ok((next, ()))
        })
        .await
    }

    async fn delete_page(&self, page_id: &str) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            next.pages.retain(|p| p.id != page_id);
            if next.start_page_id == page_id {
                next.start_page_id.clear();
            }
            Ok((next, ()))
        })
        .await
    }

    async fn reorder_elements(
        &self,
        page_id: &str,
        first_element_id: &str,
        second_element_id: &str,
    ) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            let page = next
                .page_mut(page_id)
                .ok_or_else(|| RepositoryError::page_not_found(page_id))?;
            swap_by_id(&mut page.elements, first_element_id, second_element_id)
                .map_err(|missing| RepositoryError::element_not_found(page_id, missing))?;
            Ok((next, ()))
        })
        .await
    }

    async fn reorder_pages(
        &self,
        first_page_id: &str,
        second_page_id: &str,
    ) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            swap_by_id(&mut next.pages, first_page_id, second_page_id)
                .map_err(|missing| RepositoryError::page_not_found(&missing))?;
            Ok((next, ()))
        })
        .await
    }

    async fn create_page(&self) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            let mut page = Page::empty();
            page.id = fresh_id(|id| next.page(id).is_some());
            debug!("Created page {}", page.id);
            next.pages.push(page);
            Ok((next, ()))
        })
        .await
    }

    async fn update_page(&self, page_id: &str, title: &str) -> RepositoryResult<()> {
        self.mutate(|doc| {
            let mut next = doc.clone();
            let page = next
                .page_mut(page_id)
                .ok_or_else(|| RepositoryError::page_not_found(page_id))?;
            page.title = title.to_string();
            page.is_new = false;
            Ok((next, ()))
        })
        .await
    }

    async fn load_db_content(&self) -> RepositoryResult<String> {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;
        Ok(self.store.encode(current)?)
    }

    async fn save_db_content(&self, content: &str) -> RepositoryResult<()> {
        let imported = codec::decode(content).map_err(|e| RepositoryError::InvalidContent {
            details: e.to_string(),
        })?;
        check_unique_ids(&imported)?;
        info!(
            "Importing document with {} page(s)",
            imported.pages.len()
        );
        self.mutate(|_| Ok((imported, ()))).await
    }

    async fn resolve_link(&self, link: &LinkElement) -> RepositoryResult<LinkTarget> {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;
        Ok(links::resolve_link(link, current))
    }

    async fn dangling_links(&self) -> RepositoryResult<Vec<DanglingLink>> {
        let mut guard = self.state.lock().await;
        let current = self.ensure_loaded(&mut guard).await;
        Ok(links::dangling_links(current))
    }
}

/// Page ids must be unique in the document, element ids within their page
fn check_unique_ids(doc: &Document) -> RepositoryResult<()> {
    let mut page_ids = HashSet::new();
    for page in &doc.pages {
        if !page_ids.insert(page.id.as_str()) {
            return Err(RepositoryError::InvalidContent {
                details: format!("duplicate page id '{}'", page.id),
            });
        }

        let mut element_ids = HashSet::new();
        for element in &page.elements {
            if !element_ids.insert(element.id()) {
                return Err(RepositoryError::InvalidContent {
                    details: format!(
                        "duplicate element id '{}' on page '{}'",
                        element.id(),
                        page.id
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageSnapshot, TextElement};
    use crate::storage::MemoryContentProvider;
    use serde_json::json;
    use tempfile::TempDir;

    fn repository_with(content: &str) -> (Arc<MemoryContentProvider>, DocumentRepository) {
        let provider = Arc::new(MemoryContentProvider::with_content(content));
        let repository = DocumentRepository::new(DocumentStore::new(provider.clone()));
        (provider, repository)
    }

    /// Document with page "1" holding elements a, b, c and an empty page "2"
    fn seeded() -> (Arc<MemoryContentProvider>, DocumentRepository) {
        let content = json!({
            "pages": [
                {
                    "id": "1",
                    "title": "A",
                    "elements": [
                        {"type": "text", "id": "a", "text": "first"},
                        {"type": "text", "id": "b", "text": "second"},
                        {"type": "link", "id": "c", "text": "to two", "related_page": {"id": "2", "title": "B"}}
                    ]
                },
                {"id": "2", "title": "B", "elements": []}
            ],
            "start_page_id": "1"
        });
        repository_with(&content.to_string())
    }

    fn element_ids(page: &Page) -> Vec<&str> {
        page.elements.iter().map(Element::id).collect()
    }

    async fn stored(provider: &MemoryContentProvider) -> Document {
        codec::decode(&provider.content().await).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_by_id() {
        let (_, repo) = seeded();
        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(page.title, "A");
        assert_eq!(element_ids(&page), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_page_by_id_not_found() {
        let (_, repo) = seeded();
        let err = repo.fetch_page_by_id("nope").await.unwrap_err();
        assert!(matches!(err, RepositoryError::PageNotFound { ref page_id } if page_id == "nope"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_pages_clears_elements() {
        let (_, repo) = seeded();
        let pages = repo.fetch_pages().await.unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.elements.is_empty()));
        assert_eq!(pages[0].title, "A");

        // The stored page keeps its elements
        assert_eq!(repo.fetch_page_by_id("1").await.unwrap().elements.len(), 3);
    }

    #[tokio::test]
    async fn test_reads_do_not_write() {
        let (provider, repo) = seeded();
        repo.fetch_pages().await.unwrap();
        repo.fetch_page_by_id("1").await.unwrap();
        repo.fetch_start_page().await.unwrap();
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_start_page_created_lazily_once() {
        let (provider, repo) = repository_with("");

        let first = repo.fetch_start_page().await.unwrap();
        assert!(!first.id.is_empty());
        assert_eq!(first.title, START_PAGE_TITLE);
        assert_eq!(provider.write_count(), 1);

        let second = repo.fetch_start_page().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(provider.write_count(), 1);

        let doc = stored(&provider).await;
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.start_page_id, first.id);
    }

    #[tokio::test]
    async fn test_start_page_appended_to_existing_pages() {
        let content = json!({
            "pages": [{"id": "x", "title": "Existing", "elements": []}],
            "start_page_id": ""
        });
        let (provider, repo) = repository_with(&content.to_string());

        let start = repo.fetch_start_page().await.unwrap();

        let doc = stored(&provider).await;
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].id, "x");
        assert_eq!(doc.pages[1].id, start.id);
    }

    #[tokio::test]
    async fn test_dangling_start_page_is_recreated() {
        let content = json!({
            "pages": [{"id": "x", "title": "Existing", "elements": []}],
            "start_page_id": "ghost"
        });
        let (provider, repo) = repository_with(&content.to_string());

        let start = repo.fetch_start_page().await.unwrap();
        assert_ne!(start.id, "ghost");
        assert_eq!(stored(&provider).await.start_page_id, start.id);
    }

    #[tokio::test]
    async fn test_create_element_appends_with_fresh_id() {
        let (provider, repo) = seeded();

        let mut element = TextElement::new("new");
        element.id = "client-side".to_string();
        let id = repo
            .create_or_update_element("1", element.into())
            .await
            .unwrap();

        assert_ne!(id, "client-side");
        assert!(!id.is_empty());

        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(page.elements.len(), 4);
        assert_eq!(page.elements[3].id(), id);
        assert_eq!(page.elements[3].text(), Some("new"));
        assert_eq!(stored(&provider).await.page("1").unwrap().elements.len(), 4);
    }

    #[tokio::test]
    async fn test_update_element_replaces_in_place() {
        let (_, repo) = seeded();

        let mut replacement = TextElement::new("rewritten");
        replacement.id = "b".to_string();
        let id = repo
            .create_or_update_element("1", replacement.into())
            .await
            .unwrap();
        assert_eq!(id, "b");

        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(element_ids(&page), vec!["a", "b", "c"]);
        assert_eq!(page.elements[1].text(), Some("rewritten"));
        assert_eq!(page.elements[0].text(), Some("first"));
        assert!(page.elements[2].as_link().unwrap().is_bound());
    }

    #[tokio::test]
    async fn test_update_element_can_change_kind() {
        let (_, repo) = seeded();

        let mut link = LinkElement::new("now a link");
        link.id = "a".to_string();
        repo.create_or_update_element("1", link.into()).await.unwrap();

        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(page.elements[0].kind(), "link");
    }

    #[tokio::test]
    async fn test_create_element_unknown_page() {
        let (provider, repo) = seeded();
        let err = repo
            .create_or_update_element("missing", Element::empty_text())
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::PageNotFound { .. }));
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_element_is_idempotent() {
        let (provider, repo) = seeded();

        repo.delete_element("1", "b").await.unwrap();
        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(element_ids(&page), vec!["a", "c"]);

        repo.delete_element("1", "b").await.unwrap();
        repo.delete_element("missing", "b").await.unwrap();
        assert_eq!(provider.write_count(), 3);
        assert_eq!(element_ids(&stored(&provider).await.pages[0]), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_reorder_elements_swaps() {
        let (_, repo) = seeded();

        repo.reorder_elements("1", "a", "c").await.unwrap();
        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(element_ids(&page), vec!["c", "b", "a"]);

        repo.reorder_elements("1", "a", "c").await.unwrap();
        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(element_ids(&page), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_reorder_elements_missing_id_leaves_state() {
        let (provider, repo) = seeded();

        let err = repo.reorder_elements("1", "a", "zz").await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::ElementNotFound { ref element_id, .. } if element_id == "zz"
        ));

        let err = repo.reorder_elements("nope", "a", "b").await.unwrap_err();
        assert!(matches!(err, RepositoryError::PageNotFound { .. }));

        let page = repo.fetch_page_by_id("1").await.unwrap();
        assert_eq!(element_ids(&page), vec!["a", "b", "c"]);
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reorder_pages() {
        let (provider, repo) = seeded();

        repo.reorder_pages("1", "2").await.unwrap();
        let ids: Vec<_> = repo
            .fetch_pages()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["2", "1"]);

        let err = repo.reorder_pages("1", "ghost").await.unwrap_err();
        assert!(matches!(err, RepositoryError::PageNotFound { ref page_id } if page_id == "ghost"));
        assert_eq!(provider.write_count(), 1);
    }

    #[tokio::test]
    async fn test_create_page_appends_blank_page() {
        let (_, repo) = seeded();

        repo.create_page().await.unwrap();
        repo.create_page().await.unwrap();

        let pages = repo.fetch_pages().await.unwrap();
        assert_eq!(pages.len(), 4);
        let (a, b) = (&pages[2], &pages[3]);
        assert!(a.is_untitled() && b.is_untitled());
        assert!(a.is_new);
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[tokio::test]
    async fn test_update_page_title() {
        let (provider, repo) = seeded();

        repo.update_page("2", "Renamed").await.unwrap();
        assert_eq!(repo.fetch_page_by_id("2").await.unwrap().title, "Renamed");
        assert_eq!(stored(&provider).await.page("2").unwrap().title, "Renamed");

        let err = repo.update_page("ghost", "x").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rename_does_not_rewrite_link_snapshot() {
        let (_, repo) = seeded();
        repo.update_page("2", "Renamed").await.unwrap();

        let page = repo.fetch_page_by_id("1").await.unwrap();
        let link = page.elements[2].as_link().unwrap();
        assert_eq!(link.related_page, Some(PageSnapshot::new("2", "B")));

        // Read-time resolution shows the live title
        let target = repo.resolve_link(link).await.unwrap();
        assert_eq!(target, LinkTarget::Resolved(PageSnapshot::new("2", "Renamed")));
    }

    #[tokio::test]
    async fn test_delete_page_leaves_links_stale() {
        let (_, repo) = seeded();
        repo.delete_page("2").await.unwrap();

        assert!(repo.fetch_page_by_id("2").await.is_err());

        let page = repo.fetch_page_by_id("1").await.unwrap();
        let link = page.elements[2].as_link().unwrap();
        assert!(link.is_bound());
        assert!(repo.resolve_link(link).await.unwrap().is_stale());

        let dangling = repo.dangling_links().await.unwrap();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].element_id, "c");
    }

    #[tokio::test]
    async fn test_delete_start_page_clears_pointer() {
        let (provider, repo) = seeded();
        repo.delete_page("1").await.unwrap();
        assert_eq!(stored(&provider).await.start_page_id, "");

        let start = repo.fetch_start_page().await.unwrap();
        assert_ne!(start.id, "1");
        assert_eq!(repo.fetch_pages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_page_is_noop() {
        let (_, repo) = seeded();
        repo.delete_page("ghost").await.unwrap();
        assert_eq!(repo.fetch_pages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_memory_ahead() {
        let (provider, repo) = seeded();
        provider.set_fail_writes(true);

        let err = repo.update_page("1", "Unsaved").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(_)));

        // Memory reflects the attempted change, storage does not
        assert_eq!(repo.fetch_page_by_id("1").await.unwrap().title, "Unsaved");
        assert_eq!(stored(&provider).await.page("1").unwrap().title, "A");

        // The next successful save catches storage up
        provider.set_fail_writes(false);
        repo.create_page().await.unwrap();
        assert_eq!(stored(&provider).await.page("1").unwrap().title, "Unsaved");
    }

    #[tokio::test]
    async fn test_corrupt_store_starts_empty() {
        let (provider, repo) = repository_with("{definitely not json");

        assert!(repo.fetch_pages().await.unwrap().is_empty());
        assert_eq!(repo.snapshot().await, Document::empty());
        // Nothing is written until a mutation happens
        assert_eq!(provider.content().await, "{definitely not json");
    }

    #[tokio::test]
    async fn test_load_db_content_exports_current_state() {
        let (_, repo) = seeded();
        repo.update_page("2", "Exported").await.unwrap();

        let exported = repo.load_db_content().await.unwrap();
        let doc = codec::decode(&exported).unwrap();
        assert_eq!(doc.page("2").unwrap().title, "Exported");
        assert_eq!(doc, repo.snapshot().await);
    }

    #[tokio::test]
    async fn test_save_db_content_replaces_document() {
        let (provider, repo) = seeded();

        let replacement = json!({
            "pages": [{"id": "z", "title": "Imported", "elements": []}],
            "start_page_id": "z"
        });
        repo.save_db_content(&replacement.to_string()).await.unwrap();

        let start = repo.fetch_start_page().await.unwrap();
        assert_eq!(start.title, "Imported");
        assert_eq!(stored(&provider).await.pages.len(), 1);
    }

    #[tokio::test]
    async fn test_save_db_content_rejects_garbage() {
        let (provider, repo) = seeded();

        let err = repo.save_db_content("<html>").await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidContent { .. }));
        assert_eq!(repo.fetch_pages().await.unwrap().len(), 2);
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_db_content_rejects_duplicate_page_ids() {
        let (provider, repo) = seeded();

        let content = json!({
            "pages": [
                {"id": "p", "title": "A", "elements": []},
                {"id": "p", "title": "B", "elements": []}
            ],
            "start_page_id": "p"
        });
        let err = repo.save_db_content(&content.to_string()).await.unwrap_err();

        assert!(
            matches!(err, RepositoryError::InvalidContent { ref details } if details.contains("'p'"))
        );
        assert_eq!(repo.fetch_page_by_id("1").await.unwrap().title, "A");
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_db_content_rejects_duplicate_element_ids() {
        let (provider, repo) = seeded();

        let content = json!({
            "pages": [{
                "id": "p",
                "title": "A",
                "elements": [
                    {"type": "text", "id": "e", "text": "one"},
                    {"type": "text", "id": "e", "text": "two"}
                ]
            }],
            "start_page_id": "p"
        });
        let err = repo.save_db_content(&content.to_string()).await.unwrap_err();

        assert!(
            matches!(err, RepositoryError::InvalidContent { ref details } if details.contains("'e'"))
        );
        assert_eq!(repo.fetch_pages().await.unwrap().len(), 2);
        assert_eq!(provider.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_db_content_allows_same_element_id_on_different_pages() {
        let (_, repo) = seeded();

        let content = json!({
            "pages": [
                {"id": "p", "title": "A", "elements": [{"type": "text", "id": "e", "text": "one"}]},
                {"id": "q", "title": "B", "elements": [{"type": "text", "id": "e", "text": "two"}]}
            ],
            "start_page_id": "p"
        });
        repo.save_db_content(&content.to_string()).await.unwrap();
        assert_eq!(repo.fetch_pages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_not_lost() {
        let (provider, repo) = repository_with("");
        let repo = Arc::new(repo);
        let start = repo.fetch_start_page().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = Arc::clone(&repo);
            let page_id = start.id.clone();
            handles.push(tokio::spawn(async move {
                repo.create_or_update_element(&page_id, TextElement::new(format!("n{}", i)).into())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let page = repo.fetch_page_by_id(&start.id).await.unwrap();
        assert_eq!(page.elements.len(), 20);
        assert_eq!(stored(&provider).await.element_count(), 20);
    }

    #[tokio::test]
    async fn test_open_with_file_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let start_id = {
            let repo = DocumentRepository::open(&config);
            let start = repo.fetch_start_page().await.unwrap();
            repo.create_or_update_element(&start.id, TextElement::new("persisted").into())
                .await
                .unwrap();
            start.id
        };

        assert!(config.document_path().exists());

        // A fresh repository reads what the first one wrote
        let repo = DocumentRepository::open(&config);
        let start = repo.fetch_start_page().await.unwrap();
        assert_eq!(start.id, start_id);
        assert_eq!(start.elements[0].text(), Some("persisted"));
    }
}
