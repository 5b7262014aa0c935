//! Editor use cases
//!
//! Thin asynchronous layer between a client (CLI, GUI) and an
//! [`EditorRepository`]. Each call:
//!
//! - runs on its own spawned task; dropping the caller's future does not
//!   cancel the repository operation
//! - returns the refreshed state the client needs to re-render: the updated
//!   page for element operations, the catalog for page-list operations

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::links::{DanglingLink, ResolvedLink};
use crate::models::{Element, Page};
use crate::ordering::{position_of, swap_steps};
use crate::repository::{EditorRepository, RepositoryError, RepositoryResult};
use crate::storage::StorageError;

/// Errors surfaced to clients
#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The background task panicked or the runtime shut down under it
    #[error("Editor task aborted: {0}")]
    Aborted(String),
}

impl UseCaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UseCaseError::Repository(e) if e.is_not_found())
    }

    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            UseCaseError::Repository(e) => e.storage_error(),
            UseCaseError::Aborted(_) => None,
        }
    }
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Outcome of saving an element
#[derive(Debug, Clone)]
pub struct SavedElement {
    /// Id the element is stored under
    pub element_id: String,
    /// The owning page after the save
    pub page: Page,
}

/// Entry point used by clients
#[derive(Clone)]
pub struct EditorUseCase {
    repository: Arc<dyn EditorRepository>,
}

impl EditorUseCase {
    pub fn new(repository: Arc<dyn EditorRepository>) -> Self {
        Self { repository }
    }

    /// Run `op` against the repository on a spawned task
    async fn run<T, F, Fut>(&self, op: F) -> UseCaseResult<T>
    where
        F: FnOnce(Arc<dyn EditorRepository>) -> Fut,
        Fut: Future<Output = RepositoryResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let result = tokio::spawn(op(repository))
            .await
            .map_err(|e| UseCaseError::Aborted(e.to_string()))?;
        Ok(result?)
    }

    // ==================== Pages ====================

    /// Catalog of all pages, element bodies cleared
    pub async fn fetch_pages(&self) -> UseCaseResult<Vec<Page>> {
        self.run(|repo| async move { repo.fetch_pages().await })
            .await
    }

    pub async fn fetch_page_by_id(&self, page_id: &str) -> UseCaseResult<Page> {
        let page_id = page_id.to_string();
        self.run(|repo| async move { repo.fetch_page_by_id(&page_id).await })
            .await
    }

    pub async fn fetch_start_page(&self) -> UseCaseResult<Page> {
        self.run(|repo| async move { repo.fetch_start_page().await })
            .await
    }

    /// Append a blank page and return the refreshed catalog
    pub async fn create_page(&self) -> UseCaseResult<Vec<Page>> {
        self.run(|repo| async move {
            repo.create_page().await?;
            repo.fetch_pages().await
        })
        .await
    }

    pub async fn update_page(&self, page_id: &str, title: &str) -> UseCaseResult<Page> {
        let page_id = page_id.to_string();
        let title = title.to_string();
        self.run(|repo| async move {
            repo.update_page(&page_id, &title).await?;
            repo.fetch_page_by_id(&page_id).await
        })
        .await
    }

    pub async fn delete_page(&self, page_id: &str) -> UseCaseResult<Vec<Page>> {
        let page_id = page_id.to_string();
        self.run(|repo| async move {
            repo.delete_page(&page_id).await?;
            repo.fetch_pages().await
        })
        .await
    }

    pub async fn reorder_pages(
        &self,
        first_page_id: &str,
        second_page_id: &str,
    ) -> UseCaseResult<Vec<Page>> {
        let first = first_page_id.to_string();
        let second = second_page_id.to_string();
        self.run(|repo| async move {
            repo.reorder_pages(&first, &second).await?;
            repo.fetch_pages().await
        })
        .await
    }

    // ==================== Elements ====================

    pub async fn create_or_update_element(
        &self,
        page_id: &str,
        element: Element,
    ) -> UseCaseResult<SavedElement> {
        let page_id = page_id.to_string();
        self.run(|repo| async move {
            let element_id = repo.create_or_update_element(&page_id, element).await?;
            let page = repo.fetch_page_by_id(&page_id).await?;
            Ok(SavedElement { element_id, page })
        })
        .await
    }

    pub async fn delete_element(&self, page_id: &str, element_id: &str) -> UseCaseResult<Page> {
        let page_id = page_id.to_string();
        let element_id = element_id.to_string();
        self.run(|repo| async move {
            repo.delete_element(&page_id, &element_id).await?;
            repo.fetch_page_by_id(&page_id).await
        })
        .await
    }

    pub async fn reorder_elements(
        &self,
        page_id: &str,
        first_element_id: &str,
        second_element_id: &str,
    ) -> UseCaseResult<Page> {
        let page_id = page_id.to_string();
        let first = first_element_id.to_string();
        let second = second_element_id.to_string();
        self.run(|repo| async move {
            repo.reorder_elements(&page_id, &first, &second).await?;
            repo.fetch_page_by_id(&page_id).await
        })
        .await
    }

    /// Move an element to `target_index` as a series of adjacent swaps
    ///
    /// The index is clamped to the end of the list. Each swap is its own
    /// repository operation, so a concurrent writer may interleave.
    pub async fn move_element(
        &self,
        page_id: &str,
        element_id: &str,
        target_index: usize,
    ) -> UseCaseResult<Page> {
        let page_id = page_id.to_string();
        let element_id = element_id.to_string();
        self.run(|repo| async move {
            let page = repo.fetch_page_by_id(&page_id).await?;
            let from = position_of(&page.elements, &element_id).ok_or_else(|| {
                RepositoryError::ElementNotFound {
                    page_id: page_id.clone(),
                    element_id: element_id.clone(),
                }
            })?;
            let to = target_index.min(page.elements.len().saturating_sub(1));

            let mut order: Vec<String> = page.elements.iter().map(|e| e.id().to_string()).collect();
            for (i, j) in swap_steps(from, to) {
                repo.reorder_elements(&page_id, &order[i], &order[j]).await?;
                order.swap(i, j);
            }
            repo.fetch_page_by_id(&page_id).await
        })
        .await
    }

    // ==================== Links ====================

    /// Resolve every link on `page` against the current pages
    pub async fn resolve_page_links(&self, page: &Page) -> UseCaseResult<Vec<ResolvedLink>> {
        let links: Vec<_> = page
            .elements
            .iter()
            .filter_map(Element::as_link)
            .cloned()
            .collect();
        self.run(|repo| async move {
            let mut resolved = Vec::with_capacity(links.len());
            for link in links {
                let target = repo.resolve_link(&link).await?;
                resolved.push(ResolvedLink {
                    element_id: link.id,
                    target,
                });
            }
            Ok(resolved)
        })
        .await
    }

    /// Links anywhere in the document whose target page is gone
    pub async fn dangling_links(&self) -> UseCaseResult<Vec<DanglingLink>> {
        self.run(|repo| async move { repo.dangling_links().await })
            .await
    }

    // ==================== Import / export ====================

    /// Whole document as text
    pub async fn load_db_content(&self) -> UseCaseResult<String> {
        self.run(|repo| async move { repo.load_db_content().await })
            .await
    }

    /// Replace the whole document and return the new catalog
    pub async fn save_db_content(&self, content: &str) -> UseCaseResult<Vec<Page>> {
        let content = content.to_string();
        self.run(|repo| async move {
            repo.save_db_content(&content).await?;
            repo.fetch_pages().await
        })
        .await
    }
}
