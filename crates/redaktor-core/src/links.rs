//! Link resolution
//!
//! A link stores a snapshot of its target page, not a live reference. At read
//! time the snapshot is joined against the current pages:
//!
//! - no snapshot: the link is [`LinkTarget::Unbound`]
//! - snapshot id still exists: [`LinkTarget::Resolved`] with the *current*
//!   title, so renames show up without rewriting the stored link
//! - snapshot id is gone: [`LinkTarget::Stale`], which displays like an
//!   unbound link but keeps the frozen snapshot for diagnostics
//!
//! Resolution never modifies the stored document. Deleting a page does not
//! cascade to the links that point at it.

use serde::Serialize;

use crate::models::{Document, Element, LinkElement, Page, PageSnapshot};

/// Display-time state of a link element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "page", rename_all = "snake_case")]
pub enum LinkTarget {
    /// Explicitly not pointing anywhere
    Unbound,
    /// Target exists; carries its live id and title
    Resolved(PageSnapshot),
    /// Target was deleted; carries the snapshot as last saved
    Stale(PageSnapshot),
}

impl LinkTarget {
    /// Page to navigate to, if any
    pub fn page_id(&self) -> Option<&str> {
        match self {
            LinkTarget::Resolved(page) => Some(&page.id),
            LinkTarget::Unbound | LinkTarget::Stale(_) => None,
        }
    }

    pub fn is_navigable(&self) -> bool {
        matches!(self, LinkTarget::Resolved(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, LinkTarget::Stale(_))
    }
}

/// A link element paired with its resolved target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub element_id: String,
    pub target: LinkTarget,
}

/// A link whose snapshot points at a page that no longer exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingLink {
    pub page_id: String,
    pub element_id: String,
    pub target: PageSnapshot,
}

/// Resolve one link against the current pages
pub fn resolve_link(link: &LinkElement, doc: &Document) -> LinkTarget {
    match &link.related_page {
        None => LinkTarget::Unbound,
        Some(snapshot) => match doc.page(&snapshot.id) {
            Some(live) => LinkTarget::Resolved(live.snapshot()),
            None => LinkTarget::Stale(snapshot.clone()),
        },
    }
}

/// Resolve every link element of `page`, in element order
pub fn resolve_page_links(page: &Page, doc: &Document) -> Vec<ResolvedLink> {
    page.elements
        .iter()
        .filter_map(Element::as_link)
        .map(|link| ResolvedLink {
            element_id: link.id.clone(),
            target: resolve_link(link, doc),
        })
        .collect()
}

/// All links in the document whose target page is gone
pub fn dangling_links(doc: &Document) -> Vec<DanglingLink> {
    let mut dangling = Vec::new();
    for page in &doc.pages {
        for link in page.elements.iter().filter_map(Element::as_link) {
            if let LinkTarget::Stale(target) = resolve_link(link, doc) {
                dangling.push(DanglingLink {
                    page_id: page.id.clone(),
                    element_id: link.id.clone(),
                    target,
                });
            }
        }
    }
    dangling
}
