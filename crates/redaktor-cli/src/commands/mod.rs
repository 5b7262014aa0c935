//! Command handlers

pub mod config;
pub mod element;
pub mod page;
pub mod status;
pub mod transfer;

use anyhow::{bail, Context, Result};

use redaktor_core::{EditorUseCase, Page};

use crate::output::Output;

/// Resolve a page ID (full id or unique prefix)
pub async fn resolve_page_id(editor: &EditorUseCase, query: &str) -> Result<String> {
    let pages = editor.fetch_pages().await.context("Failed to list pages")?;
    match_id(
        "page",
        query,
        pages.iter().map(|p| (p.id.as_str(), p.title.as_str())),
    )
}

/// Resolve an element ID on `page` (full id or unique prefix)
pub fn resolve_element_id(page: &Page, query: &str) -> Result<String> {
    match_id(
        "element",
        query,
        page.elements
            .iter()
            .map(|e| (e.id(), e.text().unwrap_or_else(|| e.kind()))),
    )
}

/// Fetch the links of `page` and print both
pub async fn show_page(editor: &EditorUseCase, page: &Page, output: &Output) -> Result<()> {
    let links = editor
        .resolve_page_links(page)
        .await
        .context("Failed to resolve links")?;
    output.print_page(page, &links)
}

/// Pick the single candidate whose id equals or starts with `query`
///
/// Candidates are `(id, label)` pairs; the label is only used to list
/// ambiguous matches.
fn match_id<'a>(
    kind: &str,
    query: &str,
    candidates: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<String> {
    if query.is_empty() {
        bail!("Empty {} ID", kind);
    }

    let candidates: Vec<_> = candidates.into_iter().collect();
    if candidates.iter().any(|(id, _)| *id == query) {
        return Ok(query.to_string());
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.starts_with(query))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, query),
        1 => Ok(matches[0].0.to_string()),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, query);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
