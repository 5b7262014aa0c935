//! Page command handlers

use anyhow::{Context, Result};

use redaktor_core::EditorUseCase;

use super::{resolve_page_id, show_page};
use crate::editor::confirm;
use crate::output::{display_title, short_id, Output};

/// List all pages
pub async fn list(editor: &EditorUseCase, output: &Output) -> Result<()> {
    let pages = editor.fetch_pages().await.context("Failed to list pages")?;
    output.print_pages(&pages)
}

/// Show a single page
pub async fn show(editor: &EditorUseCase, id: &str, output: &Output) -> Result<()> {
    let page_id = resolve_page_id(editor, id).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;
    show_page(editor, &page, output).await
}

/// Show the start page
pub async fn start(editor: &EditorUseCase, output: &Output) -> Result<()> {
    let page = editor
        .fetch_start_page()
        .await
        .context("Failed to open start page")?;
    show_page(editor, &page, output).await
}

/// Create a new page, optionally titled
pub async fn create(editor: &EditorUseCase, title: Option<String>, output: &Output) -> Result<()> {
    let pages = editor.create_page().await.context("Failed to create page")?;
    // The CLI is the only writer, so the page just appended is the last one
    let created = pages
        .last()
        .context("Page catalog is empty after creating a page")?;

    let page = match title {
        Some(title) => editor
            .update_page(&created.id, &title)
            .await
            .context("Failed to set page title")?,
        None => editor.fetch_page_by_id(&created.id).await?,
    };

    output.success(&format!("Created page: {}", page.id));
    output.print_page(&page, &[])
}

/// Change a page's title
pub async fn rename(editor: &EditorUseCase, id: &str, title: &str, output: &Output) -> Result<()> {
    let page_id = resolve_page_id(editor, id).await?;
    let page = editor
        .update_page(&page_id, title)
        .await
        .context("Failed to rename page")?;

    output.success(&format!(
        "Renamed page {} to '{}'",
        short_id(&page.id),
        display_title(&page.title)
    ));
    Ok(())
}

/// Delete a page
///
/// Links pointing at it are left in place and show as deleted.
pub async fn delete(editor: &EditorUseCase, id: &str, output: &Output) -> Result<()> {
    let page_id = resolve_page_id(editor, id).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;

    if output.should_prompt() {
        println!(
            "Delete page: {} - {} ({} element(s))",
            short_id(&page.id),
            display_title(&page.title),
            page.elements.len()
        );
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    editor
        .delete_page(&page_id)
        .await
        .context("Failed to delete page")?;

    output.success(&format!("Deleted page: {}", page_id));
    Ok(())
}

/// Swap two pages in the catalog
pub async fn swap(editor: &EditorUseCase, first: &str, second: &str, output: &Output) -> Result<()> {
    let first = resolve_page_id(editor, first).await?;
    let second = resolve_page_id(editor, second).await?;

    let pages = editor
        .reorder_pages(&first, &second)
        .await
        .context("Failed to reorder pages")?;
    output.print_pages(&pages)
}
