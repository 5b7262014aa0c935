//! Element command handlers

use anyhow::{bail, Context, Result};

use redaktor_core::{EditorUseCase, Element, LinkElement, Page, TextElement};

use super::{resolve_element_id, resolve_page_id, show_page};
use crate::editor::{confirm, edit_text};
use crate::output::{short_id, Output};

/// Requested changes for `element edit`
#[derive(Debug, Default)]
pub struct ElementChange {
    pub text: Option<String>,
    /// Page to point a link at
    pub link: Option<String>,
    pub unlink: bool,
}

impl ElementChange {
    fn is_empty(&self) -> bool {
        self.text.is_none() && self.link.is_none() && !self.unlink
    }
}

/// Append a text or link element to a page
pub async fn add(
    editor: &EditorUseCase,
    page: &str,
    text: Option<String>,
    link: Option<String>,
    output: &Output,
) -> Result<()> {
    let page_id = resolve_page_id(editor, page).await?;
    let target = match link {
        Some(query) => Some(fetch_target(editor, &query).await?),
        None => None,
    };

    let text = match text {
        Some(text) => text,
        None => edit_text("")?,
    };

    let element: Element = match target {
        Some(target) => LinkElement::bound_to(text, &target).into(),
        None => TextElement::new(text).into(),
    };

    let saved = editor
        .create_or_update_element(&page_id, element)
        .await
        .context("Failed to add element")?;

    output.success(&format!("Added element: {}", saved.element_id));
    show_page(editor, &saved.page, output).await
}

/// Change an element's text or link target
///
/// With no explicit change, the element text is opened in the editor.
pub async fn edit(
    editor: &EditorUseCase,
    page: &str,
    element: &str,
    change: ElementChange,
    output: &Output,
) -> Result<()> {
    let page_id = resolve_page_id(editor, page).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;
    let element_id = resolve_element_id(&page, element)?;
    let mut element = page
        .element(&element_id)
        .cloned()
        .with_context(|| format!("Element not found: {}", element_id))?;

    let target = match &change.link {
        Some(query) => Some(fetch_target(editor, query).await?),
        None => None,
    };
    let open_editor = change.is_empty();

    match &mut element {
        Element::Text(text) => {
            if target.is_some() || change.unlink {
                bail!(
                    "Element {} is a text element; --link and --unlink apply to links only",
                    short_id(&element_id)
                );
            }
            text.text = match change.text {
                Some(new_text) => new_text,
                None => edit_text(&text.text)?,
            };
        }
        Element::Link(link) => {
            if let Some(new_text) = change.text {
                link.text = new_text;
            } else if open_editor {
                link.text = edit_text(&link.text)?;
            }
            if let Some(target) = &target {
                link.bind(target);
            } else if change.unlink {
                link.unbind();
            }
        }
        Element::Opaque(opaque) => {
            bail!(
                "Element {} has unsupported type '{}' and cannot be edited",
                short_id(&element_id),
                opaque.kind()
            );
        }
    }

    let saved = editor
        .create_or_update_element(&page_id, element)
        .await
        .context("Failed to update element")?;

    output.success(&format!("Updated element: {}", short_id(&saved.element_id)));
    show_page(editor, &saved.page, output).await
}

/// Delete an element from a page
pub async fn delete(
    editor: &EditorUseCase,
    page: &str,
    element: &str,
    output: &Output,
) -> Result<()> {
    let page_id = resolve_page_id(editor, page).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;
    let element_id = resolve_element_id(&page, element)?;

    if output.should_prompt() {
        let preview = page
            .element(&element_id)
            .and_then(Element::text)
            .and_then(|t| t.lines().next())
            .unwrap_or("");
        println!("Delete element: {} - {}", short_id(&element_id), preview);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    editor
        .delete_element(&page_id, &element_id)
        .await
        .context("Failed to delete element")?;

    output.success(&format!("Deleted element: {}", element_id));
    Ok(())
}

/// Swap two elements on a page
pub async fn swap(
    editor: &EditorUseCase,
    page: &str,
    first: &str,
    second: &str,
    output: &Output,
) -> Result<()> {
    let page_id = resolve_page_id(editor, page).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;
    let first = resolve_element_id(&page, first)?;
    let second = resolve_element_id(&page, second)?;

    let page = editor
        .reorder_elements(&page_id, &first, &second)
        .await
        .context("Failed to reorder elements")?;
    show_page(editor, &page, output).await
}

/// Move an element to `index`
pub async fn move_to(
    editor: &EditorUseCase,
    page: &str,
    element: &str,
    index: usize,
    output: &Output,
) -> Result<()> {
    let page_id = resolve_page_id(editor, page).await?;
    let page = editor.fetch_page_by_id(&page_id).await?;
    let element_id = resolve_element_id(&page, element)?;

    let page = editor
        .move_element(&page_id, &element_id, index)
        .await
        .context("Failed to move element")?;
    show_page(editor, &page, output).await
}

async fn fetch_target(editor: &EditorUseCase, query: &str) -> Result<Page> {
    let target_id = resolve_page_id(editor, query).await?;
    editor
        .fetch_page_by_id(&target_id)
        .await
        .with_context(|| format!("Failed to load link target: {}", target_id))
}
