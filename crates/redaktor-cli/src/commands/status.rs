//! Status command handler

use anyhow::{Context, Result};

use redaktor_core::{Config, EditorUseCase};

use crate::output::{Output, OutputFormat};

/// Show document location and a summary of its contents
pub async fn show(editor: &EditorUseCase, config: &Config, output: &Output) -> Result<()> {
    let path = config.document_path();
    let size = std::fs::metadata(&path).map(|m| m.len()).ok();

    let pages = editor.fetch_pages().await.context("Failed to list pages")?;
    let mut elements = 0;
    for page in &pages {
        elements += editor.fetch_page_by_id(&page.id).await?.elements.len();
    }
    let dangling = editor
        .dangling_links()
        .await
        .context("Failed to check links")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "document_path": path,
                    "document_exists": size.is_some(),
                    "document_size": size,
                    "counts": {
                        "pages": pages.len(),
                        "elements": elements,
                        "dangling_links": dangling.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", path.display());
        }
        OutputFormat::Human => {
            println!("Redaktor Status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Document: {}", path.display());
            match size {
                Some(bytes) => println!("  Size:     {} bytes", bytes),
                None => println!("  Size:     (not written yet)"),
            }
            println!();
            println!("Contents:");
            println!("  Pages:    {}", pages.len());
            println!("  Elements: {}", elements);
            println!("  Links to deleted pages: {}", dangling.len());
            output.print_dangling(&dangling)?;
        }
    }

    Ok(())
}
