//! Export and import of the whole document

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use redaktor_core::EditorUseCase;

use crate::editor::confirm;
use crate::output::Output;

/// Write the document as JSON to `file`, or to stdout
pub async fn export(editor: &EditorUseCase, file: Option<PathBuf>, output: &Output) -> Result<()> {
    let content = editor
        .load_db_content()
        .await
        .context("Failed to export document")?;

    match file {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write export file: {:?}", path))?;
            output.success(&format!("Exported document to {}", path.display()));
        }
        None => println!("{}", content),
    }

    Ok(())
}

/// Replace the document with the contents of `file`
///
/// The file is validated before anything is replaced.
pub async fn import(editor: &EditorUseCase, file: PathBuf, output: &Output) -> Result<()> {
    let content = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read import file: {:?}", file))?;

    if output.should_prompt() {
        println!("Import replaces every page in the current document.");
        if !confirm("Continue?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let pages = editor
        .save_db_content(&content)
        .await
        .with_context(|| format!("Failed to import {:?}", file))?;

    output.success(&format!("Imported {} page(s)", pages.len()));
    Ok(())
}
