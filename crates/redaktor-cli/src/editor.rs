//! Interactive editing support
//!
//! Opens $EDITOR for writing element text.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

/// Open `initial_content` in the user's preferred editor and return the result
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors. The editor value
/// may carry arguments (`code --wait`). A single trailing newline added by
/// the editor is dropped.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let mut file = tempfile::Builder::new()
        .prefix("redaktor_edit_")
        .suffix(".md")
        .tempfile()
        .context("Failed to create temp file")?;
    file.write_all(initial_content.as_bytes())
        .with_context(|| format!("Failed to write temp file: {:?}", file.path()))?;
    file.flush()?;

    let status = Command::new(program)
        .args(&args)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(file.path())
        .with_context(|| format!("Failed to read edited file: {:?}", file.path()))?;

    Ok(strip_trailing_newline(content))
}

fn strip_trailing_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    content
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];
    if let Some(editor) = common_editors.iter().find(|e| command_exists(e)) {
        return Ok(editor.to_string());
    }

    bail!(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(cmd);
        candidate.is_file() || candidate.with_extension("exe").is_file()
    })
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
