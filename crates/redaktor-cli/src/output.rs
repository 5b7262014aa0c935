//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::{Context, Result};
use serde::Serialize;

use redaktor_core::{DanglingLink, Element, LinkTarget, Page, ResolvedLink};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A page together with the resolved targets of its links
#[derive(Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    page: &'a Page,
    links: &'a [ResolvedLink],
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a page with its elements
    pub fn print_page(&self, page: &Page, links: &[ResolvedLink]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Title: {}", display_title(&page.title));
                println!("ID:    {}", page.id);
                println!();

                if page.elements.is_empty() {
                    println!("No elements on this page.");
                    return Ok(());
                }

                for (index, element) in page.elements.iter().enumerate() {
                    let target = links
                        .iter()
                        .find(|l| l.element_id == element.id())
                        .map(|l| &l.target);
                    println!(
                        "{:>3}  {}  {:<5} {}",
                        index,
                        short_id(element.id()),
                        element.kind(),
                        describe_element(element, target)
                    );
                }
                println!("\n{} element(s)", page.elements.len());
            }
            OutputFormat::Json => print_json(&PageView { page, links })?,
            OutputFormat::Quiet => {
                println!("{}", page.id);
            }
        }
        Ok(())
    }

    /// Print the page catalog
    pub fn print_pages(&self, pages: &[Page]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("No pages found.");
                    return Ok(());
                }
                for page in pages {
                    println!(
                        "{} | {}",
                        short_id(&page.id),
                        truncate(display_title(&page.title), 60)
                    );
                }
                println!("\n{} page(s)", pages.len());
            }
            OutputFormat::Json => print_json(pages)?,
            OutputFormat::Quiet => {
                for page in pages {
                    println!("{}", page.id);
                }
            }
        }
        Ok(())
    }

    /// Print links whose target page no longer exists
    pub fn print_dangling(&self, dangling: &[DanglingLink]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for link in dangling {
                    println!(
                        "  {} on page {} -> {} (deleted)",
                        short_id(&link.element_id),
                        short_id(&link.page_id),
                        display_title(&link.target.title)
                    );
                }
            }
            OutputFormat::Json => print_json(dangling)?,
            OutputFormat::Quiet => {
                for link in dangling {
                    println!("{}", link.element_id);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

/// First 8 characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

pub fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        "(untitled)"
    } else {
        title
    }
}

/// One-line summary of an element for listings
fn describe_element(element: &Element, target: Option<&LinkTarget>) -> String {
    match element {
        Element::Text(text) => truncate_line(&text.text, 60),
        Element::Link(link) => {
            let label = truncate_line(&link.text, 40);
            match target {
                Some(LinkTarget::Resolved(page)) => {
                    format!("{} -> {}", label, display_title(&page.title))
                }
                Some(LinkTarget::Stale(page)) => {
                    format!("{} -> {} (deleted)", label, display_title(&page.title))
                }
                Some(LinkTarget::Unbound) | None => format!("{} (unbound)", label),
            }
        }
        Element::Opaque(_) => "(unsupported element)".to_string(),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
