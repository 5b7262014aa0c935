//! Redaktor CLI
//!
//! Command-line interface for Redaktor - pages of text and links.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use redaktor_core::{Config, RepositoryError, StorageError, UseCaseError};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "redaktor")]
#[command(about = "Redaktor - a notebook of linked pages")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shows the start page when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pages
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage elements on a page
    Element {
        #[command(subcommand)]
        command: ElementCommands,
    },
    /// Write the whole document as JSON (stdout when no file is given)
    Export {
        file: Option<PathBuf>,
    },
    /// Replace the whole document with the contents of a JSON file
    Import {
        file: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show document location and contents summary
    Status,
}

#[derive(Subcommand)]
enum PageCommands {
    /// List all pages
    #[command(alias = "ls")]
    List,
    /// Show a page with its elements
    Show {
        /// Page ID (full or prefix)
        id: String,
    },
    /// Show the start page, creating it if needed
    Start,
    /// Create a new page
    #[command(alias = "add")]
    Create {
        /// Title for the new page
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// Change a page title
    Rename {
        /// Page ID (full or prefix)
        id: String,
        title: String,
    },
    /// Delete a page
    #[command(alias = "rm")]
    Delete {
        /// Page ID (full or prefix)
        id: String,
    },
    /// Swap the positions of two pages
    Swap {
        first: String,
        second: String,
    },
}

#[derive(Subcommand)]
enum ElementCommands {
    /// Append an element to a page
    #[command(alias = "create")]
    Add {
        /// Page ID (full or prefix)
        page: String,
        /// Element text (opens editor if not provided)
        #[arg(short, long)]
        text: Option<String>,
        /// Make the element a link to this page
        #[arg(short, long)]
        link: Option<String>,
    },
    /// Change an element's text or link target
    Edit {
        /// Page ID (full or prefix)
        page: String,
        /// Element ID (full or prefix)
        element: String,
        /// New text (opens editor if nothing else is changed)
        #[arg(short, long)]
        text: Option<String>,
        /// Point a link element at this page
        #[arg(short, long, conflicts_with = "unlink")]
        link: Option<String>,
        /// Clear a link element's target
        #[arg(long)]
        unlink: bool,
    },
    /// Delete an element
    #[command(alias = "rm")]
    Delete {
        /// Page ID (full or prefix)
        page: String,
        /// Element ID (full or prefix)
        element: String,
    },
    /// Swap the positions of two elements
    Swap {
        /// Page ID (full or prefix)
        page: String,
        first: String,
        second: String,
    },
    /// Move an element to a position (0 is the top)
    #[command(alias = "mv")]
    Move {
        /// Page ID (full or prefix)
        page: String,
        /// Element ID (full or prefix)
        element: String,
        index: usize,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, document_file, pretty_json, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:?}", e);
        if let Some(hint) = recovery_hint(&e) {
            eprintln!("\nHint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file directly and don't need the document
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&log_level(cli.verbose, &config));

    debug!("Using document {:?}", config.document_path());
    let editor = redaktor_core::open(&config);

    let Some(command) = cli.command else {
        return commands::page::start(&editor, &output).await;
    };

    match command {
        Commands::Page { command } => handle_page_command(command, &editor, &output).await,
        Commands::Element { command } => handle_element_command(command, &editor, &output).await,
        Commands::Export { file } => commands::transfer::export(&editor, file, &output).await,
        Commands::Import { file } => commands::transfer::import(&editor, file, &output).await,
        Commands::Status => commands::status::show(&editor, &config, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

async fn handle_page_command(
    command: PageCommands,
    editor: &redaktor_core::EditorUseCase,
    output: &Output,
) -> Result<()> {
    match command {
        PageCommands::List => commands::page::list(editor, output).await,
        PageCommands::Show { id } => commands::page::show(editor, &id, output).await,
        PageCommands::Start => commands::page::start(editor, output).await,
        PageCommands::Create { title } => commands::page::create(editor, title, output).await,
        PageCommands::Rename { id, title } => {
            commands::page::rename(editor, &id, &title, output).await
        }
        PageCommands::Delete { id } => commands::page::delete(editor, &id, output).await,
        PageCommands::Swap { first, second } => {
            commands::page::swap(editor, &first, &second, output).await
        }
    }
}

async fn handle_element_command(
    command: ElementCommands,
    editor: &redaktor_core::EditorUseCase,
    output: &Output,
) -> Result<()> {
    match command {
        ElementCommands::Add { page, text, link } => {
            commands::element::add(editor, &page, text, link, output).await
        }
        ElementCommands::Edit {
            page,
            element,
            text,
            link,
            unlink,
        } => {
            let change = commands::element::ElementChange { text, link, unlink };
            commands::element::edit(editor, &page, &element, change, output).await
        }
        ElementCommands::Delete { page, element } => {
            commands::element::delete(editor, &page, &element, output).await
        }
        ElementCommands::Swap {
            page,
            first,
            second,
        } => commands::element::swap(editor, &page, &first, &second, output).await,
        ElementCommands::Move {
            page,
            element,
            index,
        } => commands::element::move_to(editor, &page, &element, index, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Recovery suggestion for a storage failure anywhere in the error chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<UseCaseError>() {
                e.storage_error()
            } else if let Some(e) = cause.downcast_ref::<RepositoryError>() {
                e.storage_error()
            } else {
                cause.downcast_ref::<StorageError>()
            }
        })
        .and_then(StorageError::recovery_suggestion)
}

/// Effective log level: `-v` flags win over the `log_level` config key
fn log_level(verbose: u8, config: &Config) -> String {
    match verbose {
        0 => config
            .log_level
            .clone()
            .unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Log to stderr so stdout stays clean for command output
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("redaktor_core={},redaktor_cli={}", level, level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_recovery_hint_for_storage_errors() {
        let disk_full = StorageError::DiskFull {
            path: PathBuf::from("/data/editor_db.json"),
            source: std::io::Error::other("No space left on device"),
        };
        let err = anyhow::Error::new(UseCaseError::from(RepositoryError::from(disk_full)))
            .context("Failed to create page");
        assert_eq!(recovery_hint(&err), Some("Free up disk space and try again."));

        let not_found = UseCaseError::from(RepositoryError::PageNotFound {
            page_id: "p".to_string(),
        });
        let err = anyhow::Error::new(not_found).context("Failed to show page");
        assert_eq!(recovery_hint(&err), None);

        assert_eq!(recovery_hint(&anyhow::anyhow!("plain failure")), None);
    }

    #[test]
    fn test_log_level_precedence() {
        let mut config = Config::default();
        assert_eq!(log_level(0, &config), "warn");

        config.log_level = Some("error".to_string());
        assert_eq!(log_level(0, &config), "error");
        assert_eq!(log_level(1, &config), "info");
        assert_eq!(log_level(2, &config), "debug");
        assert_eq!(log_level(5, &config), "trace");
    }

    #[test]
    fn test_parse_element_edit() {
        let cli = Cli::try_parse_from([
            "redaktor", "element", "edit", "ab12", "cd34", "--link", "ef56",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Element {
                command:
                    ElementCommands::Edit {
                        page,
                        element,
                        link,
                        unlink,
                        ..
                    },
            }) => {
                assert_eq!(page, "ab12");
                assert_eq!(element, "cd34");
                assert_eq!(link.as_deref(), Some("ef56"));
                assert!(!unlink);
            }
            _ => panic!("expected element edit"),
        }
    }

    #[test]
    fn test_link_conflicts_with_unlink() {
        let result = Cli::try_parse_from([
            "redaktor", "element", "edit", "p", "e", "--link", "x", "--unlink",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["redaktor", "page", "list", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
