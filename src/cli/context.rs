//! Assistant context file commands.
//!
//! The `context` group inspects and unifies the per-assistant context files
//! (`CLAUDE.md`, `GEMINI.md`) and the shared `CONTEXT.md` they can be
//! symlinked to, and drives Gemini-assisted analysis and revision of their
//! content. A `file-names` subgroup manages the `context.fileName` setting
//! that tells the Gemini CLI which file names to load.
//!
//! # Examples
//!
//! ```bash
//! # Where does each scope stand?
//! aicfg context status
//!
//! # Merge CLAUDE.md and GEMINI.md into one shared file
//! aicfg context unify --scope user
//!
//! # Ask Gemini about the combined context
//! aicfg context analyze all "What conventions do these files establish?"
//!
//! # Let GEMINI.md be loaded under its own name and the shared one
//! aicfg context file-names add CONTEXT.md
//! ```

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::common::{print_single_column, read_string_list};
use super::ScopeArg;
use crate::config::Locations;
use crate::context::{
    CLAUDE_FILE, ContextManager, ContextStatus, FileStatus, GEMINI_FILE, UNIFIED_FILE,
};
use crate::core::Scope;
use crate::settings::{CONTEXT_FILE_NAMES_PATH, SettingsStore};

/// Command for inspecting and unifying assistant context files.
#[derive(Debug, clap::Parser)]
pub struct ContextCommand {
    /// Context operation to perform
    #[command(subcommand)]
    subcommand: ContextSubcommand,
}

/// Output format for `context status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum StatusFormat {
    /// Per-scope tables
    Table,
    /// Machine-readable JSON
    Json,
}

/// Output format for `context analyze` and `context revise`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum AssistFormat {
    /// Plain text
    Text,
    /// Machine-readable JSON
    Json,
}

/// Scope selector for `context analyze`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum AnalyzeScope {
    /// User-scope context files only
    User,
    /// Project-scope context files only
    Project,
    /// Both scopes together
    All,
}

/// Subcommands for context file management.
#[derive(Debug, Subcommand)]
enum ContextSubcommand {
    /// Show the current state of context files per scope.
    Status {
        /// Filter to a specific scope (default: show all)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: StatusFormat,
    },

    /// Unify CLAUDE.md and GEMINI.md into a single shared CONTEXT.md.
    ///
    /// Merges the per-assistant files into the shared location, backs up the
    /// originals, and replaces them with symlinks so both tools read the
    /// same file. Running it again on an already unified scope is a no-op.
    Unify {
        /// Scope to unify
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,
    },

    /// Analyze context files using Gemini.
    ///
    /// Requires `GEMINI_API_KEY` in the environment.
    Analyze {
        /// Which scope's files to analyze
        #[arg(value_enum)]
        scope: AnalyzeScope,

        /// Your question or analysis request about the context files
        prompt: String,

        /// Gemini model override
        #[arg(long)]
        model: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: AssistFormat,
    },

    /// Revise a context file using Gemini.
    ///
    /// The current file content and the instructions go to the model, and
    /// its answer replaces the file. The previous content is kept as a
    /// `.bak` sibling. Requires `GEMINI_API_KEY` in the environment.
    Revise {
        /// Scope whose context file to revise
        #[arg(value_enum)]
        scope: ScopeArg,

        /// Instructions for how to modify the context file
        prompt: String,

        /// Gemini model override
        #[arg(long)]
        model: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: AssistFormat,
    },

    /// Manage the context.fileName setting (Gemini-specific).
    FileNames(FileNamesCommand),
}

/// Command for managing the list of context file names Gemini loads.
#[derive(Debug, clap::Parser)]
pub struct FileNamesCommand {
    /// File name operation to perform
    #[command(subcommand)]
    subcommand: FileNamesSubcommand,
}

#[derive(Debug, Subcommand)]
enum FileNamesSubcommand {
    /// List configured context file names.
    List,

    /// Add a context file name.
    Add {
        /// File name, e.g. `CONTEXT.md`
        filename: String,
    },

    /// Remove a context file name.
    Remove {
        /// File name to remove
        filename: String,
    },
}

impl ContextCommand {
    /// Execute the context operation.
    ///
    /// # Errors
    ///
    /// Returns an error on unreadable context files, foreign symlinks during
    /// unification, a missing `GEMINI_API_KEY` for the assisted operations,
    /// or Gemini API failures.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let manager = ContextManager::new(locations);

        match self.subcommand {
            ContextSubcommand::Status { scope, format } => {
                let status = manager.status(scope.map(Scope::from))?;
                if format == StatusFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                    return Ok(());
                }
                render_status(&status);
            }
            ContextSubcommand::Unify { scope } => {
                let report = manager.unify(Scope::from(scope))?;
                println!("{}", "Success!".green());
                println!();
                println!("{}", report.message);

                if !report.backups.is_empty() {
                    println!();
                    println!("{}", "Backups created:".dimmed());
                    for backup in &report.backups {
                        println!("  {}", backup.dimmed());
                    }
                }
                if !report.symlinks_created.is_empty() {
                    println!();
                    println!("{}", "Symlinks created:".dimmed());
                    for symlink in &report.symlinks_created {
                        println!("  {}", symlink.dimmed());
                    }
                }
            }
            ContextSubcommand::Analyze {
                scope,
                prompt,
                model,
                format,
            } => {
                let scope = match scope {
                    AnalyzeScope::User => Some(Scope::User),
                    AnalyzeScope::Project => Some(Scope::Project),
                    AnalyzeScope::All => None,
                };
                let analysis =
                    crate::context::assist::analyze_context(locations, scope, &prompt, model)
                        .await?;
                if format == AssistFormat::Json {
                    let payload = serde_json::json!({
                        "scope": analysis.scope,
                        "model": analysis.model,
                        "response": analysis.response,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    println!("{}", analysis.response);
                }
            }
            ContextSubcommand::Revise {
                scope,
                prompt,
                model,
                format,
            } => {
                let revision = crate::context::assist::revise_context(
                    locations,
                    Scope::from(scope),
                    &prompt,
                    model,
                )
                .await?;
                if format == AssistFormat::Json {
                    let payload = serde_json::json!({
                        "scope": revision.scope,
                        "file": revision.file,
                        "backup": revision.backup,
                        "model": revision.model,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    println!(
                        "{} Successfully revised {}",
                        "Success!".green(),
                        revision.file
                    );
                    println!("{}", format!("Backup: {}", revision.backup).dimmed());
                }
            }
            ContextSubcommand::FileNames(cmd) => {
                let store = SettingsStore::new(locations);
                match cmd.subcommand {
                    FileNamesSubcommand::List => {
                        let config = store.document_path(None)?;
                        println!("{} {}", "Config:".bold(), config.display());

                        let mut files =
                            read_string_list(&store, CONTEXT_FILE_NAMES_PATH, None)?;
                        if files.is_empty() {
                            println!("{}", "No context files configured.".yellow());
                            return Ok(());
                        }
                        files.sort();
                        print_single_column("File Name", &files);
                    }
                    FileNamesSubcommand::Add { filename } => {
                        let config = store.document_path(None)?;
                        if store.add_list_item(CONTEXT_FILE_NAMES_PATH, &filename, None)? {
                            println!("{} '{filename}' to {}", "Added".green(), config.display());
                        } else {
                            println!("'{filename}' is already in {}", config.display());
                        }
                    }
                    FileNamesSubcommand::Remove { filename } => {
                        let config = store.document_path(None)?;
                        if store.remove_list_item(CONTEXT_FILE_NAMES_PATH, &filename, None)? {
                            println!(
                                "{} '{filename}' from {}",
                                "Removed".green(),
                                config.display()
                            );
                        } else {
                            anyhow::bail!("File '{filename}' not found in {}", config.display());
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Render the per-scope status tables.
fn render_status(status: &ContextStatus) {
    println!("{} {}", "Working directory:".dimmed(), status.working_directory);
    if let Some(git_root) = &status.git_root {
        println!("{} {git_root}", "Git root:".dimmed());
    }
    println!();

    // User first, then project, regardless of map ordering.
    for name in [Scope::User.as_str(), Scope::Project.as_str()] {
        let Some(scope_status) = status.scopes.get(name) else {
            continue;
        };

        println!("{}", format!("{} Scope", scope_title(name)).bold());
        println!("{}", format!("{:<12}{:<20}{}", "File", "Status", "Details").bold());
        println!("{}", "-".repeat(44).bright_black());

        let files = &scope_status.files;
        for (file_name, info) in [
            (UNIFIED_FILE, &files.unified),
            (CLAUDE_FILE, &files.claude),
            (GEMINI_FILE, &files.gemini),
        ] {
            println!(
                "{}{}{}",
                format!("{file_name:<12}").cyan(),
                status_cell(info),
                details_cell(info).dimmed()
            );
        }
        println!("{}", format!("State: {}", scope_status.state).dimmed());
        println!();
    }
}

fn status_cell(info: &FileStatus) -> colored::ColoredString {
    let padded = format!("{:<20}", info.status);
    match info.status.as_str() {
        "missing" => padded.yellow(),
        "symlink (unified)" => padded.green(),
        "symlink (other)" => padded.red(),
        _ => padded.normal(),
    }
}

fn details_cell(info: &FileStatus) -> String {
    if info.is_symlink {
        format!("-> {}", info.symlink_target.as_deref().unwrap_or("?"))
    } else {
        info.path.clone()
    }
}

/// Capitalize a scope name for table titles.
fn scope_title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
