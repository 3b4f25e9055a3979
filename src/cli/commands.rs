//! Slash command management commands.
//!
//! The `cmds` group operates on TOML command records across the user,
//! project, and registry scopes. A record can exist in several scopes at
//! once; `list` shows which copies agree, and `register`, `publish`,
//! `install`, and `diff` move and compare content between scopes.
//!
//! # Examples
//!
//! ```bash
//! # Create and inspect a command
//! aicfg cmds add fix-bug "Fix the bug described in the issue"
//! aicfg cmds show fix-bug
//!
//! # Compose the record in $EDITOR instead
//! aicfg cmds add release-notes --desc "Draft release notes"
//!
//! # Share through the registry and compare copies
//! aicfg cmds register fix-bug
//! aicfg cmds diff fix-bug
//! ```

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use similar::TextDiff;
use std::io::Write;

use super::ScopeArg;
use crate::commands::{CommandRecord, CommandStore, DEFAULT_PROMPT, FileInfo};
use crate::config::Locations;
use crate::core::{AicfgError, Scope};

/// Command for managing custom slash commands.
#[derive(Debug, clap::Parser)]
pub struct CmdsCommand {
    /// Slash command operation to perform
    #[command(subcommand)]
    subcommand: CmdsSubcommand,
}

/// Output format for `cmds list`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Text,
    /// Machine-readable JSON
    Json,
}

/// Subcommands for slash command management.
#[derive(Debug, Subcommand)]
enum CmdsSubcommand {
    /// Add a new command.
    ///
    /// With a prompt argument the record is written directly. Without one,
    /// a TOML template opens in `$EDITOR` (falling back to `$VISUAL`, then
    /// a platform default) and the edited content becomes the record.
    Add {
        /// Command name, optionally with a namespace path like `git/commit`
        name: String,

        /// Prompt text; omit to compose the record in your editor
        prompt: Option<String>,

        /// Description of the command
        #[arg(short = 'd', long = "desc")]
        desc: Option<String>,

        /// Where to create the command
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,

        /// Optional namespace (subdirectory) for the command
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },

    /// List all commands with their per-scope sync status.
    ///
    /// Each consulted scope gets a column: `-` means absent, a green check
    /// means every present copy has the same content hash, and a yellow `≠`
    /// marks names whose copies differ.
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Filter by name (supports wildcards e.g. 'commit*')
        #[arg(long)]
        filter: Option<String>,

        /// Filter by scope (can specify multiple)
        #[arg(long = "scope", value_enum)]
        scopes: Vec<Scope>,
    },

    /// Register a command from user/project scope to the registry.
    Register {
        /// Command name
        name: String,

        /// Overwrite if the command exists in the registry with different content
        #[arg(long)]
        update: bool,

        /// Explicitly choose the source scope for registration
        #[arg(long, value_enum)]
        source_scope: Option<ScopeArg>,
    },

    /// Show details of a command.
    ///
    /// Scope precedence is project, then user, then registry.
    Show {
        /// Command name
        name: String,
    },

    /// Remove a command from one scope.
    Remove {
        /// Command name
        name: String,

        /// Scope to remove from
        #[arg(long, value_enum, default_value = "user")]
        scope: Scope,
    },

    /// Publish a command from user scope to the registry.
    Publish {
        /// Command name
        name: String,
    },

    /// Install a command from the registry to user scope.
    Install {
        /// Command name
        name: String,
    },

    /// Show differences between the registry and user versions.
    Diff {
        /// Command name
        name: String,
    },
}

impl CmdsCommand {
    /// Execute the slash command operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store operation fails: missing
    /// commands, ambiguous registration sources, an unavailable registry, or
    /// file system failures.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let store = CommandStore::new(locations);

        match self.subcommand {
            CmdsSubcommand::Add {
                name,
                prompt,
                desc,
                scope,
                namespace,
            } => {
                let scope = Scope::from(scope);
                let (prompt, desc) = match prompt {
                    Some(prompt) => (prompt, desc),
                    None => match compose_in_editor(desc.as_deref())? {
                        Some(record) => (record.prompt, Some(record.description)),
                        None => {
                            println!("{} No content provided.", "Aborted.".red());
                            return Ok(());
                        }
                    },
                };
                let path =
                    store.add(&name, namespace.as_deref(), Some(&prompt), desc.as_deref(), scope)?;
                println!(
                    "{} {} (Scope: {})",
                    "Created".green(),
                    path.display(),
                    scope.as_str().to_uppercase().bold()
                );
            }
            CmdsSubcommand::List {
                format,
                filter,
                scopes,
            } => {
                let selection = if scopes.is_empty() { None } else { Some(scopes.as_slice()) };
                let listings = store.list(filter.as_deref(), selection)?;

                if format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&listings)?);
                    return Ok(());
                }

                let show = |scope: Scope| scopes.is_empty() || scopes.contains(&scope);
                println!();
                println!("{}", "Custom Slash Commands".cyan().bold());
                println!();

                let mut header = format!("{:<24}", "Command");
                for (scope, title) in [
                    (Scope::User, "User"),
                    (Scope::Registry, "Registry"),
                    (Scope::Project, "Project"),
                ] {
                    if show(scope) {
                        header.push_str(&format!("{title:<10}"));
                    }
                }
                println!("{}", header.bold());
                println!("{}", "-".repeat(header.trim_end().len()).bright_black());

                for listing in &listings {
                    print!("{:<24}", listing.name);
                    for (scope, info) in [
                        (Scope::User, &listing.user),
                        (Scope::Registry, &listing.registry),
                        (Scope::Project, &listing.project),
                    ] {
                        if show(scope) {
                            print!("{}", scope_cell(info, listing.synced));
                        }
                    }
                    println!();
                }
            }
            CmdsSubcommand::Register {
                name,
                update,
                source_scope,
            } => {
                let path = store.register(&name, update, source_scope.map(Scope::from))?;
                println!("{} '{name}' to {}", "Registered".green(), path.display());
                if let Some(parent) = path.parent() {
                    println!(
                        "{} Changes to the registry repo ({}) will need to be committed and pushed to GitHub.",
                        "Note:".blue(),
                        parent.display()
                    );
                }
            }
            CmdsSubcommand::Show { name } => {
                let (_, record) = store.get(&name)?.ok_or(AicfgError::CommandNotFound {
                    name: name.clone(),
                })?;
                println!("{} {}", "Description:".bold(), record.description);
                println!("{}", "Prompt:".bold());
                println!("{}", record.prompt);
            }
            CmdsSubcommand::Remove { name, scope } => {
                if store.delete(&name, scope)? {
                    println!("{} '{name}' from {scope} scope.", "Removed".green());
                } else {
                    return Err(AicfgError::CommandNotFoundInScope {
                        name,
                        scope: scope.to_string(),
                    }
                    .into());
                }
            }
            CmdsSubcommand::Publish { name } => {
                let path = store.publish(&name)?;
                println!("{} '{name}' to Registry ({})", "Published".green(), path.display());
            }
            CmdsSubcommand::Install { name } => {
                let path = store.install(&name)?;
                println!("{} '{name}' to User scope ({})", "Installed".green(), path.display());
            }
            CmdsSubcommand::Diff { name } => {
                let Some((registry_text, user_text)) = store.diff_sources(&name)? else {
                    println!(
                        "Command '{name}' cannot be diffed (must exist in both User and Registry)."
                    );
                    return Ok(());
                };
                print_unified_diff(&name, &registry_text, &user_text);
            }
        }
        Ok(())
    }
}

/// Table cell for one scope's copy, padded before coloring.
fn scope_cell(info: &FileInfo, synced: bool) -> colored::ColoredString {
    if !info.exists {
        format!("{:<10}", "-").dimmed()
    } else if synced {
        format!("{:<10}", "✓").green()
    } else {
        format!("{:<10}", "≠").yellow()
    }
}

/// Render a colored unified diff between the registry and user copies.
///
/// Identical content produces no hunks and therefore no output.
fn print_unified_diff(name: &str, registry_text: &str, user_text: &str) {
    let diff = TextDiff::from_lines(registry_text, user_text);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("Registry ({name})"), &format!("User ({name})"))
        .to_string();

    for line in unified.lines() {
        if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with('@') {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}

/// Open a TOML template in the user's editor and parse the result.
///
/// Returns `Ok(None)` when the user leaves the template unchanged or empties
/// it, which callers treat as an abort. The editor comes from `$EDITOR`, then
/// `$VISUAL`, then a platform default.
fn compose_in_editor(desc: Option<&str>) -> Result<Option<CommandRecord>> {
    let template = format!(
        "description = \"{}\"\nprompt = \"\"\"\n{}\n\"\"\"\n",
        desc.unwrap_or("My custom command"),
        DEFAULT_PROMPT
    );

    let mut file = tempfile::Builder::new()
        .prefix("aicfg-cmd-")
        .suffix(".toml")
        .tempfile()
        .context("Failed to create temporary file for editing")?;
    file.write_all(template.as_bytes())
        .context("Failed to write editor template")?;
    file.flush().context("Failed to flush editor template")?;

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        });

    let status = std::process::Command::new(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        anyhow::bail!("Editor exited with an error");
    }

    // Re-read through the path: editors that save via rename leave the
    // original handle pointing at the replaced inode.
    let edited = std::fs::read_to_string(file.path())
        .context("Failed to read edited command record")?;
    if edited.trim().is_empty() || edited == template {
        return Ok(None);
    }

    let record: CommandRecord =
        toml::from_str(&edited).map_err(|e| anyhow::anyhow!("Invalid TOML: {e}"))?;
    Ok(Some(record))
}
