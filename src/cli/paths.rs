//! Workspace include directory commands.
//!
//! The `paths` group manages the `context.includeDirectories` list in the
//! settings document. Directories on this list are added to the Gemini CLI's
//! workspace on startup. Without an explicit `--scope` the active document
//! is used: project when its settings file exists, user otherwise.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::common::{print_single_column, read_string_list};
use super::ScopeArg;
use crate::config::Locations;
use crate::core::Scope;
use crate::settings::{INCLUDE_DIRECTORIES_PATH, SettingsStore};

/// Command for managing workspace include directories.
#[derive(Debug, clap::Parser)]
pub struct PathsCommand {
    /// Include directory operation to perform
    #[command(subcommand)]
    subcommand: PathsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PathsSubcommand {
    /// List configured include directories.
    List {
        /// Explicit scope (default: project if its settings file exists, else user)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Add a directory to the include list.
    Add {
        /// Directory path to include (absolute or relative)
        path: String,

        /// Explicit scope (default: project if its settings file exists, else user)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Remove a directory from the include list.
    Remove {
        /// Directory path to remove
        path: String,

        /// Explicit scope (default: project if its settings file exists, else user)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
}

impl PathsCommand {
    /// Execute the include directory operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings document cannot be read or
    /// written, or when removing a path that is not on the list.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let store = SettingsStore::new(locations);

        match self.subcommand {
            PathsSubcommand::List { scope } => {
                let label = scope_label(scope);
                let scope = scope.map(Scope::from);
                let config = store.document_path(scope)?;
                println!("{} {}", format!("Config ({label}):").bold(), config.display());

                let mut dirs = read_string_list(&store, INCLUDE_DIRECTORIES_PATH, scope)?;
                if dirs.is_empty() {
                    println!("{}", "No paths configured.".yellow());
                    return Ok(());
                }
                dirs.sort();
                print_single_column("Path", &dirs);
            }
            PathsSubcommand::Add { path, scope } => {
                let scope = scope.map(Scope::from);
                let config = store.document_path(scope)?;
                if store.add_list_item(INCLUDE_DIRECTORIES_PATH, &path, scope)? {
                    println!("{} '{path}' to {}", "Added".green(), config.display());
                } else {
                    println!("'{path}' is already in {}", config.display());
                }
                println!(
                    "{} Run {} in Gemini to apply instantly.",
                    "Tip:".blue(),
                    format!("/dir add {path}").bold()
                );
            }
            PathsSubcommand::Remove { path, scope } => {
                let scope = scope.map(Scope::from);
                let config = store.document_path(scope)?;
                if store.remove_list_item(INCLUDE_DIRECTORIES_PATH, &path, scope)? {
                    println!("{} '{path}' from {}", "Removed".green(), config.display());
                    println!(
                        "{} Run {} in Gemini to apply instantly.",
                        "Tip:".blue(),
                        format!("/dir remove {path}").bold()
                    );
                } else {
                    anyhow::bail!("Path '{path}' not found in {}", config.display());
                }
            }
        }
        Ok(())
    }
}

/// Label for the `Config (...)` line: the explicit scope or `auto`.
fn scope_label(scope: Option<ScopeArg>) -> &'static str {
    match scope {
        Some(ScopeArg::User) => "user",
        Some(ScopeArg::Project) => "project",
        None => "auto",
    }
}
