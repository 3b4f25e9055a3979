//! Allowed tools commands.
//!
//! The `allowed-tools` group manages the `tools.allowed` list in the
//! settings document. Tools on this list run without a confirmation prompt,
//! so every operation requires an explicit `--scope`; there is no automatic
//! scope fallback here.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::common::{print_single_column, read_string_list};
use super::ScopeArg;
use crate::config::Locations;
use crate::core::Scope;
use crate::settings::{ALLOWED_TOOLS_PATH, SettingsStore};

/// Command for managing the allowed-tools list.
#[derive(Debug, clap::Parser)]
pub struct AllowedToolsCommand {
    /// Allowed-tools operation to perform
    #[command(subcommand)]
    subcommand: AllowedToolsSubcommand,
}

#[derive(Debug, Subcommand)]
enum AllowedToolsSubcommand {
    /// List tools allowed to run without confirmation.
    List {
        /// Scope to read
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },

    /// Allow a tool to run without confirmation.
    ///
    /// Tool names may carry an argument matcher, e.g. `Shell(git status)`.
    Add {
        /// Tool name to allow
        tool: String,

        /// Scope to write
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },

    /// Remove a tool from the allowed list.
    Remove {
        /// Tool name to remove
        tool: String,

        /// Scope to write
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },
}

impl AllowedToolsCommand {
    /// Execute the allowed-tools operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings document cannot be read or
    /// written, or when removing a tool that is not on the list.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let store = SettingsStore::new(locations);

        match self.subcommand {
            AllowedToolsSubcommand::List { scope } => {
                let scope = Scope::from(scope);
                let config = store.document_path(Some(scope))?;
                println!("{} {}", format!("Config ({scope}):").bold(), config.display());

                let mut tools = read_string_list(&store, ALLOWED_TOOLS_PATH, Some(scope))?;
                if tools.is_empty() {
                    println!("{}", "No allowed tools configured.".yellow());
                    return Ok(());
                }
                tools.sort();
                print_single_column("Tool Name", &tools);
            }
            AllowedToolsSubcommand::Add { tool, scope } => {
                let scope = Some(Scope::from(scope));
                let config = store.document_path(scope)?;
                if store.add_list_item(ALLOWED_TOOLS_PATH, &tool, scope)? {
                    println!("{} '{tool}' to {}", "Added".green(), config.display());
                } else {
                    println!("'{tool}' is already in {}", config.display());
                }
            }
            AllowedToolsSubcommand::Remove { tool, scope } => {
                let scope = Some(Scope::from(scope));
                let config = store.document_path(scope)?;
                if store.remove_list_item(ALLOWED_TOOLS_PATH, &tool, scope)? {
                    println!("{} '{tool}' from {}", "Removed".green(), config.display());
                } else {
                    anyhow::bail!("Tool '{tool}' not found in {}", config.display());
                }
            }
        }
        Ok(())
    }
}
