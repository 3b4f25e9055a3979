//! Aliased settings commands.
//!
//! The `settings` group reads and writes the Gemini CLI's JSON settings
//! documents through a curated set of short aliases. Each alias maps to a
//! dotted path and carries a declared value type, so `settings set` can
//! coerce command-line strings into booleans, integers, and lists before
//! writing.
//!
//! For the full set of settings the Gemini CLI understands, see
//! <https://geminicli.com/docs/get-started/configuration/>. This group only
//! manages the aliased subset; arbitrary paths stay hand-edited.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::Value;

use super::ScopeArg;
use crate::config::Locations;
use crate::core::Scope;
use crate::settings::SettingsStore;

/// Command for reading and writing aliased settings.
#[derive(Debug, clap::Parser)]
pub struct SettingsCommand {
    /// Settings operation to perform
    #[command(subcommand)]
    subcommand: SettingsSubcommand,
}

/// Subcommands for aliased settings access.
#[derive(Debug, Subcommand)]
enum SettingsSubcommand {
    /// List all aliases with their paths, current values, and descriptions.
    ///
    /// Values reflect the active document: the project overlay merged onto
    /// the user document when a project settings file exists, the user
    /// document alone otherwise.
    List {
        /// Filter aliases by name or description
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Set a configuration value by its alias.
    ///
    /// The raw value is coerced to the alias's declared type: booleans
    /// accept true/false/1/0/yes/no, integers parse as decimal, and lists
    /// split on commas with trimming.
    Set {
        /// Setting alias (see `settings list`)
        alias: String,

        /// Raw value to coerce and write
        value: String,

        /// Scope to write to (default: project if its settings file exists, else user)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Read a configuration value by its alias.
    Get {
        /// Setting alias (see `settings list`)
        alias: String,

        /// Scope to read from (default: project if its settings file exists, else user)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
}

impl SettingsCommand {
    /// Execute the settings operation.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown aliases, values that cannot be coerced
    /// to the alias's declared type, or settings document write failures.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let store = SettingsStore::new(locations);

        match self.subcommand {
            SettingsSubcommand::List { filter } => {
                let active_path = store.document_path(None)?;
                let scope = if store.document_path(Some(Scope::Project))?.exists() {
                    Scope::Project
                } else {
                    Scope::User
                };
                let mut views = store.list_by_alias(scope)?;
                views.sort_by_key(|view| view.spec.alias);

                println!("{} {}", "Active Config:".bold(), active_path.display());
                println!();
                println!("{}", "Setting Aliases".cyan().bold());
                println!();

                let header = format!(
                    "{:<20}{:<28}{:<18}{}",
                    "Alias", "Path", "Value", "Description"
                );
                let rule_width = header.len();
                println!("{}", header.bold());
                println!("{}", "-".repeat(rule_width).bright_black());

                let needle = filter.map(|f| f.to_lowercase());
                for view in views {
                    if let Some(needle) = &needle
                        && !view.spec.alias.to_lowercase().contains(needle)
                        && !view.spec.description.to_lowercase().contains(needle)
                    {
                        continue;
                    }
                    let value_cell = match &view.value {
                        Some(value) => format!("{:<18}", render_value(value)).green(),
                        None => format!("{:<18}", "not set").dimmed(),
                    };
                    println!(
                        "{}{}{}{}",
                        format!("{:<20}", view.spec.alias).cyan(),
                        format!("{:<28}", view.spec.path).dimmed(),
                        value_cell,
                        view.spec.description.italic()
                    );
                }
            }
            SettingsSubcommand::Set { alias, value, scope } => {
                let update = store.set_by_alias(&alias, &value, scope.map(Scope::from))?;
                println!("{} {alias} = {}", "Set".green(), render_value(&update.value));
                if update.restart {
                    println!(
                        "{}",
                        "Note: You must /quit and run gemini -r to apply this change.".yellow()
                    );
                }
            }
            SettingsSubcommand::Get { alias, scope } => {
                match store.get_by_alias(&alias, scope.map(Scope::from))? {
                    Some(value) => println!("{}", render_value(&value)),
                    None => println!("{}", "not set".dimmed()),
                }
            }
        }
        Ok(())
    }
}

/// Render a settings value for display: strings bare, everything else as
/// compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
