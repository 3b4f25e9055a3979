//! Command-line interface for aicfg.
//!
//! This module contains all CLI command implementations for the Gemini CLI
//! configuration manager. Commands are grouped by the kind of record they
//! operate on, and each group lives in its own module with its own argument
//! structures and execution logic.
//!
//! # Command Groups
//!
//! ## Records
//! - `cmds` - Create, list, sync, and diff custom slash commands
//! - `settings` - Read and write settings through short aliases
//! - `mcp` - Register and inspect MCP server entries
//!
//! ## Settings-backed lists
//! - `paths` - Workspace include directories (`context.includeDirectories`)
//! - `allowed-tools` - Tools that run without confirmation (`tools.allowed`)
//!
//! ## Assistant context
//! - `context` - Inspect, unify, analyze, and revise context files
//!
//! # Usage Patterns
//!
//! ```bash
//! # Create a slash command and share it through the registry
//! aicfg cmds add fix-bug "Fix the bug described in the issue"
//! aicfg cmds register fix-bug
//!
//! # See where every command lives and whether the copies agree
//! aicfg cmds list
//!
//! # Flip a setting through its alias
//! aicfg settings set vim-mode true
//!
//! # Register this tool's own MCP server for the Gemini CLI
//! aicfg mcp add --self
//!
//! # Merge CLAUDE.md and GEMINI.md into a shared CONTEXT.md
//! aicfg context unify
//! ```
//!
//! # Global Options
//!
//! All subcommands inherit `--verbose` and `--quiet`, which map to tracing
//! filter levels. `RUST_LOG` takes precedence over both when set. Diagnostics
//! go to stderr; command output goes to stdout.

pub mod commands;
pub mod common;
pub mod context;
pub mod mcp;
pub mod paths;
pub mod settings;
pub mod tools;


use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Locations;
use crate::core::Scope;

/// Scope argument for operations limited to the user and project scopes.
///
/// The registry scope carries no settings document or context files, so
/// commands that only touch those accept this restricted pair instead of
/// [`Scope`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ScopeArg {
    /// Per-user configuration under the Gemini home directory
    User,
    /// Project-local configuration under `<project-root>/.gemini`
    Project,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::User => Scope::User,
            ScopeArg::Project => Scope::Project,
        }
    }
}

/// Main CLI application structure for aicfg.
///
/// This struct represents the top-level command-line interface for the Gemini
/// CLI configuration manager. It handles global flags and delegates to
/// subcommand groups for specific operations.
#[derive(Parser)]
#[command(
    name = "aicfg",
    about = "Configuration manager for the Gemini CLI",
    version,
    author,
    long_about = "aicfg manages Gemini CLI configuration across user, project, and registry scopes: \
                  custom slash commands, settings aliases, MCP server entries, and assistant context files."
)]
pub struct Cli {
    /// The subcommand group to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Takes precedence over `--quiet`.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all diagnostics except errors.
    ///
    /// Command output on stdout is unchanged; only stderr logging is reduced.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommand groups for the aicfg CLI.
#[derive(Subcommand)]
enum Commands {
    /// Manage custom slash commands across scopes.
    ///
    /// Commands are TOML records with `description` and `prompt` keys. The
    /// same name can exist in several scopes at once; listing reports whether
    /// the copies agree, and explicit operations move content between scopes.
    ///
    /// See [`commands::CmdsCommand`] for detailed options and behavior.
    Cmds(commands::CmdsCommand),

    /// Inspect and unify assistant context files.
    ///
    /// Reports the state of `CONTEXT.md`, `CLAUDE.md`, and `GEMINI.md` per
    /// scope, merges the per-assistant files into the shared one, and drives
    /// Gemini-assisted analysis and revision.
    ///
    /// See [`context::ContextCommand`] for detailed options and behavior.
    Context(context::ContextCommand),

    /// Manage workspace include directories.
    ///
    /// Thin wrapper over the `context.includeDirectories` list in the
    /// settings document.
    ///
    /// See [`paths::PathsCommand`] for detailed options and behavior.
    Paths(paths::PathsCommand),

    /// Manage the allowed-tools list.
    ///
    /// Thin wrapper over the `tools.allowed` list in the settings document.
    /// All operations require an explicit `--scope`.
    ///
    /// See [`tools::AllowedToolsCommand`] for detailed options and behavior.
    AllowedTools(tools::AllowedToolsCommand),

    /// Read and write settings through short aliases.
    ///
    /// Aliases map to dotted paths inside the JSON settings documents and
    /// carry a declared value type that drives input coercion.
    ///
    /// See [`settings::SettingsCommand`] for detailed options and behavior.
    Settings(settings::SettingsCommand),

    /// Register and inspect MCP server entries.
    ///
    /// Entries live under the `mcpServers` key of a scope's settings
    /// document. Process-based servers are smoke-tested with a JSON-RPC
    /// startup probe before anything is persisted.
    ///
    /// See [`mcp::McpCommand`] for detailed options and behavior.
    Mcp(mcp::McpCommand),
}

impl Cli {
    /// Execute the parsed CLI invocation.
    ///
    /// Initializes logging from the global flags, validates the alias
    /// registry, resolves the scope locations once, and dispatches to the
    /// selected subcommand group.
    ///
    /// # Errors
    ///
    /// Returns any error from scope resolution or the executed command; the
    /// binary converts these to user-friendly messages and exit code 1.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        crate::settings::aliases::validate_registry()?;

        let locations = Locations::from_env()?;
        tracing::debug!(
            user_dir = %locations.user_dir().display(),
            project_root = %locations.project_root().display(),
            "Resolved scope locations"
        );

        match self.command {
            Commands::Cmds(cmd) => cmd.execute(&locations).await,
            Commands::Context(cmd) => cmd.execute(&locations).await,
            Commands::Paths(cmd) => cmd.execute(&locations).await,
            Commands::AllowedTools(cmd) => cmd.execute(&locations).await,
            Commands::Settings(cmd) => cmd.execute(&locations).await,
            Commands::Mcp(cmd) => cmd.execute(&locations).await,
        }
    }
}

/// Install the tracing subscriber for this invocation.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` maps to `debug`, `--quiet`
/// to `error`, and the default is `warn`. Diagnostics go to stderr so stdout
/// stays clean for command output.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init so repeated calls inside one test process are harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
