//! MCP server management commands.
//!
//! The `mcp` group manages server entries under the `mcpServers` key of the
//! user and project settings documents. An entry is either process-based
//! (command plus arguments, spawned over stdio) or remote (a URL). New
//! process-based entries are smoke-tested with a JSON-RPC `initialize`
//! request before anything is written, so a broken registration never lands
//! in the settings file.
//!
//! # Examples
//!
//! ```bash
//! # Register an executable that is already on PATH
//! aicfg mcp add --command my-mcp-server
//!
//! # Register the server shipped by a local repository checkout
//! aicfg mcp add --path ~/code/weather-tools
//!
//! # Register this tool's own companion server
//! aicfg mcp add --self
//!
//! # Probe a command without registering anything
//! aicfg mcp check-startup my-mcp-server --port 8080
//! ```

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use super::ScopeArg;
use crate::config::Locations;
use crate::core::Scope;
use crate::mcp::{
    DEFAULT_PROBE_TIMEOUT, McpRegistrar, RegisterRequest, ServerConfig, ServerSource,
    check_startup,
};

/// Command for managing MCP server entries.
#[derive(Debug, clap::Parser)]
pub struct McpCommand {
    /// MCP server operation to perform
    #[command(subcommand)]
    subcommand: McpSubcommand,
}

/// Subcommands for MCP server management.
#[derive(Debug, Subcommand)]
enum McpSubcommand {
    /// Register a new MCP server.
    ///
    /// The server comes from exactly one of `--path`, `--command`, `--url`,
    /// or `--self`. Process-based servers are probed with an `initialize`
    /// request first; pass `--no-verify` to skip the probe.
    Add {
        /// Name for the server (derived from the command when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Local repository path whose packaging metadata names the server
        #[arg(long)]
        path: Option<String>,

        /// Existing command name on PATH
        #[arg(long)]
        command: Option<String>,

        /// Server URL for remote servers (requires --name)
        #[arg(long)]
        url: Option<String>,

        /// Register this tool's own companion server
        #[arg(long = "self")]
        self_server: bool,

        /// CLI arguments for the server, shell-style quoted
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,

        /// Where to save the entry
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,

        /// Startup probe timeout in seconds
        #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
        timeout: u64,

        /// Skip the startup probe
        #[arg(long)]
        no_verify: bool,
    },

    /// Remove an MCP server entry.
    Remove {
        /// Registered server name
        name: String,

        /// Scope to remove from
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,
    },

    /// List registered MCP servers.
    List {
        /// Scope to list (default: both)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,

        /// Filter by name, scope, or target (supports wildcards)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one server entry and probe its health.
    ///
    /// Without an explicit scope the project document is consulted first.
    Show {
        /// Registered server name
        name: String,

        /// Scope to look in
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Probe a server command with an initialize request.
    ///
    /// Spawns the command, sends a JSON-RPC `initialize` request on stdin,
    /// and reports whether a response came back. Nothing is registered.
    CheckStartup {
        /// Executable to spawn
        command: String,

        /// Arguments passed to the executable
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Probe timeout in seconds
        #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
        timeout: u64,
    },
}

impl McpCommand {
    /// Execute the MCP server operation.
    ///
    /// # Errors
    ///
    /// Returns an error for ambiguous or unresolvable sources, name
    /// collisions, failed startup probes, and settings document failures.
    pub async fn execute(self, locations: &Locations) -> Result<()> {
        let registrar = McpRegistrar::new(locations);

        match self.subcommand {
            McpSubcommand::Add {
                name,
                path,
                command,
                url,
                self_server,
                args,
                scope,
                timeout,
                no_verify,
            } => {
                let source = match (path, command, url, self_server) {
                    (Some(path), None, None, false) => {
                        ServerSource::RepoPath(PathBuf::from(shellexpand::tilde(&path).into_owned()))
                    }
                    (None, Some(command), None, false) => ServerSource::Command(command),
                    (None, None, Some(url), false) => ServerSource::Url(url),
                    (None, None, None, true) => ServerSource::SelfServer,
                    _ => anyhow::bail!(
                        "Exactly one of --path, --command, --url, or --self is required"
                    ),
                };

                let mut request = RegisterRequest::new(source, scope.into());
                request.name = name;
                request.args = args;
                request.verify = !no_verify;
                request.probe_timeout = Duration::from_secs(timeout);

                let registration = registrar.register(request).await?;
                println!(
                    "{} '{}' in {}",
                    "Registered".green(),
                    registration.name,
                    registration.path.display()
                );
                if registration.probe.is_some() {
                    println!("{} startup probe answered the initialize request", "✓".green());
                }
            }
            McpSubcommand::Remove { name, scope } => {
                let path = registrar.remove(&name, scope.into())?;
                println!("{} '{name}' from {}", "Removed".green(), path.display());
            }
            McpSubcommand::List { scope, filter } => {
                let label = match scope {
                    Some(ScopeArg::User) => "user",
                    Some(ScopeArg::Project) => "project",
                    None => "all",
                };
                let rows = registrar.list(scope.map(Scope::from), filter.as_deref())?;
                if rows.is_empty() {
                    println!("No MCP servers registered ({label}).");
                    return Ok(());
                }

                println!();
                println!("{}", format!("MCP Servers ({label})").cyan().bold());
                println!();
                let header = format!("{:<20}{:<10}{}", "Name", "Scope", "Command/URL");
                println!("{}", header.bold());
                println!("{}", "-".repeat(header.len()).bright_black());
                for row in &rows {
                    println!(
                        "{}{}{}",
                        format!("{:<20}", row.name).cyan(),
                        format!("{:<10}", row.scope),
                        row.config.target().green()
                    );
                }
            }
            McpSubcommand::Show { name, scope } => {
                let (scope, config) = registrar.get(&name, scope.map(Scope::from))?;
                println!("{} {name}", "Name:".bold());
                println!("{} {scope}", "Scope:".bold());
                match &config {
                    ServerConfig::Stdio { command, args } => {
                        println!("{} {command}", "Command:".bold());
                        if !args.is_empty() {
                            println!("{} {}", "Args:".bold(), args.join(" "));
                        }
                    }
                    ServerConfig::Remote { url } => {
                        println!("{} {url}", "URL:".bold());
                    }
                }

                // Remote servers are not probed; only stdio entries get a
                // health line.
                if let Some(argv) = config.probe_argv() {
                    match check_startup(&argv, DEFAULT_PROBE_TIMEOUT).await {
                        Ok(outcome) if outcome.success => {
                            println!(
                                "{} {} responds to initialize",
                                "Health:".bold(),
                                "✓".green()
                            );
                        }
                        Ok(outcome) => {
                            let reason =
                                outcome.error.unwrap_or_else(|| "no response".to_string());
                            println!("{} {} {reason}", "Health:".bold(), "✗".red());
                        }
                        Err(e) => {
                            println!("{} {} {e}", "Health:".bold(), "✗".red());
                        }
                    }
                }
            }
            McpSubcommand::CheckStartup {
                command,
                args,
                timeout,
            } => {
                let mut argv = vec![command.clone()];
                argv.extend(args);
                let outcome = check_startup(&argv, Duration::from_secs(timeout)).await?;
                let response = outcome.into_result(&command)?;
                println!("{} Server responded to initialize request", "✓".green());
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
        Ok(())
    }
}
