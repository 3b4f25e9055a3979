//! aicfg CLI entry point
//!
//! This is the main executable for the Gemini CLI configuration manager.
//! It handles command-line argument parsing, error display, and command
//! execution.
//!
//! The CLI groups its operations by the kind of record they touch:
//! - `cmds` - Manage custom slash commands across scopes
//! - `context` - Inspect and unify assistant context files
//! - `paths` - Manage workspace include directories
//! - `allowed-tools` - Manage the tools allowed to run unconfirmed
//! - `settings` - Read and write settings through short aliases
//! - `mcp` - Register and inspect MCP server entries

use aicfg_cli::cli;
use aicfg_cli::core::error::user_friendly_error;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
