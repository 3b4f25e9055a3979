//! aicfg - Configuration manager for the Gemini CLI
//!
//! A command-line tool and companion MCP server for managing Gemini CLI
//! configuration: slash-command snippets, aliased settings, MCP server
//! registrations, and the shared assistant context files.
//!
//! # Architecture Overview
//!
//! Every operation resolves against up to three scopes:
//! - **user**: the per-user configuration directory (`~/.gemini`), holding
//!   `settings.json` and private commands under `commands/`
//! - **project**: `<project-root>/.gemini` inside the enclosing git checkout,
//!   overriding the user scope where both define a value
//! - **registry**: a shared git repository of published commands, consulted
//!   for sync status and as the source/target of publish and install
//!
//! Commands are stored one TOML file per record; settings live in a nested
//! JSON document addressed through short aliases; MCP servers are entries in
//! the `mcpServers` map of the same document.
//!
//! ## Key Features
//!
//! - **Scoped resolution**: project settings override user settings at every
//!   nesting level; commands resolve project, then user, then registry
//! - **Sync detection**: command copies are compared by SHA-256 content hash,
//!   so listings show which scopes have drifted
//! - **Aliased settings**: short names (`vim-mode`, `log-level`) map to dotted
//!   paths with typed coercion for booleans, integers, and lists
//! - **MCP registration**: candidate servers are smoke-tested with a JSON-RPC
//!   initialize round trip before they are persisted
//! - **Context unification**: per-assistant context files (`CLAUDE.md`,
//!   `GEMINI.md`) can be merged into one `CONTEXT.md` behind symlinks, with
//!   assistant-backed analyze and revise helpers
//! - **Agent access**: the `aicfg-mcp` binary exposes the same operations as
//!   MCP tools so an agent can manage its own configuration
//!
//! # Core Modules
//!
//! ## Core Functionality
//! - [`cli`] - Command-line interface with grouped subcommands
//! - [`commands`] - Slash-command records and cross-scope copy operations
//! - [`config`] - Scope discovery and directory layout ([`config::Locations`])
//! - [`core`] - Core types, scopes, and error handling
//! - [`settings`] - Settings document access and the alias registry
//!
//! ## Assistant Integration
//! - [`context`] - Context file status, unification, and assisted revision
//! - [`mcp`] - MCP server registration and the startup probe
//! - [`server`] - The MCP stdio service behind `aicfg-mcp`
//!
//! ## Supporting Modules
//! - [`utils`] - File system helpers: atomic writes, checksums, symlinks
//!
//! # Command Record Format
//!
//! ```toml
//! description = "Summarize the current diff"
//! prompt = """
//! Summarize the staged changes as a conventional commit message.
//! """
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Create a private command and publish it to the registry
//! aicfg cmds add commit-msg "Write a commit message" --desc "Commit helper"
//! aicfg cmds publish commit-msg
//!
//! # Flip a setting by alias
//! aicfg settings set vim-mode true
//!
//! # Register an MCP server after a startup check
//! aicfg mcp add --command filesystem-mcp --scope user
//!
//! # Unify assistant context files behind CONTEXT.md
//! aicfg context unify --scope project
//! ```

// Core functionality modules
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod settings;

// Assistant integration
pub mod context;
pub mod mcp;
pub mod server;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
