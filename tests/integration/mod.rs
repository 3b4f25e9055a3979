//! Integration test suite for aicfg
//!
//! This test suite contains end-to-end integration tests that spawn the
//! `aicfg` binary against isolated scope directories and verify the complete
//! functionality of its commands. These tests run relatively quickly and are
//! executed in CI on every commit.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by command group:
//! - **commands**: Slash command records across scopes (add, list, register,
//!   publish, install, diff)
//! - **settings**: Alias-based settings access and coercion
//! - **paths**: Include directories and allowed tools lists
//! - **context**: Context file status, names, and unification
//! - **mcp**: MCP server registration and startup probing

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

// Integration tests
mod commands;
mod context;
mod mcp;
mod paths;
mod settings;
