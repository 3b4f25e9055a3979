//! Unit test suite for aicfg
//!
//! SDK-level tests that drive the library crate directly, without spawning
//! the `aicfg` binary. Module-local behavior is covered by the `#[cfg(test)]`
//! blocks inside `src/`; this harness covers the flows that cross module
//! boundaries: scope fixtures shared between stores, sync status across
//! edits, and the settings document shared by the settings store and the
//! MCP registrar.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```

mod scope_sync_tests;
