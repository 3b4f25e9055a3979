//! Core types and functionality for aicfg
//!
//! This module forms the foundation of aicfg's type system, providing the
//! error handling stack and the [`Scope`] abstraction used by every other
//! module.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! The error module provides:
//! - [`AicfgError`] - Enumerated error types covering all aicfg failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//! - [`IntoAnyhowWithContext`] - Extension trait for error conversion
//!
//! # Scopes
//!
//! Every record aicfg manages lives in one of three scopes:
//! - [`Scope::User`] - the per-user Gemini config directory (`~/.gemini`)
//! - [`Scope::Project`] - the `.gemini` directory of the enclosing project
//! - [`Scope::Registry`] - a shared git repository acting as a distribution
//!   point for commands
//!
//! Scope precedence for lookups is project > user > registry; copies between
//! scopes only ever happen through explicit operations.
//!
//! # Examples
//!
//! ```rust
//! use aicfg_cli::core::Scope;
//!
//! let scope: Scope = "project".parse().unwrap();
//! assert_eq!(scope, Scope::Project);
//! assert_eq!(scope.to_string(), "project");
//! ```

pub mod error;

pub use error::{AicfgError, ErrorContext, IntoAnyhowWithContext, user_friendly_error};

use serde::{Deserialize, Serialize};

/// Storage location for configuration records
///
/// Scopes order lookups and target writes. `list` style operations iterate
/// [`Scope::ALL`] so output ordering is stable across runs.
///
/// # Serialization
///
/// Scopes serialize as lowercase strings (`"user"`, `"project"`,
/// `"registry"`), matching both the CLI argument values and the JSON output
/// of listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Per-user configuration under the Gemini home directory
    User,
    /// Project-local configuration under `<project-root>/.gemini`
    Project,
    /// Shared registry repository used as a command distribution point
    Registry,
}

impl Scope {
    /// All scopes in display order
    pub const ALL: [Scope; 3] = [Scope::User, Scope::Project, Scope::Registry];

    /// Lookup precedence for `get` style operations
    pub const PRECEDENCE: [Scope; 3] = [Scope::Project, Scope::User, Scope::Registry];

    /// The lowercase name used in CLI arguments and messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Project => "project",
            Scope::Registry => "registry",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = AicfgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "project" => Ok(Scope::Project),
            "registry" => Ok(Scope::Registry),
            _ => Err(AicfgError::ConfigError {
                message: format!("Invalid scope '{s}' (expected user, project or registry)"),
            }),
        }
    }
}
