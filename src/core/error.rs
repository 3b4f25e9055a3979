//! Error handling for aicfg
//!
//! This module provides the error types and user-friendly error reporting for
//! the aicfg configuration manager. The error system is designed around two
//! core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`AicfgError`] - Enumerated error types for all failure cases in aicfg
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! aicfg errors are organized into the categories surfaced by the CLI:
//! - **Not found**: [`AicfgError::CommandNotFound`], [`AicfgError::ServerNotFound`], etc.
//! - **Already exists**: [`AicfgError::CommandExists`], [`AicfgError::ServerExists`]
//! - **Ambiguous source**: [`AicfgError::AmbiguousSource`]
//! - **Invalid input**: [`AicfgError::InvalidServerName`], [`AicfgError::UnknownAlias`], etc.
//! - **Connectivity**: [`AicfgError::StartupProbeFailed`], [`AicfgError::ApiRequestFailed`], etc.
//!
//! Common standard library and ecosystem errors are automatically converted:
//! - [`std::io::Error`] → [`AicfgError::IoError`]
//! - [`toml::de::Error`] → [`AicfgError::TomlError`]
//! - [`serde_json::Error`] → [`AicfgError::JsonError`]
//! - [`reqwest::Error`] → [`AicfgError::HttpError`]
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly format
//! with contextual suggestions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use aicfg_cli::core::{AicfgError, user_friendly_error};
//!
//! fn lookup() -> Result<(), AicfgError> {
//!     Err(AicfgError::CommandNotFound { name: "fix-bug".to_string() })
//! }
//!
//! match lookup() {
//!     Ok(()) => println!("Success!"),
//!     Err(e) => {
//!         let ctx = user_friendly_error(anyhow::Error::from(e));
//!         ctx.display(); // Shows colored error with suggestions
//!     }
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for aicfg operations
///
/// Each variant represents a specific failure mode and carries the details
/// needed to render a useful message. Errors are written for end users, not
/// just developers; [`user_friendly_error`] attaches suggestions per variant.
#[derive(Error, Debug)]
pub enum AicfgError {
    /// A command record was not found in any of the scopes that were searched
    #[error("Command '{name}' not found")]
    CommandNotFound {
        /// Relative (namespace-qualified) command name
        name: String,
    },

    /// A command record was not found in one specific scope
    ///
    /// Used by directional operations (`publish`, `install`, `remove`) where
    /// the source scope is fixed and the caller needs to know which copy is
    /// missing.
    #[error("Command '{name}' not found in {scope} scope")]
    CommandNotFoundInScope {
        /// Relative (namespace-qualified) command name
        name: String,
        /// Scope that was searched
        scope: String,
    },

    /// An MCP server entry was not found in the settings document
    #[error("MCP server '{name}' not found")]
    ServerNotFound {
        /// Registered server name
        name: String,
    },

    /// A context file required by the operation does not exist
    #[error("Context file not found: {path}")]
    ContextFileNotFound {
        /// Path that was expected to hold the context file
        path: String,
    },

    /// The registry repository could not be located or validated
    ///
    /// Registry discovery walks up from the executable looking for a
    /// version-controlled checkout; `AICFG_REPO_DIR` overrides it and
    /// `AICFG_SKIP_GIT_CHECK_FOR_TESTS` waives the `.git` requirement.
    #[error("Registry repository not found or not a git checkout: {path}")]
    RegistryNotFound {
        /// Candidate path that failed validation
        path: String,
    },

    /// A command record already exists where a new one would be written
    #[error("Command '{name}' already exists in {scope} scope")]
    CommandExists {
        /// Relative (namespace-qualified) command name
        name: String,
        /// Scope holding the conflicting copy
        scope: String,
    },

    /// An MCP server with this name is already registered in the target scope
    #[error("MCP server '{name}' is already registered")]
    ServerExists {
        /// Registered server name
        name: String,
    },

    /// User and project copies differ and no explicit source scope was given
    #[error("Ambiguous source for command '{name}': user and project copies differ")]
    AmbiguousSource {
        /// Relative (namespace-qualified) command name
        name: String,
    },

    /// Server name failed charset validation or was empty after trimming
    #[error("Invalid or empty server name: '{name}'")]
    InvalidServerName {
        /// The rejected name
        name: String,
    },

    /// Command name failed validation
    ///
    /// Names are relative paths under a commands directory; absolute paths
    /// and parent-directory components are rejected.
    #[error("Invalid command name: '{name}'")]
    InvalidCommandName {
        /// The rejected name
        name: String,
    },

    /// The alias is not declared in the settings alias registry
    #[error("Unknown setting alias '{alias}'")]
    UnknownAlias {
        /// The alias that was looked up
        alias: String,
    },

    /// A settings value could not be coerced to the alias's declared type
    #[error("Invalid value '{value}' for '{alias}': expected {expected}")]
    InvalidSettingValue {
        /// Alias being assigned
        alias: String,
        /// The raw input value
        value: String,
        /// Human description of the expected type
        expected: String,
    },

    /// No `-mcp` entry point was found in a repository's packaging metadata
    #[error("No MCP entry point found in {path}")]
    McpScriptNotFound {
        /// Repository path that was inspected
        path: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The startup probe did not get a well-formed JSON-RPC response
    ///
    /// Covers timeouts, non-JSON output, a missing `result`/`error` field,
    /// and subprocess spawn failures.
    #[error("Server startup check failed for '{command}': {reason}")]
    StartupProbeFailed {
        /// The command line that was probed
        command: String,
        /// Why the probe failed
        reason: String,
    },

    /// An executable referenced by a server entry is not in PATH
    #[error("Executable '{command}' not found in PATH")]
    ExecutableNotFound {
        /// The executable that could not be located
        command: String,
    },

    /// The assistant HTTP API returned an error or unusable payload
    #[error("Assistant API request failed: {reason}")]
    ApiRequestFailed {
        /// Why the request failed
        reason: String,
    },

    /// `GEMINI_API_KEY` is required but not set
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,

    /// A context file is a symlink to somewhere other than the shared file
    #[error("{path} is a symlink to {target}, expected {expected}")]
    ForeignSymlink {
        /// The symlink that was inspected
        path: String,
        /// Where the symlink actually points
        target: String,
        /// The shared context file it should point to
        expected: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was denied due to insufficient permissions
        operation: String,
        /// Path where permission was denied
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for AicfgError {
    fn clone(&self) -> Self {
        match self {
            Self::CommandNotFound {
                name,
            } => Self::CommandNotFound {
                name: name.clone(),
            },
            Self::CommandNotFoundInScope {
                name,
                scope,
            } => Self::CommandNotFoundInScope {
                name: name.clone(),
                scope: scope.clone(),
            },
            Self::ServerNotFound {
                name,
            } => Self::ServerNotFound {
                name: name.clone(),
            },
            Self::ContextFileNotFound {
                path,
            } => Self::ContextFileNotFound {
                path: path.clone(),
            },
            Self::RegistryNotFound {
                path,
            } => Self::RegistryNotFound {
                path: path.clone(),
            },
            Self::CommandExists {
                name,
                scope,
            } => Self::CommandExists {
                name: name.clone(),
                scope: scope.clone(),
            },
            Self::ServerExists {
                name,
            } => Self::ServerExists {
                name: name.clone(),
            },
            Self::AmbiguousSource {
                name,
            } => Self::AmbiguousSource {
                name: name.clone(),
            },
            Self::InvalidServerName {
                name,
            } => Self::InvalidServerName {
                name: name.clone(),
            },
            Self::InvalidCommandName {
                name,
            } => Self::InvalidCommandName {
                name: name.clone(),
            },
            Self::UnknownAlias {
                alias,
            } => Self::UnknownAlias {
                alias: alias.clone(),
            },
            Self::InvalidSettingValue {
                alias,
                value,
                expected,
            } => Self::InvalidSettingValue {
                alias: alias.clone(),
                value: value.clone(),
                expected: expected.clone(),
            },
            Self::McpScriptNotFound {
                path,
            } => Self::McpScriptNotFound {
                path: path.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::StartupProbeFailed {
                command,
                reason,
            } => Self::StartupProbeFailed {
                command: command.clone(),
                reason: reason.clone(),
            },
            Self::ExecutableNotFound {
                command,
            } => Self::ExecutableNotFound {
                command: command.clone(),
            },
            Self::ApiRequestFailed {
                reason,
            } => Self::ApiRequestFailed {
                reason: reason.clone(),
            },
            Self::MissingApiKey => Self::MissingApiKey,
            Self::ForeignSymlink {
                path,
                target,
                expected,
            } => Self::ForeignSymlink {
                path: path.clone(),
                target: target.clone(),
                expected: expected.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::PermissionDenied {
                operation,
                path,
            } => Self::PermissionDenied {
                operation: operation.clone(),
                path: path.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::TomlSerError(e) => Self::Other {
                message: format!("TOML serialization error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::HttpError(e) => Self::Other {
                message: format!("HTTP error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps an [`AicfgError`] and adds optional suggestions for
/// resolution and additional details. This is the primary way aicfg presents
/// errors to CLI users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use aicfg_cli::core::{AicfgError, ErrorContext};
///
/// let context = ErrorContext::new(AicfgError::MissingApiKey)
///     .with_suggestion("Export GEMINI_API_KEY before running context analyze/revise")
///     .with_details("The context assistant commands call the Gemini API");
///
/// context.display(); // Prints colored error to stderr
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying aicfg error
    pub error: AicfgError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from an [`AicfgError`]
    ///
    /// This creates a basic error context with no additional suggestions or
    /// details. Use [`with_suggestion`] and [`with_details`] to add
    /// user-friendly information.
    ///
    /// [`with_suggestion`]: ErrorContext::with_suggestion
    /// [`with_details`]: ErrorContext::with_details
    #[must_use]
    pub const fn new(error: AicfgError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps that users can take to resolve
    /// the error. They are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred or what it means.
    /// They are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Prints the error in red, details in yellow, and suggestion in green.
    /// This is the primary way aicfg presents errors to users in the CLI.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }

    /// Create an [`ErrorContext`] with only a suggestion (no specific error)
    pub fn suggestion(suggestion: impl Into<String>) -> Self {
        Self {
            error: AicfgError::Other {
                message: String::new(),
            },
            suggestion: Some(suggestion.into()),
            details: None,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Extension trait for converting [`AicfgError`] to [`anyhow::Error`] with context
pub trait IntoAnyhowWithContext {
    /// Convert the error to an [`anyhow::Error`] with the provided context
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error;
}

impl IntoAnyhowWithContext for AicfgError {
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error {
        anyhow::Error::new(ErrorContext {
            error: self,
            suggestion: context.suggestion,
            details: context.details,
        })
    }
}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly error messages for CLI display. It recognizes [`AicfgError`]
/// variants, common IO errors, and TOML/JSON parse errors, and attaches
/// appropriate context and suggestions.
///
/// # Examples
///
/// ```rust,no_run
/// use aicfg_cli::core::{AicfgError, user_friendly_error};
///
/// let error = AicfgError::MissingApiKey;
/// let context = user_friendly_error(anyhow::Error::from(error));
/// context.display(); // Shows API key setup suggestion
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Check for specific error types and provide helpful suggestions
    if let Some(aicfg_error) = error.downcast_ref::<AicfgError>() {
        return create_error_context(aicfg_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(AicfgError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership, or re-run with elevated permissions")
                .with_details(
                    "This error occurs when aicfg doesn't have permission to read or write files",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(AicfgError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            std::io::ErrorKind::AlreadyExists => {
                return ErrorContext::new(AicfgError::FileSystemError {
                    operation: "file creation".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Remove the existing file or use --update to overwrite")
                .with_details("The target file or directory already exists");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(AicfgError::TomlError(toml_error.clone()))
            .with_suggestion(
                "Check the TOML syntax of the command record. Verify quotes and key names",
            )
            .with_details(
                "Command records are TOML files with 'description' and 'prompt' string keys",
            );
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(AicfgError::Other {
            message: format!("JSON error: {json_error}"),
        })
        .with_suggestion("Check the settings.json syntax, or move the file aside to start fresh")
        .with_details("Settings documents must be valid JSON objects");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(AicfgError::Other {
        message,
    })
}

/// Create appropriate [`ErrorContext`] with suggestions for specific aicfg errors
///
/// Maps each [`AicfgError`] variant to a context with tailored suggestions and
/// details. Used by [`user_friendly_error`] to keep CLI messages consistent.
fn create_error_context(error: AicfgError) -> ErrorContext {
    match &error {
        AicfgError::CommandNotFound { name } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Run 'aicfg cmds list' to see available commands, or 'aicfg cmds add {name}' to create it"
            ))
            .with_details("Commands are looked up in project, user, then registry scope"),

        AicfgError::CommandNotFoundInScope { name, scope } => ErrorContext::new(error.clone())
            .with_suggestion(match scope.as_str() {
                "registry" => format!("Run 'aicfg cmds register {name}' to add it to the registry first"),
                _ => format!("Run 'aicfg cmds add {name}' to create it, or 'aicfg cmds install {name}' to copy it from the registry"),
            })
            .with_details("Directional copies require the source copy to exist"),

        AicfgError::ServerNotFound { name } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Run 'aicfg mcp list' to see registered servers. Check the scope with 'aicfg mcp show {name}'"
            )),

        AicfgError::RegistryNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Set AICFG_REPO_DIR to your registry checkout, or clone the registry repository")
            .with_details("The registry scope is a shared git repository holding .gemini/commands"),

        AicfgError::CommandExists { name, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Use 'aicfg cmds register {name} --update' to overwrite the registry copy"
            ))
            .with_details("Registry copies are only replaced when explicitly requested"),

        AicfgError::ServerExists { name } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Remove it first with 'aicfg mcp remove {name}', or register under a different --name"
            )),

        AicfgError::AmbiguousSource { name } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Pass --source-scope user or --source-scope project to 'aicfg cmds register {name}'"
            ))
            .with_details("The user and project copies have different content, so neither can be picked automatically"),

        AicfgError::InvalidServerName { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Server names may contain letters, digits, '-' and '_' only")
            ,

        AicfgError::UnknownAlias { alias } => {
            let ctx = ErrorContext::new(error.clone());
            match crate::settings::aliases::closest_alias(alias) {
                Some(candidate) => ctx.with_suggestion(format!("Did you mean '{candidate}'? Run 'aicfg settings list' to see all aliases")),
                None => ctx.with_suggestion("Run 'aicfg settings list' to see all aliases"),
            }
        }

        AicfgError::InvalidSettingValue { expected, .. } => ErrorContext::new(error.clone())
            .with_suggestion(match expected.as_str() {
                "boolean" => "Use one of: true, false, 1, 0, yes, no, on, off".to_string(),
                "integer" => "Pass a decimal integer, e.g. 120".to_string(),
                _ => format!("Pass a value of type {expected}"),
            }),

        AicfgError::McpScriptNotFound { path } => ErrorContext::new(error.clone())
            .with_suggestion("Pass the command explicitly with --command, or --url for remote servers")
            .with_details(format!(
                "Looked for a '-mcp' entry point in Cargo.toml, pyproject.toml and setup.py under {path}"
            )),

        AicfgError::StartupProbeFailed { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Run the server command manually to inspect its output, or pass --no-verify to skip the check")
            .with_details("A healthy stdio server answers a JSON-RPC initialize request on stdout within the timeout"),

        AicfgError::ExecutableNotFound { command } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Install '{command}' or make sure it is in your PATH"
            )),

        AicfgError::MissingApiKey => ErrorContext::new(error.clone())
            .with_suggestion("Export GEMINI_API_KEY with a valid API key")
            .with_details("The context analyze/revise commands call the Gemini generative language API"),

        AicfgError::ForeignSymlink { path, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Remove the symlink at {path} manually, then re-run unify"))
            .with_details("Unify refuses to replace symlinks it did not create"),

        AicfgError::PermissionDenied { operation, path } => ErrorContext::new(error.clone())
            .with_suggestion(match cfg!(windows) {
                true => "Run as Administrator or check file permissions in File Explorer",
                false => "Use 'sudo' or check file permissions with 'ls -la'",
            })
            .with_details(format!(
                "Cannot {operation} due to insufficient permissions on {path}"
            )),

        _ => ErrorContext::new(error.clone()),
    }
}
