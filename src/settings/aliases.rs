//! Static alias registry for settings access
//!
//! Every short alias the CLI accepts maps to a dotted path inside the
//! settings document, together with a declared value type and a flag for
//! whether the Gemini CLI must be restarted before the change takes effect.
//!
//! The registry is a compile-time table. [`validate_registry`] is called at
//! CLI startup and rejects duplicate aliases or empty paths, so a bad edit
//! here fails loudly instead of corrupting documents at runtime.

use crate::core::AicfgError;
use serde_json::Value;
use strsim::levenshtein;

/// Maximum allowed Levenshtein distance as a percentage of input length for
/// suggesting a near-miss alias in error messages.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Declared value type of an aliased setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasType {
    /// Truthy-string coercion: "true"/"1"/"yes"/"on" (case-insensitive)
    Bool,
    /// Decimal integer
    Int,
    /// Plain string, stored as-is
    String,
    /// Comma-separated input, stored as a list of trimmed strings
    List,
}

impl AliasType {
    /// Human name used in coercion error messages.
    #[must_use]
    pub const fn expected(&self) -> &'static str {
        match self {
            AliasType::Bool => "boolean",
            AliasType::Int => "integer",
            AliasType::String => "string",
            AliasType::List => "list",
        }
    }
}

/// One row of the alias registry
#[derive(Debug, Clone, Copy)]
pub struct AliasSpec {
    /// The short name accepted by the CLI
    pub alias: &'static str,
    /// Dotted path inside the settings document
    pub path: &'static str,
    /// Declared value type, drives input coercion
    pub value_type: AliasType,
    /// Whether the assistant must be restarted to pick up a change
    pub restart: bool,
    /// One-line description shown by `settings list`
    pub description: &'static str,
}

/// The alias registry, in the order `settings list` displays
pub static ALIASES: &[AliasSpec] = &[
    AliasSpec {
        alias: "preview-features",
        path: "general.previewFeatures",
        value_type: AliasType::Bool,
        restart: true,
        description: "Enable preview features",
    },
    AliasSpec {
        alias: "log-level",
        path: "general.logLevel",
        value_type: AliasType::String,
        restart: false,
        description: "Diagnostic log level",
    },
    AliasSpec {
        alias: "auto-update",
        path: "general.autoUpdate",
        value_type: AliasType::Bool,
        restart: false,
        description: "Check for updates on startup",
    },
    AliasSpec {
        alias: "vim-mode",
        path: "general.vimMode",
        value_type: AliasType::Bool,
        restart: false,
        description: "Vim keybindings in the input editor",
    },
    AliasSpec {
        alias: "theme",
        path: "ui.theme",
        value_type: AliasType::String,
        restart: false,
        description: "Color theme name",
    },
    AliasSpec {
        alias: "max-line-length",
        path: "terminal.maxLineLength",
        value_type: AliasType::Int,
        restart: false,
        description: "Wrap width for terminal output",
    },
    AliasSpec {
        alias: "max-session-turns",
        path: "model.maxSessionTurns",
        value_type: AliasType::Int,
        restart: false,
        description: "Turn limit per session (-1 for unlimited)",
    },
    AliasSpec {
        alias: "sandbox",
        path: "tools.sandbox",
        value_type: AliasType::Bool,
        restart: true,
        description: "Run tools inside the sandbox",
    },
    AliasSpec {
        alias: "allowed-tools",
        path: "tools.allowed",
        value_type: AliasType::List,
        restart: false,
        description: "Tools that run without a confirmation prompt",
    },
    AliasSpec {
        alias: "include-directories",
        path: "context.includeDirectories",
        value_type: AliasType::List,
        restart: false,
        description: "Extra directories added to the workspace context",
    },
    AliasSpec {
        alias: "context-file-names",
        path: "context.fileName",
        value_type: AliasType::List,
        restart: false,
        description: "Context file names loaded at startup",
    },
];

/// Look up an alias, returning its registry row.
///
/// # Errors
///
/// [`AicfgError::UnknownAlias`] when the alias is not declared.
pub fn lookup(alias: &str) -> Result<&'static AliasSpec, AicfgError> {
    ALIASES.iter().find(|spec| spec.alias == alias).ok_or_else(|| AicfgError::UnknownAlias {
        alias: alias.to_string(),
    })
}

/// Find the nearest declared alias to a misspelled input, if any is close.
#[must_use]
pub fn closest_alias(input: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .map(|spec| (spec.alias, levenshtein(input, spec.alias)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= input.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .map(|(alias, _)| alias)
}

/// Coerce a raw CLI string to the alias's declared type.
///
/// Boolean coercion never fails: any string outside the truthy set is
/// `false`. Integer parsing rejects non-decimal input. List input is split
/// on commas with surrounding whitespace trimmed.
///
/// # Errors
///
/// [`AicfgError::InvalidSettingValue`] when an integer fails to parse.
pub fn coerce_value(spec: &AliasSpec, raw: &str) -> Result<Value, AicfgError> {
    match spec.value_type {
        AliasType::Bool => {
            let truthy = matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
            Ok(Value::Bool(truthy))
        }
        AliasType::Int => {
            let parsed: i64 =
                raw.trim().parse().map_err(|_| AicfgError::InvalidSettingValue {
                    alias: spec.alias.to_string(),
                    value: raw.to_string(),
                    expected: spec.value_type.expected().to_string(),
                })?;
            Ok(Value::from(parsed))
        }
        AliasType::String => Ok(Value::String(raw.to_string())),
        AliasType::List => {
            let items: Vec<Value> =
                raw.split(',').map(|part| Value::String(part.trim().to_string())).collect();
            Ok(Value::Array(items))
        }
    }
}

/// Validate the registry for duplicate aliases and malformed paths.
///
/// Called once at CLI startup; a failure here is a programming error in the
/// table above, not a user mistake.
pub fn validate_registry() -> Result<(), AicfgError> {
    let mut seen = std::collections::HashSet::new();
    for spec in ALIASES {
        if spec.alias.is_empty() || spec.path.is_empty() {
            return Err(AicfgError::ConfigError {
                message: format!("Alias registry entry with empty alias or path: {spec:?}"),
            });
        }
        if spec.path.split('.').any(str::is_empty) {
            return Err(AicfgError::ConfigError {
                message: format!("Malformed dotted path in alias registry: {}", spec.path),
            });
        }
        if !seen.insert(spec.alias) {
            return Err(AicfgError::ConfigError {
                message: format!("Duplicate alias in registry: {}", spec.alias),
            });
        }
    }
    Ok(())
}
