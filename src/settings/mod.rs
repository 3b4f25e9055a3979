//! Settings document access
//!
//! Settings live in per-scope JSON documents (`settings.json` under the user
//! config directory and under the project's `.gemini/` directory). This module
//! reads and writes those documents, navigates dotted paths inside them, and
//! resolves the short aliases declared in [`aliases`].
//!
//! Reads are tolerant: a missing or unparseable document behaves as an empty
//! one, so `get` never fails on file state. Writes go through the atomic
//! helpers in [`crate::utils::fs`] with two-space indentation, matching what
//! the Gemini CLI itself produces.

pub mod aliases;

use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::utils::fs::{read_text_file, write_json_file};
use serde_json::{Map, Value};
use std::path::PathBuf;

pub use aliases::{AliasSpec, AliasType};

/// Dotted path of the allowed-tools list.
pub const ALLOWED_TOOLS_PATH: &str = "tools.allowed";

/// Dotted path of the workspace include-directories list.
pub const INCLUDE_DIRECTORIES_PATH: &str = "context.includeDirectories";

/// Dotted path of the context file-name list.
pub const CONTEXT_FILE_NAMES_PATH: &str = "context.fileName";

/// Read a value at a dotted path inside a settings document.
#[must_use]
pub fn get_by_path<'v>(document: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write a value at a dotted path, creating intermediate objects as needed.
///
/// # Errors
///
/// Fails when an intermediate segment already holds a non-object value, since
/// descending through it would discard user data.
pub fn set_by_path(
    document: &mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<(), AicfgError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = match segments.pop() {
        Some(last) if !last.is_empty() && !segments.iter().any(|s| s.is_empty()) => last,
        _ => {
            return Err(AicfgError::ConfigError {
                message: format!("Malformed settings path: '{path}'"),
            });
        }
    };

    let mut cursor = document;
    for segment in segments {
        let slot = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        cursor = slot.as_object_mut().ok_or_else(|| AicfgError::ConfigError {
            message: format!(
                "Cannot set '{path}': '{segment}' already holds a non-object value"
            ),
        })?;
    }
    cursor.insert(last.to_string(), value);
    Ok(())
}

/// Merge `overlay` into `base`, recursing through nested objects.
///
/// Non-object values in the overlay replace the base value outright, so a
/// project-level list shadows the user-level list rather than appending.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(key), overlay_value) {
            (Some(Value::Object(base_obj)), Value::Object(overlay_obj)) => {
                deep_merge(base_obj, overlay_obj);
            }
            _ => {
                base.insert(key.clone(), overlay_value.clone());
            }
        }
    }
}

/// Add or remove an item in a list-valued setting.
///
/// A scalar already stored at the path is normalized to a one-element list
/// before the membership change. Returns whether membership actually changed;
/// the normalized list is written back either way.
///
/// # Errors
///
/// Propagates [`set_by_path`] failures for malformed paths.
pub fn modify_list(
    document: &mut Map<String, Value>,
    path: &str,
    item: &str,
    add: bool,
) -> Result<bool, AicfgError> {
    let mut items: Vec<Value> = match get_by_path(document, path) {
        Some(Value::Array(existing)) => existing.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };

    let needle = Value::String(item.to_string());
    let present = items.contains(&needle);
    let changed = if add && !present {
        items.push(needle);
        true
    } else if !add && present {
        items.retain(|existing| *existing != Value::String(item.to_string()));
        true
    } else {
        false
    };

    set_by_path(document, path, Value::Array(items))?;
    Ok(changed)
}

/// Result of an alias-driven write
#[derive(Debug, Clone)]
pub struct SettingUpdate {
    /// Dotted path that was written
    pub path: String,
    /// The coerced value stored in the document
    pub value: Value,
    /// Whether the Gemini CLI must be restarted to pick up the change
    pub restart: bool,
}

/// One alias with its effective value, as shown by `settings list`
#[derive(Debug, Clone)]
pub struct AliasView {
    /// Registry row for the alias
    pub spec: &'static AliasSpec,
    /// Effective value, `None` when unset in every consulted scope
    pub value: Option<Value>,
}

/// File-backed settings operations over the resolved [`Locations`].
pub struct SettingsStore<'a> {
    locations: &'a Locations,
}

impl<'a> SettingsStore<'a> {
    /// Create a store over the given locations.
    #[must_use]
    pub fn new(locations: &'a Locations) -> Self {
        Self {
            locations,
        }
    }

    /// Resolve the document path for a scope (or the default scope rule).
    ///
    /// # Errors
    ///
    /// Fails for scopes that have no settings document.
    pub fn document_path(&self, scope: Option<Scope>) -> Result<PathBuf, AicfgError> {
        self.locations.settings_path(scope)
    }

    /// Load a scope's settings document.
    ///
    /// A missing file yields an empty document. An unparseable file or a
    /// non-object top level is logged and also yields an empty document, so
    /// a hand-edited broken file degrades to defaults instead of blocking
    /// every settings command.
    ///
    /// # Errors
    ///
    /// Fails only on scope resolution, never on file content.
    pub fn load(&self, scope: Option<Scope>) -> Result<Map<String, Value>, AicfgError> {
        let path = self.document_path(scope)?;
        if !path.exists() {
            return Ok(Map::new());
        }

        let raw = read_text_file(&path).map_err(|e| AicfgError::FileSystemError {
            operation: "read settings".to_string(),
            path: format!("{}: {e}", path.display()),
        })?;

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => {
                tracing::warn!(
                    path = %path.display(),
                    "Settings document is not a JSON object ({}), treating as empty",
                    json_type_name(&other)
                );
                Ok(Map::new())
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings document is not valid JSON, treating as empty"
                );
                Ok(Map::new())
            }
        }
    }

    /// Write a scope's settings document with two-space indentation.
    ///
    /// # Errors
    ///
    /// Fails on scope resolution or when the write cannot complete.
    pub fn save(
        &self,
        scope: Option<Scope>,
        document: &Map<String, Value>,
    ) -> Result<(), AicfgError> {
        let path = self.document_path(scope)?;
        write_json_file(&path, document, true).map_err(|e| AicfgError::FileSystemError {
            operation: "write settings".to_string(),
            path: format!("{}: {e}", path.display()),
        })
    }

    /// Read the value at a dotted path in one scope's document.
    ///
    /// # Errors
    ///
    /// Fails only on scope resolution.
    pub fn get(&self, path: &str, scope: Option<Scope>) -> Result<Option<Value>, AicfgError> {
        let document = self.load(scope)?;
        Ok(get_by_path(&document, path).cloned())
    }

    /// Write the value at a dotted path in one scope's document.
    ///
    /// # Errors
    ///
    /// Fails on scope resolution, malformed paths, or write failures.
    pub fn set(&self, path: &str, value: Value, scope: Option<Scope>) -> Result<(), AicfgError> {
        let mut document = self.load(scope)?;
        set_by_path(&mut document, path, value)?;
        self.save(scope, &document)
    }

    /// Read an aliased setting from one scope's document.
    ///
    /// # Errors
    ///
    /// Fails for unknown aliases or scope resolution.
    pub fn get_by_alias(
        &self,
        alias: &str,
        scope: Option<Scope>,
    ) -> Result<Option<Value>, AicfgError> {
        let spec = aliases::lookup(alias)?;
        self.get(spec.path, scope)
    }

    /// Coerce and write an aliased setting, reporting the restart flag.
    ///
    /// # Errors
    ///
    /// Fails for unknown aliases, uncoercible values, scope resolution, or
    /// write failures.
    pub fn set_by_alias(
        &self,
        alias: &str,
        raw: &str,
        scope: Option<Scope>,
    ) -> Result<SettingUpdate, AicfgError> {
        let spec = aliases::lookup(alias)?;
        let value = aliases::coerce_value(spec, raw)?;
        self.set(spec.path, value.clone(), scope)?;
        Ok(SettingUpdate {
            path: spec.path.to_string(),
            value,
            restart: spec.restart,
        })
    }

    /// Effective values for every registered alias in a scope.
    ///
    /// The project view is the user document with the project document merged
    /// over it, mirroring how the Gemini CLI resolves settings at runtime.
    /// The user view reads the user document alone.
    ///
    /// # Errors
    ///
    /// Fails only on scope resolution.
    pub fn list_by_alias(&self, scope: Scope) -> Result<Vec<AliasView>, AicfgError> {
        let document = match scope {
            Scope::Project => {
                let mut base = self.load(Some(Scope::User))?;
                let overlay = self.load(Some(Scope::Project))?;
                deep_merge(&mut base, &overlay);
                base
            }
            other => self.load(Some(other))?,
        };

        Ok(aliases::ALIASES
            .iter()
            .map(|spec| AliasView {
                spec,
                value: get_by_path(&document, spec.path).cloned(),
            })
            .collect())
    }

    /// Add an item to a list-valued setting, returning whether it was new.
    ///
    /// # Errors
    ///
    /// Fails on scope resolution, malformed paths, or write failures.
    pub fn add_list_item(
        &self,
        path: &str,
        item: &str,
        scope: Option<Scope>,
    ) -> Result<bool, AicfgError> {
        self.change_list(path, item, scope, true)
    }

    /// Remove an item from a list-valued setting, returning whether it was
    /// present.
    ///
    /// # Errors
    ///
    /// Fails on scope resolution, malformed paths, or write failures.
    pub fn remove_list_item(
        &self,
        path: &str,
        item: &str,
        scope: Option<Scope>,
    ) -> Result<bool, AicfgError> {
        self.change_list(path, item, scope, false)
    }

    fn change_list(
        &self,
        path: &str,
        item: &str,
        scope: Option<Scope>,
        add: bool,
    ) -> Result<bool, AicfgError> {
        let mut document = self.load(scope)?;
        let changed = modify_list(&mut document, path, item, add)?;
        self.save(scope, &document)?;
        Ok(changed)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
