//! Slash command records
//!
//! A slash command is a TOML file with `description` and `prompt` keys,
//! stored under a scope's commands directory. The file's path relative to
//! that directory (minus the `.toml` extension) is the command's name, so
//! `git/commit.toml` is the namespaced command `git/commit`.
//!
//! The same name can exist in several scopes at once. Copies are only ever
//! related by explicit operations (`register`, `publish`, `install`); nothing
//! synchronizes them automatically. `list` reports a per-name `synced` flag
//! by hashing each present copy and checking that all hashes agree.

use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::utils::fs::{calculate_checksum, ensure_parent_dir, read_text_file, read_toml_file, write_toml_file};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Prompt text written when `add` is given no prompt.
pub const DEFAULT_PROMPT: &str = "Write your prompt here...";

/// A single command record as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// One-line description shown in listings
    pub description: String,
    /// The prompt text sent to the model when the command runs
    pub prompt: String,
}

impl CommandRecord {
    /// Build a record, substituting defaults for missing fields.
    #[must_use]
    pub fn with_defaults(name: &str, prompt: Option<&str>, description: Option<&str>) -> Self {
        Self {
            description: description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Command for {name}")),
            prompt: prompt.map(str::to_string).unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
        }
    }
}

/// Presence, content hash, and modification time of one scope's copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Whether the file exists in this scope
    pub exists: bool,
    /// SHA-256 of the file content, when it exists
    pub hash: Option<String>,
    /// Last modification time (RFC 3339), when it exists
    pub mtime: Option<String>,
}

impl FileInfo {
    /// Info for a scope where the file does not exist (or was not consulted).
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            exists: false,
            hash: None,
            mtime: None,
        }
    }

    /// Probe a path for existence, hash, and mtime.
    fn probe(path: &Path) -> Self {
        if !path.exists() {
            return Self::absent();
        }
        let hash = calculate_checksum(path).ok();
        let mtime = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(|modified| DateTime::<Local>::from(modified).to_rfc3339());
        Self {
            exists: true,
            hash,
            mtime,
        }
    }
}

/// One row of `cmds list` output
#[derive(Debug, Clone, Serialize)]
pub struct CommandListing {
    /// Relative (namespace-qualified) command name
    pub name: String,
    /// Whether every present copy among the consulted scopes has the same hash
    pub synced: bool,
    /// User-scope copy
    pub user: FileInfo,
    /// Registry-scope copy
    pub registry: FileInfo,
    /// Project-scope copy
    pub project: FileInfo,
}

/// File-backed command operations over the resolved [`Locations`].
pub struct CommandStore<'a> {
    locations: &'a Locations,
}

impl<'a> CommandStore<'a> {
    /// Create a store over the given locations.
    #[must_use]
    pub fn new(locations: &'a Locations) -> Self {
        Self {
            locations,
        }
    }

    /// The on-disk path of a command record in one scope.
    ///
    /// # Errors
    ///
    /// Fails for invalid names or when the scope's directory cannot be
    /// resolved (registry undiscovered).
    pub fn record_path(&self, name: &str, scope: Scope) -> Result<PathBuf, AicfgError> {
        validate_name(name)?;
        Ok(self.locations.commands_dir(scope)?.join(format!("{name}.toml")))
    }

    /// Write a new command record, substituting defaults for missing fields.
    ///
    /// An existing record with the same name is overwritten; `add` is the
    /// editing entry point as well as the creating one.
    ///
    /// # Errors
    ///
    /// Fails for invalid names, unresolvable scopes, or write failures.
    pub fn add(
        &self,
        name: &str,
        namespace: Option<&str>,
        prompt: Option<&str>,
        description: Option<&str>,
        scope: Scope,
    ) -> Result<PathBuf, AicfgError> {
        let qualified = qualify(name, namespace);
        let path = self.record_path(&qualified, scope)?;
        let record = CommandRecord::with_defaults(&qualified, prompt, description);
        write_toml_file(&path, &record).map_err(|e| AicfgError::FileSystemError {
            operation: "write command".to_string(),
            path: format!("{}: {e}", path.display()),
        })?;
        tracing::debug!(name = %qualified, scope = %scope, path = %path.display(), "Wrote command record");
        Ok(path)
    }

    /// Look up a command by precedence: project, then user, then registry.
    ///
    /// An undiscovered registry is treated as holding nothing rather than
    /// failing the lookup.
    ///
    /// # Errors
    ///
    /// Fails for invalid names or unreadable/unparseable records.
    pub fn get(&self, name: &str) -> Result<Option<(Scope, CommandRecord)>, AicfgError> {
        validate_name(name)?;
        for scope in Scope::PRECEDENCE {
            let Ok(path) = self.record_path(name, scope) else {
                continue;
            };
            if path.exists() {
                let record = read_toml_file(&path).map_err(|e| AicfgError::FileSystemError {
                    operation: "read command".to_string(),
                    path: format!("{}: {e}", path.display()),
                })?;
                return Ok(Some((scope, record)));
            }
        }
        Ok(None)
    }

    /// Enumerate command names across the selected scopes.
    ///
    /// With no explicit scope selection, all three scopes are consulted and
    /// an undiscovered registry is skipped silently. Explicitly requesting
    /// the registry scope surfaces the discovery failure instead.
    ///
    /// The `synced` flag considers only the consulted scopes: a name present
    /// in exactly one of them is synced by definition, and hashes must agree
    /// when more than one copy exists.
    ///
    /// # Errors
    ///
    /// Fails for malformed filter patterns or an explicitly requested but
    /// unavailable registry.
    pub fn list(
        &self,
        filter: Option<&str>,
        scopes: Option<&[Scope]>,
    ) -> Result<Vec<CommandListing>, AicfgError> {
        let pattern = filter
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| AicfgError::ConfigError {
                message: format!("Invalid filter pattern: {e}"),
            })?;

        let explicit = scopes.is_some();
        let active: Vec<Scope> =
            scopes.map_or_else(|| Scope::ALL.to_vec(), <[Scope]>::to_vec);

        // Scope -> commands dir, None when inactive or silently unavailable.
        let mut dirs: Vec<(Scope, Option<PathBuf>)> = Vec::with_capacity(Scope::ALL.len());
        for scope in Scope::ALL {
            if !active.contains(&scope) {
                dirs.push((scope, None));
                continue;
            }
            match self.locations.commands_dir(scope) {
                Ok(dir) => dirs.push((scope, Some(dir))),
                Err(e) if scope == Scope::Registry && !explicit => {
                    tracing::debug!(error = %e, "Registry unavailable, omitting from listing");
                    dirs.push((scope, None));
                }
                Err(e) => return Err(e),
            }
        }

        let mut names = BTreeSet::new();
        for (_, dir) in &dirs {
            let Some(dir) = dir else { continue };
            if !dir.exists() {
                continue;
            }
            for entry in WalkDir::new(dir)
                .follow_links(false)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == "toml")
                    && let Some(name) = relative_name(dir, path)
                {
                    names.insert(name);
                }
            }
        }

        let mut results = Vec::new();
        for name in names {
            if let Some(pattern) = &pattern
                && !pattern.matches(&name)
            {
                continue;
            }

            let mut infos = [FileInfo::absent(), FileInfo::absent(), FileInfo::absent()];
            for (slot, (_, dir)) in infos.iter_mut().zip(&dirs) {
                if let Some(dir) = dir {
                    *slot = FileInfo::probe(&dir.join(format!("{name}.toml")));
                }
            }
            let [user, project, registry] = infos;

            let present: BTreeSet<&String> = [&user, &registry, &project]
                .into_iter()
                .filter(|info| info.exists)
                .filter_map(|info| info.hash.as_ref())
                .collect();

            results.push(CommandListing {
                name,
                synced: present.len() <= 1,
                user,
                registry,
                project,
            });
        }
        Ok(results)
    }

    /// Delete a command from one scope, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Fails for invalid names, unresolvable scopes, or removal failures.
    pub fn delete(&self, name: &str, scope: Scope) -> Result<bool, AicfgError> {
        let path = self.record_path(name, scope)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| AicfgError::FileSystemError {
            operation: "remove command".to_string(),
            path: format!("{}: {e}", path.display()),
        })?;
        Ok(true)
    }

    /// Copy a command from user or project scope into the registry.
    ///
    /// With no explicit source scope the source is picked automatically;
    /// when both user and project copies exist with differing content that
    /// choice is ambiguous and reported as an error. An existing registry
    /// copy with different content is only overwritten with `update`.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or ambiguous, the registry is
    /// unavailable, or the registry copy differs without `update`.
    pub fn register(
        &self,
        name: &str,
        update: bool,
        source_scope: Option<Scope>,
    ) -> Result<PathBuf, AicfgError> {
        let source = self.resolve_register_source(name, source_scope)?;
        let target = self.record_path(name, Scope::Registry)?;

        if target.exists() && !update {
            let same = calculate_checksum(&source)
                .and_then(|src| Ok(src == calculate_checksum(&target)?))
                .unwrap_or(false);
            if !same {
                return Err(AicfgError::CommandExists {
                    name: name.to_string(),
                    scope: Scope::Registry.to_string(),
                });
            }
            return Ok(target);
        }

        copy_record(&source, &target)?;
        Ok(target)
    }

    fn resolve_register_source(
        &self,
        name: &str,
        source_scope: Option<Scope>,
    ) -> Result<PathBuf, AicfgError> {
        if let Some(scope) = source_scope {
            if scope == Scope::Registry {
                return Err(AicfgError::ConfigError {
                    message: "Source scope for register must be user or project".to_string(),
                });
            }
            let path = self.record_path(name, scope)?;
            if !path.exists() {
                return Err(AicfgError::CommandNotFoundInScope {
                    name: name.to_string(),
                    scope: scope.to_string(),
                });
            }
            return Ok(path);
        }

        let user = self.record_path(name, Scope::User)?;
        let project = self.record_path(name, Scope::Project)?;
        match (user.exists(), project.exists()) {
            (true, true) => {
                if calculate_checksum(&user).ok() == calculate_checksum(&project).ok() {
                    Ok(user)
                } else {
                    Err(AicfgError::AmbiguousSource {
                        name: name.to_string(),
                    })
                }
            }
            (true, false) => Ok(user),
            (false, true) => Ok(project),
            (false, false) => Err(AicfgError::CommandNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Copy a command from user scope into the registry.
    ///
    /// # Errors
    ///
    /// Fails when the user copy is missing or the registry is unavailable.
    pub fn publish(&self, name: &str) -> Result<PathBuf, AicfgError> {
        let source = self.record_path(name, Scope::User)?;
        if !source.exists() {
            return Err(AicfgError::CommandNotFoundInScope {
                name: name.to_string(),
                scope: Scope::User.to_string(),
            });
        }
        let target = self.record_path(name, Scope::Registry)?;
        copy_record(&source, &target)?;
        Ok(target)
    }

    /// Copy a command from the registry into user scope.
    ///
    /// # Errors
    ///
    /// Fails when the registry copy is missing or the registry is
    /// unavailable.
    pub fn install(&self, name: &str) -> Result<PathBuf, AicfgError> {
        let source = self.record_path(name, Scope::Registry)?;
        if !source.exists() {
            return Err(AicfgError::CommandNotFoundInScope {
                name: name.to_string(),
                scope: Scope::Registry.to_string(),
            });
        }
        let target = self.record_path(name, Scope::User)?;
        copy_record(&source, &target)?;
        Ok(target)
    }

    /// Raw registry and user file contents for external diffing.
    ///
    /// Returns `None` unless the command exists in both scopes.
    ///
    /// # Errors
    ///
    /// Fails for invalid names, an unavailable registry, or read failures.
    pub fn diff_sources(&self, name: &str) -> Result<Option<(String, String)>, AicfgError> {
        let registry = self.record_path(name, Scope::Registry)?;
        let user = self.record_path(name, Scope::User)?;
        if !registry.exists() || !user.exists() {
            return Ok(None);
        }
        let registry_content =
            read_text_file(&registry).map_err(|e| AicfgError::FileSystemError {
                operation: "read command".to_string(),
                path: format!("{}: {e}", registry.display()),
            })?;
        let user_content = read_text_file(&user).map_err(|e| AicfgError::FileSystemError {
            operation: "read command".to_string(),
            path: format!("{}: {e}", user.display()),
        })?;
        Ok(Some((registry_content, user_content)))
    }
}

/// Join an optional namespace onto a command name.
#[must_use]
pub fn qualify(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) if !namespace.is_empty() => format!("{namespace}/{name}"),
        _ => name.to_string(),
    }
}

fn validate_name(name: &str) -> Result<(), AicfgError> {
    let path = Path::new(name);
    let well_formed = !name.is_empty()
        && !name.ends_with('/')
        && path.components().all(|part| matches!(part, Component::Normal(_)));
    if well_formed {
        Ok(())
    } else {
        Err(AicfgError::InvalidCommandName {
            name: name.to_string(),
        })
    }
}

fn relative_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

fn copy_record(source: &Path, target: &Path) -> Result<(), AicfgError> {
    ensure_parent_dir(target).map_err(|e| AicfgError::FileSystemError {
        operation: "create directory".to_string(),
        path: format!("{}: {e}", target.display()),
    })?;
    fs::copy(source, target).map_err(|e| AicfgError::FileSystemError {
        operation: "copy command".to_string(),
        path: format!("{} -> {}: {e}", source.display(), target.display()),
    })?;
    Ok(())
}
