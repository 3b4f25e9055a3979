//! MCP server registration
//!
//! Server entries live under the `mcpServers` key of a scope's settings
//! document. A process-based entry records a command plus its arguments; a
//! remote entry records a URL. Registration resolves the command from one of
//! four sources (an explicit command, a local repository's packaging
//! metadata, a URL, or this tool's own companion server), derives a name when
//! none is given, and smoke-tests process-based servers with a JSON-RPC
//! startup probe before anything is persisted.

pub mod probe;

use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::settings::SettingsStore;
use crate::utils::fs::read_text_file;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use probe::{DEFAULT_PROBE_TIMEOUT, ProbeOutcome, check_startup};

/// Settings key holding the server table.
pub const SERVERS_KEY: &str = "mcpServers";

/// Name of this tool's companion server binary.
pub const SELF_SERVER_COMMAND: &str = "aicfg-mcp";

/// One server entry as stored in a settings document
///
/// Entries written by other tools may carry extra keys; deserialization
/// ignores them rather than rejecting the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerConfig {
    /// A process-based (stdio) server
    Stdio {
        /// Executable to spawn
        command: String,
        /// Arguments passed to the executable
        #[serde(default)]
        args: Vec<String>,
    },
    /// A remote (HTTP) server
    Remote {
        /// Endpoint URL
        url: String,
    },
}

impl ServerConfig {
    /// The command line to probe, for process-based servers.
    #[must_use]
    pub fn probe_argv(&self) -> Option<Vec<String>> {
        match self {
            Self::Stdio {
                command,
                args,
            } => {
                let mut argv = vec![command.clone()];
                argv.extend(args.iter().cloned());
                Some(argv)
            }
            Self::Remote {
                ..
            } => None,
        }
    }

    /// The command-or-URL column shown in listings.
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::Stdio {
                command,
                args,
            } => {
                if args.is_empty() {
                    command.clone()
                } else {
                    format!("{command} {}", args.join(" "))
                }
            }
            Self::Remote {
                url,
            } => url.clone(),
        }
    }
}

/// Where a new server entry comes from
#[derive(Debug, Clone)]
pub enum ServerSource {
    /// An executable already on `PATH`
    Command(String),
    /// A local repository whose packaging metadata names an `*-mcp` script
    RepoPath(PathBuf),
    /// A remote server URL
    Url(String),
    /// This tool's own companion server
    SelfServer,
}

/// Everything `mcp add` needs to resolve and persist an entry
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Source the command or URL is resolved from
    pub source: ServerSource,
    /// Explicit server name, overriding derivation
    pub name: Option<String>,
    /// Extra arguments for process-based servers, shell-style quoted
    pub args: Option<String>,
    /// Scope whose settings document receives the entry
    pub scope: Scope,
    /// Whether to run the startup probe before persisting
    pub verify: bool,
    /// Startup probe timeout
    pub probe_timeout: Duration,
}

impl RegisterRequest {
    /// A request with default verification settings.
    #[must_use]
    pub fn new(source: ServerSource, scope: Scope) -> Self {
        Self {
            source,
            name: None,
            args: None,
            scope,
            verify: true,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    /// Name the entry was stored under
    pub name: String,
    /// Scope that received the entry
    pub scope: Scope,
    /// Settings document that was written
    pub path: PathBuf,
    /// The persisted entry
    pub config: ServerConfig,
    /// Probe result, when a probe ran
    pub probe: Option<ProbeOutcome>,
}

/// One row of `mcp list` output
#[derive(Debug, Clone)]
pub struct ListedServer {
    /// Registered name
    pub name: String,
    /// Scope the entry lives in
    pub scope: Scope,
    /// The entry itself
    pub config: ServerConfig,
}

/// Registrar over the `mcpServers` tables of the user and project documents.
pub struct McpRegistrar<'a> {
    locations: &'a Locations,
}

impl<'a> McpRegistrar<'a> {
    /// Create a registrar over the given locations.
    #[must_use]
    pub fn new(locations: &'a Locations) -> Self {
        Self {
            locations,
        }
    }

    /// All entries in one scope's settings document.
    ///
    /// # Errors
    ///
    /// Fails on scope resolution; a document without a server table yields
    /// an empty map.
    pub fn servers(&self, scope: Scope) -> Result<BTreeMap<String, ServerConfig>, AicfgError> {
        let store = SettingsStore::new(self.locations);
        let document = store.load(Some(scope))?;
        let Some(Value::Object(table)) = document.get(SERVERS_KEY) else {
            return Ok(BTreeMap::new());
        };

        let mut servers = BTreeMap::new();
        for (name, raw) in table {
            match serde_json::from_value::<ServerConfig>(raw.clone()) {
                Ok(config) => {
                    servers.insert(name.clone(), config);
                }
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Skipping unrecognized server entry");
                }
            }
        }
        Ok(servers)
    }

    /// Resolve, optionally probe, and persist a new server entry.
    ///
    /// # Errors
    ///
    /// Fails for invalid or missing names, an already-registered name, an
    /// unresolvable source, or a failed startup probe.
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, AicfgError> {
        let (config, derived_name) = self.resolve_source(&request)?;

        let name = match &request.name {
            Some(explicit) => validate_name(explicit)?,
            None => match derived_name {
                Some(derived) => validate_name(&derived)?,
                None => {
                    return Err(AicfgError::ConfigError {
                        message: "A --name is required when registering a URL server".to_string(),
                    });
                }
            },
        };

        if self.servers(request.scope)?.contains_key(&name) {
            return Err(AicfgError::ServerExists {
                name,
            });
        }

        let probe_outcome = if request.verify
            && let Some(argv) = config.probe_argv()
        {
            let outcome = check_startup(&argv, request.probe_timeout).await?;
            if !outcome.success {
                return Err(AicfgError::StartupProbeFailed {
                    command: argv.join(" "),
                    reason: outcome.error.unwrap_or_else(|| "no response".to_string()),
                });
            }
            Some(outcome)
        } else {
            None
        };

        let path = self.persist(&name, &config, request.scope)?;
        tracing::info!(name = %name, scope = %request.scope, "Registered MCP server");

        Ok(Registration {
            name,
            scope: request.scope,
            path,
            config,
            probe: probe_outcome,
        })
    }

    /// Remove an entry by name, returning the document that was updated.
    ///
    /// # Errors
    ///
    /// Fails when no entry with that name exists in the scope.
    pub fn remove(&self, name: &str, scope: Scope) -> Result<PathBuf, AicfgError> {
        let store = SettingsStore::new(self.locations);
        let mut document = store.load(Some(scope))?;

        let removed = match document.get_mut(SERVERS_KEY) {
            Some(Value::Object(table)) => table.remove(name).is_some(),
            _ => false,
        };
        if !removed {
            return Err(AicfgError::ServerNotFound {
                name: name.to_string(),
            });
        }

        store.save(Some(scope), &document)?;
        store.document_path(Some(scope))
    }

    /// Enumerate entries across one or both scopes.
    ///
    /// The filter is a case-insensitive wildcard matched against the name,
    /// scope, and command-or-URL columns; a row survives when any column
    /// matches.
    ///
    /// # Errors
    ///
    /// Fails for malformed filter patterns or scope resolution.
    pub fn list(
        &self,
        scope: Option<Scope>,
        filter: Option<&str>,
    ) -> Result<Vec<ListedServer>, AicfgError> {
        let pattern = filter
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| AicfgError::ConfigError {
                message: format!("Invalid filter pattern: {e}"),
            })?;
        let options = glob::MatchOptions {
            case_sensitive: false,
            ..glob::MatchOptions::new()
        };

        let scopes: Vec<Scope> = match scope {
            Some(scope) => vec![scope],
            None => vec![Scope::User, Scope::Project],
        };

        let mut rows = Vec::new();
        for scope in scopes {
            for (name, config) in self.servers(scope)? {
                let row = ListedServer {
                    name,
                    scope,
                    config,
                };
                let keep = pattern.as_ref().is_none_or(|pattern| {
                    [row.name.as_str(), row.scope.as_str(), &row.config.target()]
                        .iter()
                        .any(|column| pattern.matches_with(column, options))
                });
                if keep {
                    rows.push(row);
                }
            }
        }
        Ok(rows)
    }

    /// Look up one entry by name.
    ///
    /// Without an explicit scope the project document is consulted first,
    /// mirroring settings precedence.
    ///
    /// # Errors
    ///
    /// Fails when the name is not registered in any consulted scope.
    pub fn get(
        &self,
        name: &str,
        scope: Option<Scope>,
    ) -> Result<(Scope, ServerConfig), AicfgError> {
        let scopes: Vec<Scope> = match scope {
            Some(scope) => vec![scope],
            None => vec![Scope::Project, Scope::User],
        };
        for scope in scopes {
            if let Some(config) = self.servers(scope)?.remove(name) {
                return Ok((scope, config));
            }
        }
        Err(AicfgError::ServerNotFound {
            name: name.to_string(),
        })
    }

    fn resolve_source(
        &self,
        request: &RegisterRequest,
    ) -> Result<(ServerConfig, Option<String>), AicfgError> {
        let args = match &request.args {
            Some(raw) => shell_words::split(raw).map_err(|e| AicfgError::ConfigError {
                message: format!("Invalid server arguments: {e}"),
            })?,
            None => Vec::new(),
        };

        match &request.source {
            ServerSource::Command(command) => {
                if which::which(command).is_err() {
                    return Err(AicfgError::ExecutableNotFound {
                        command: command.clone(),
                    });
                }
                let derived = derive_name(command);
                Ok((
                    ServerConfig::Stdio {
                        command: command.clone(),
                        args,
                    },
                    Some(derived),
                ))
            }
            ServerSource::RepoPath(repo) => {
                let script = find_mcp_script(repo)?;
                let derived = derive_name(&script);
                Ok((
                    ServerConfig::Stdio {
                        command: script,
                        args,
                    },
                    Some(derived),
                ))
            }
            ServerSource::Url(url) => {
                if !args.is_empty() {
                    return Err(AicfgError::ConfigError {
                        message: "URL servers do not take command arguments".to_string(),
                    });
                }
                Ok((
                    ServerConfig::Remote {
                        url: url.clone(),
                    },
                    None,
                ))
            }
            ServerSource::SelfServer => {
                if which::which(SELF_SERVER_COMMAND).is_err() {
                    tracing::warn!(
                        "'{SELF_SERVER_COMMAND}' is not on PATH; the entry will not work until it is installed"
                    );
                }
                Ok((
                    ServerConfig::Stdio {
                        command: SELF_SERVER_COMMAND.to_string(),
                        args,
                    },
                    Some("aicfg".to_string()),
                ))
            }
        }
    }

    fn persist(
        &self,
        name: &str,
        config: &ServerConfig,
        scope: Scope,
    ) -> Result<PathBuf, AicfgError> {
        let store = SettingsStore::new(self.locations);
        let mut document = store.load(Some(scope))?;

        let table = document
            .entry(SERVERS_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let table = table.as_object_mut().ok_or_else(|| AicfgError::ConfigError {
            message: format!("'{SERVERS_KEY}' in the settings document is not an object"),
        })?;
        table.insert(name.to_string(), serde_json::to_value(config)?);

        store.save(Some(scope), &document)?;
        store.document_path(Some(scope))
    }
}

/// Derive a server name from a command by dropping `mcp` tokens.
///
/// `mcp-my-mcp-tool-mcp` becomes `my-tool`; a command with no `mcp` tokens
/// is used as-is.
#[must_use]
pub fn derive_name(command: &str) -> String {
    let base = Path::new(command)
        .file_stem()
        .map_or_else(|| command.to_string(), |stem| stem.to_string_lossy().into_owned());
    base.split('-')
        .filter(|token| !token.eq_ignore_ascii_case("mcp") && !token.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Trim and validate an explicit or derived server name.
///
/// # Errors
///
/// Fails when the trimmed name is empty or holds characters outside
/// `[A-Za-z0-9_-]`.
pub fn validate_name(name: &str) -> Result<String, AicfgError> {
    let trimmed = name.trim();
    let charset = Regex::new(r"^[A-Za-z0-9_-]+$").map_err(|e| AicfgError::ConfigError {
        message: format!("Invalid name pattern: {e}"),
    })?;
    if trimmed.is_empty() || !charset.is_match(trimmed) {
        return Err(AicfgError::InvalidServerName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Find the `*-mcp` script a repository's packaging metadata declares.
///
/// Checks `pyproject.toml`, `setup.py`, and `Cargo.toml` in that order and
/// returns the first script-like token ending in `-mcp`.
fn find_mcp_script(repo: &Path) -> Result<String, AicfgError> {
    if !repo.is_dir() {
        return Err(AicfgError::ConfigError {
            message: format!("Repository path does not exist: {}", repo.display()),
        });
    }

    let script = Regex::new(r"([A-Za-z0-9][A-Za-z0-9_-]*-mcp)\b").map_err(|e| {
        AicfgError::ConfigError {
            message: format!("Invalid script pattern: {e}"),
        }
    })?;

    for candidate in ["pyproject.toml", "setup.py", "Cargo.toml"] {
        let path = repo.join(candidate);
        if !path.exists() {
            continue;
        }
        let content = read_text_file(&path).map_err(|e| AicfgError::FileSystemError {
            operation: "read packaging metadata".to_string(),
            path: format!("{}: {e}", path.display()),
        })?;
        if let Some(captures) = script.captures(&content) {
            let found = captures[1].to_string();
            tracing::debug!(script = %found, file = %path.display(), "Found MCP entry point");
            return Ok(found);
        }
    }

    Err(AicfgError::McpScriptNotFound {
        path: repo.display().to_string(),
    })
}
