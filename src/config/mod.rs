//! Configuration discovery for aicfg
//!
//! This module resolves where every scope lives on disk. All discovery state
//! is captured once in a [`Locations`] value that is threaded through the SDK
//! constructors; nothing else in the crate reads path environment variables.
//!
//! # Directory Layout
//!
//! | Scope    | Commands                              | Settings                              |
//! |----------|---------------------------------------|---------------------------------------|
//! | user     | `<user-dir>/commands/`                | `<user-dir>/settings.json`            |
//! | project  | `<project-root>/.gemini/commands/`    | `<project-root>/.gemini/settings.json`|
//! | registry | `<registry-root>/.gemini/commands/`   | (none)                                |
//!
//! # Environment Overrides
//!
//! - `AICFG_USER_DIR` - user config directory (default `~/.gemini`)
//! - `AICFG_PROJECT_DIR` - project root (default: git toplevel, then cwd)
//! - `AICFG_REPO_DIR` - registry repository root (default: discovered by
//!   walking up from the executable)
//! - `AICFG_SKIP_GIT_CHECK_FOR_TESTS` - waive the `.git` requirement during
//!   registry discovery
//!
//! # Examples
//!
//! ```rust,no_run
//! use aicfg_cli::config::Locations;
//! use aicfg_cli::core::Scope;
//!
//! # fn example() -> anyhow::Result<()> {
//! let locations = Locations::from_env()?;
//! let user_cmds = locations.commands_dir(Scope::User)?;
//! println!("user commands live in {}", user_cmds.display());
//! # Ok(())
//! # }
//! ```

use crate::core::{AicfgError, Scope};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolved filesystem locations for all three scopes
///
/// A `Locations` value is immutable once constructed. [`Locations::from_env`]
/// builds one from the process environment; tests and embedders use
/// [`Locations::new`] with explicit directories and never touch the
/// environment.
///
/// Registry discovery is allowed to fail at construction time; the failure
/// surfaces as [`AicfgError::RegistryNotFound`] only when a registry-scoped
/// operation actually needs the path.
#[derive(Debug, Clone)]
pub struct Locations {
    /// Home directory, used for user-scope context files
    home: PathBuf,
    /// User Gemini config directory (`~/.gemini` unless overridden)
    user_dir: PathBuf,
    /// Project root (git toplevel, override, or cwd)
    project_root: PathBuf,
    /// Registry repository root, when discovery succeeded
    registry: Option<PathBuf>,
    /// Candidate path reported when registry discovery failed
    registry_candidate: PathBuf,
}

impl Locations {
    /// Build locations from explicit directories.
    ///
    /// No environment variables are consulted and no validation is performed;
    /// the caller owns the layout. This is the constructor used by tests.
    #[must_use]
    pub fn new(
        home: impl Into<PathBuf>,
        user_dir: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
        registry: Option<PathBuf>,
    ) -> Self {
        let registry_candidate =
            registry.clone().unwrap_or_else(|| PathBuf::from("<unset>"));
        Self {
            home: home.into(),
            user_dir: user_dir.into(),
            project_root: project_root.into(),
            registry,
            registry_candidate,
        }
    }

    /// Build locations from the process environment.
    ///
    /// Reads the `AICFG_*` override variables once, runs project root
    /// discovery (`git rev-parse --show-toplevel`, falling back to the
    /// current directory) and registry discovery (walking up from the
    /// executable looking for a `.git` directory).
    ///
    /// # Errors
    ///
    /// Fails only when the home directory cannot be determined. A missing or
    /// invalid registry is recorded and reported later, since most commands
    /// never touch the registry scope.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        let user_dir = match std::env::var("AICFG_USER_DIR") {
            Ok(dir) if !dir.is_empty() => {
                PathBuf::from(shellexpand::tilde(&dir).into_owned())
            }
            _ => home.join(".gemini"),
        };

        let project_root = match std::env::var("AICFG_PROJECT_DIR") {
            Ok(dir) if !dir.is_empty() => {
                PathBuf::from(shellexpand::tilde(&dir).into_owned())
            }
            _ => discover_project_root(),
        };

        let skip_git_check = std::env::var("AICFG_SKIP_GIT_CHECK_FOR_TESTS")
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        let (registry, registry_candidate) = match std::env::var("AICFG_REPO_DIR") {
            // An explicit override is accepted as-is
            Ok(dir) if !dir.is_empty() => {
                let path = PathBuf::from(shellexpand::tilde(&dir).into_owned());
                (Some(path.clone()), path)
            }
            _ => discover_registry_root(skip_git_check),
        };

        debug!(
            user_dir = %user_dir.display(),
            project_root = %project_root.display(),
            registry = ?registry.as_ref().map(|p| p.display().to_string()),
            "resolved locations"
        );

        Ok(Self {
            home,
            user_dir,
            project_root,
            registry,
            registry_candidate,
        })
    }

    /// Home directory used for user-scope context files.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The user Gemini config directory.
    #[must_use]
    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    /// The project root directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The project's `.gemini` directory.
    #[must_use]
    pub fn project_gemini_dir(&self) -> PathBuf {
        self.project_root.join(".gemini")
    }

    /// The registry repository root.
    ///
    /// # Errors
    ///
    /// Returns [`AicfgError::RegistryNotFound`] when discovery failed and no
    /// `AICFG_REPO_DIR` override was given.
    pub fn registry_root(&self) -> Result<&Path, AicfgError> {
        self.registry.as_deref().ok_or_else(|| AicfgError::RegistryNotFound {
            path: self.registry_candidate.display().to_string(),
        })
    }

    /// The commands directory for a scope.
    ///
    /// The directory is not created here; writers call
    /// [`crate::utils::fs::ensure_dir`] as needed.
    pub fn commands_dir(&self, scope: Scope) -> Result<PathBuf, AicfgError> {
        match scope {
            Scope::User => Ok(self.user_dir.join("commands")),
            Scope::Project => Ok(self.project_gemini_dir().join("commands")),
            Scope::Registry => {
                Ok(self.registry_root()?.join(".gemini").join("commands"))
            }
        }
    }

    /// The settings document path for a scope.
    ///
    /// With no explicit scope, the project settings file wins if it exists,
    /// otherwise the user file is used. Absent files are fine; readers treat
    /// them as empty documents.
    ///
    /// # Errors
    ///
    /// Only [`Scope::Registry`] is rejected, since the registry holds no
    /// settings document.
    pub fn settings_path(&self, scope: Option<Scope>) -> Result<PathBuf, AicfgError> {
        match scope {
            Some(Scope::User) => Ok(self.user_dir.join("settings.json")),
            Some(Scope::Project) => Ok(self.project_gemini_dir().join("settings.json")),
            Some(Scope::Registry) => Err(AicfgError::ConfigError {
                message: "The registry scope has no settings document".to_string(),
            }),
            None => {
                let project = self.project_gemini_dir().join("settings.json");
                if project.exists() {
                    Ok(project)
                } else {
                    Ok(self.user_dir.join("settings.json"))
                }
            }
        }
    }
}

/// Discover the project root via git, falling back to the current directory.
fn discover_project_root() -> PathBuf {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output();

    if let Ok(output) = output
        && output.status.success()
        && let Ok(stdout) = String::from_utf8(output.stdout)
    {
        let root = stdout.trim();
        if !root.is_empty() {
            return PathBuf::from(root);
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Discover the registry root by walking up from the executable.
///
/// Returns the first ancestor containing a `.git` directory. With
/// `skip_git_check`, the marker requirement is waived and the executable's
/// directory itself is used.
fn discover_registry_root(skip_git_check: bool) -> (Option<PathBuf>, PathBuf) {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let Some(exe_dir) = exe_dir else {
        return (None, PathBuf::from("<unknown executable path>"));
    };

    for ancestor in exe_dir.ancestors() {
        if ancestor.join(".git").exists() {
            return (Some(ancestor.to_path_buf()), ancestor.to_path_buf());
        }
    }

    if skip_git_check {
        return (Some(exe_dir.clone()), exe_dir);
    }

    (None, exe_dir)
}
