//! Context file inspection and unification
//!
//! Each scope carries up to three assistant context files: the shared
//! `CONTEXT.md` under `.config/ai-common/`, plus the per-assistant
//! `CLAUDE.md` and `GEMINI.md`. [`ContextManager::status`] reports how far a
//! scope is from the unified layout, and [`ContextManager::unify`] merges the
//! per-assistant files into the shared one and replaces them with symlinks.
//!
//! The user scope anchors at the home directory; the project scope mirrors
//! the same layout under the project root.

pub mod assist;

use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::utils::fs::{create_symlink, ensure_parent_dir, read_text_file, write_text_file};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Shared context file name.
pub const UNIFIED_FILE: &str = "CONTEXT.md";

/// Claude's per-assistant context file name.
pub const CLAUDE_FILE: &str = "CLAUDE.md";

/// Gemini's per-assistant context file name.
pub const GEMINI_FILE: &str = "GEMINI.md";

/// How far a scope is from the unified layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnifyState {
    /// Shared file exists and both assistant files are symlinks to it
    Unified,
    /// Exactly one assistant file is a symlink to the shared file
    Partial,
    /// Shared file exists but neither assistant file links to it
    ContextOnly,
    /// No shared file and no symlinks
    NotUnified,
}

impl UnifyState {
    /// The state as its serialized string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unified => "unified",
            Self::Partial => "partial",
            Self::ContextOnly => "context_only",
            Self::NotUnified => "not_unified",
        }
    }
}

impl std::fmt::Display for UnifyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inspection result for one context file
#[derive(Debug, Clone, Serialize)]
pub struct FileStatus {
    /// Home-contracted display path
    pub path: String,
    /// Absolute path
    pub absolute_path: String,
    /// Whether the path resolves to an existing file
    pub exists: bool,
    /// One of `missing`, `present`, `symlink (unified)`, `symlink (other)`
    pub status: String,
    /// Whether the path is a symlink
    pub is_symlink: bool,
    /// Resolved symlink target, when a symlink
    pub symlink_target: Option<String>,
    /// Whether the symlink resolves to the shared context file
    pub points_to_unified: bool,
}

/// The three file statuses of one scope
#[derive(Debug, Clone, Serialize)]
pub struct ScopeFiles {
    /// The shared `CONTEXT.md`
    #[serde(rename = "CONTEXT.md")]
    pub unified: FileStatus,
    /// The per-assistant `CLAUDE.md`
    #[serde(rename = "CLAUDE.md")]
    pub claude: FileStatus,
    /// The per-assistant `GEMINI.md`
    #[serde(rename = "GEMINI.md")]
    pub gemini: FileStatus,
}

/// File statuses plus the derived unification state for one scope
#[derive(Debug, Clone, Serialize)]
pub struct ScopeStatus {
    /// Per-file inspection results
    pub files: ScopeFiles,
    /// Derived scope state
    pub state: UnifyState,
}

/// Context file state across the inspected scopes
#[derive(Debug, Clone, Serialize)]
pub struct ContextStatus {
    /// Directory the inspection ran from
    pub working_directory: String,
    /// Home-contracted project root when it is a git checkout
    pub git_root: Option<String>,
    /// Per-scope statuses, keyed by scope name
    pub scopes: BTreeMap<String, ScopeStatus>,
}

/// The three context file paths of one scope.
#[derive(Debug, Clone)]
pub struct ContextPaths {
    /// Shared `CONTEXT.md` under `.config/ai-common/`
    pub unified: PathBuf,
    /// `CLAUDE.md` under `.claude/`
    pub claude: PathBuf,
    /// `GEMINI.md` under the scope's gemini directory
    pub gemini: PathBuf,
}

impl ContextPaths {
    /// Named entries in unification preference order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &Path); 3] {
        [
            (UNIFIED_FILE, self.unified.as_path()),
            (CLAUDE_FILE, self.claude.as_path()),
            (GEMINI_FILE, self.gemini.as_path()),
        ]
    }
}

/// Outcome of a unify run
#[derive(Debug, Clone)]
pub struct UnifyReport {
    /// Scope that was unified
    pub scope: Scope,
    /// Home-contracted path of the shared file
    pub unified_file: String,
    /// Names of the files whose content was merged in
    pub sources: Vec<String>,
    /// Home-contracted paths of the `.bak` files created
    pub backups: Vec<String>,
    /// Home-contracted paths of the symlinks created
    pub symlinks_created: Vec<String>,
    /// Human-readable summary
    pub message: String,
}

/// Inspects and unifies the context files of the user and project scopes.
pub struct ContextManager<'a> {
    locations: &'a Locations,
}

impl<'a> ContextManager<'a> {
    /// Create a manager over the given locations.
    #[must_use]
    pub fn new(locations: &'a Locations) -> Self {
        Self {
            locations,
        }
    }

    /// The context file paths of a scope.
    ///
    /// # Errors
    ///
    /// Fails for the registry scope, which carries no context files.
    pub fn paths(&self, scope: Scope) -> Result<ContextPaths, AicfgError> {
        match scope {
            Scope::User => Ok(ContextPaths {
                unified: self.locations.home().join(".config").join("ai-common").join(UNIFIED_FILE),
                claude: self.locations.home().join(".claude").join(CLAUDE_FILE),
                gemini: self.locations.user_dir().join(GEMINI_FILE),
            }),
            Scope::Project => {
                let root = self.locations.project_root();
                Ok(ContextPaths {
                    unified: root.join(".config").join("ai-common").join(UNIFIED_FILE),
                    claude: root.join(".claude").join(CLAUDE_FILE),
                    gemini: self.locations.project_gemini_dir().join(GEMINI_FILE),
                })
            }
            Scope::Registry => Err(AicfgError::ConfigError {
                message: "The registry scope has no context files".to_string(),
            }),
        }
    }

    /// Render a path with the configured home directory contracted to `~`.
    #[must_use]
    pub fn home_relative(&self, path: &Path) -> String {
        match path.strip_prefix(self.locations.home()) {
            Ok(rest) => format!("~/{}", rest.display()),
            Err(_) => path.display().to_string(),
        }
    }

    /// Inspect the context files of one scope, or of user and project.
    ///
    /// # Errors
    ///
    /// Fails when the working directory is unreadable or the registry scope
    /// is requested.
    pub fn status(&self, scope: Option<Scope>) -> Result<ContextStatus, AicfgError> {
        let working_directory = std::env::current_dir()?.display().to_string();
        let project_root = self.locations.project_root();
        let git_root = project_root
            .join(".git")
            .exists()
            .then(|| self.home_relative(project_root));

        let scopes_to_check = match scope {
            Some(scope) => vec![scope],
            None => vec![Scope::User, Scope::Project],
        };

        let mut scopes = BTreeMap::new();
        for scope in scopes_to_check {
            scopes.insert(scope.as_str().to_string(), self.scope_status(scope)?);
        }

        Ok(ContextStatus {
            working_directory,
            git_root,
            scopes,
        })
    }

    /// Merge the assistant files of a scope into the shared file and replace
    /// them with symlinks.
    ///
    /// Content is appended to any existing shared file under timestamped
    /// import headers. Merged sources are renamed to `.bak` siblings before
    /// their symlinks are created. Running against an already-unified scope
    /// is a no-op reported as success.
    ///
    /// # Errors
    ///
    /// Fails when an assistant file is a symlink to somewhere other than the
    /// shared file, or when neither assistant file has content to merge.
    pub fn unify(&self, scope: Scope) -> Result<UnifyReport, AicfgError> {
        let paths = self.paths(scope)?;

        for (name, path) in [(CLAUDE_FILE, &paths.claude), (GEMINI_FILE, &paths.gemini)] {
            if path.is_symlink() && !points_to_unified(path, &paths.unified) {
                let target = resolve_symlink(path).unwrap_or_else(|| path.to_path_buf());
                tracing::warn!(file = %name, target = %target.display(), "Refusing to replace foreign symlink");
                return Err(AicfgError::ForeignSymlink {
                    path: self.home_relative(path),
                    target: self.home_relative(&target),
                    expected: self.home_relative(&paths.unified),
                });
            }
        }

        let mut report = UnifyReport {
            scope,
            unified_file: self.home_relative(&paths.unified),
            sources: Vec::new(),
            backups: Vec::new(),
            symlinks_created: Vec::new(),
            message: String::new(),
        };

        if points_to_unified(&paths.claude, &paths.unified)
            && points_to_unified(&paths.gemini, &paths.unified)
        {
            report.message = format!(
                "Already unified. Both {CLAUDE_FILE} and {GEMINI_FILE} are symlinks to {UNIFIED_FILE} ({scope} scope)."
            );
            return Ok(report);
        }

        let claude_content = read_plain_file(&paths.claude);
        let gemini_content = read_plain_file(&paths.gemini);
        if claude_content.is_none() && gemini_content.is_none() {
            return Err(AicfgError::ContextFileNotFound {
                path: format!(
                    "{} or {}",
                    self.home_relative(&paths.claude),
                    self.home_relative(&paths.gemini)
                ),
            });
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let existing = if paths.unified.exists() && !paths.unified.is_symlink() {
            read_text_file(&paths.unified).map_err(|e| AicfgError::FileSystemError {
                operation: "read shared context file".to_string(),
                path: format!("{}: {e}", paths.unified.display()),
            })?
        } else {
            String::new()
        };

        let mut sections = Vec::new();
        for (name, content) in
            [(CLAUDE_FILE, claude_content.as_ref()), (GEMINI_FILE, gemini_content.as_ref())]
        {
            if let Some(content) = content {
                report.sources.push(name.to_string());
                sections.push(format!(
                    "*** CONTEXT IMPORTED FROM {name} ({timestamp}) ***\n\n{}",
                    content.trim()
                ));
            }
        }

        let merged = if existing.is_empty() {
            sections.join("\n\n")
        } else {
            format!("{}\n\n{}", existing.trim(), sections.join("\n\n"))
        };
        write_text_file(&paths.unified, &format!("{merged}\n")).map_err(|e| {
            AicfgError::FileSystemError {
                operation: "write shared context file".to_string(),
                path: format!("{}: {e}", paths.unified.display()),
            }
        })?;

        for path in [&paths.claude, &paths.gemini] {
            if path.exists() && !path.is_symlink() {
                let backup = path.with_extension("md.bak");
                fs::rename(path, &backup).map_err(|e| AicfgError::FileSystemError {
                    operation: "back up context file".to_string(),
                    path: format!("{}: {e}", path.display()),
                })?;
                report.backups.push(self.home_relative(&backup));
            }
            if !path.exists() && !path.is_symlink() {
                ensure_parent_dir(path).map_err(|e| AicfgError::FileSystemError {
                    operation: "create context directory".to_string(),
                    path: format!("{}: {e}", path.display()),
                })?;
                create_symlink(&paths.unified, path).map_err(|e| AicfgError::FileSystemError {
                    operation: "create context symlink".to_string(),
                    path: format!("{}: {e}", path.display()),
                })?;
                report.symlinks_created.push(self.home_relative(path));
            }
        }

        report.message = match report.sources.as_slice() {
            [first, second] => format!(
                "Unified {first} and {second} into {}.\n\n\
                 Both files were combined with section headers:\n\
                 \x20 - '*** CONTEXT IMPORTED FROM {CLAUDE_FILE} ({timestamp}) ***'\n\
                 \x20 - '*** CONTEXT IMPORTED FROM {GEMINI_FILE} ({timestamp}) ***'\n\n\
                 Please review and thoughtfully integrate the content in a cohesive, \
                 non-duplicative way. Remove redundant sections and organize logically.",
                report.unified_file
            ),
            [only] => format!(
                "Copied {only} to {} and created symlinks.\n\
                 Only one source file existed, so no merging was needed.",
                report.unified_file
            ),
            _ => String::new(),
        };
        tracing::info!(scope = %scope, unified = %paths.unified.display(), "Unified context files");

        Ok(report)
    }

    fn scope_status(&self, scope: Scope) -> Result<ScopeStatus, AicfgError> {
        let paths = self.paths(scope)?;
        let files = ScopeFiles {
            unified: self.file_status(&paths.unified, &paths.unified),
            claude: self.file_status(&paths.claude, &paths.unified),
            gemini: self.file_status(&paths.gemini, &paths.unified),
        };

        let state = if files.unified.exists
            && files.claude.points_to_unified
            && files.gemini.points_to_unified
        {
            UnifyState::Unified
        } else if files.claude.points_to_unified || files.gemini.points_to_unified {
            UnifyState::Partial
        } else if files.unified.exists {
            UnifyState::ContextOnly
        } else {
            UnifyState::NotUnified
        };

        Ok(ScopeStatus {
            files,
            state,
        })
    }

    fn file_status(&self, path: &Path, unified: &Path) -> FileStatus {
        let mut status = FileStatus {
            path: self.home_relative(path),
            absolute_path: path.display().to_string(),
            exists: path.exists(),
            status: "missing".to_string(),
            is_symlink: false,
            symlink_target: None,
            points_to_unified: false,
        };

        // Dangling symlinks report as missing
        if !status.exists {
            return status;
        }

        if path.is_symlink() {
            status.is_symlink = true;
            let target = resolve_symlink(path).unwrap_or_else(|| path.to_path_buf());
            status.symlink_target = Some(self.home_relative(&target));
            if target == canonical_or(unified) {
                status.status = "symlink (unified)".to_string();
                status.points_to_unified = true;
            } else {
                status.status = "symlink (other)".to_string();
            }
        } else {
            status.status = "present".to_string();
        }

        status
    }
}

/// Read a file's content unless it is missing or a symlink.
pub(crate) fn read_plain_file(path: &Path) -> Option<String> {
    if !path.exists() || path.is_symlink() {
        return None;
    }
    fs::read_to_string(path).ok()
}

fn canonical_or(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn resolve_symlink(path: &Path) -> Option<PathBuf> {
    if !path.is_symlink() {
        return None;
    }
    let target = fs::read_link(path).ok()?;
    let absolute =
        if target.is_absolute() { target } else { path.parent()?.join(target) };
    Some(canonical_or(&absolute))
}

fn points_to_unified(path: &Path, unified: &Path) -> bool {
    resolve_symlink(path).is_some_and(|target| target == canonical_or(unified))
}
