//! Test utilities for aicfg
//!
//! This module provides utilities for writing tests, including helpers for
//! managing test environments, temporary directories, and test isolation.
//!
//! # Test Isolation
//!
//! The utilities in this module help ensure tests don't interfere with each other:
//! - Temporary directory management via [`TestScopes`]
//! - Environment variable sets for spawned `aicfg` processes
//! - One-shot tracing initialization with [`init_test_logging`]
//!
//! # Example
//!
//! ```rust,no_run
//! use aicfg_cli::test_utils::TestScopes;
//!
//! # fn example() -> anyhow::Result<()> {
//! let scopes = TestScopes::new()?;
//! let locations = scopes.locations();
//! assert!(locations.user_dir().exists());
//! # Ok(())
//! # }
//! ```

use crate::config::Locations;
use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG` environment
/// variable if set, or uses the provided log level.
///
/// # Arguments
///
/// * `level` - Optional log level to use. If None, uses `RUST_LOG` environment variable
///
/// # Example
///
/// ```rust,no_run
/// use tracing::Level;
///
/// fn my_test() {
///     // Use environment variable
///     aicfg_cli::test_utils::init_test_logging(None);
///
///     // Or set level programmatically
///     aicfg_cli::test_utils::init_test_logging(Some(Level::DEBUG));
///
///     // Your test code here - logging will work
/// }
/// ```
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        // Determine the filter to use
        let filter = if let Some(level) = level {
            // Use the provided level
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            // Use environment variable
            EnvFilter::from_default_env()
        } else {
            // No logging if neither is provided
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true) // Show module targets like "mcp"
            .with_thread_ids(false)
            .with_ansi(true) // Enable ANSI color codes for better readability
            .try_init();
    });
}

/// A temporary directory laid out with all three configuration scopes.
///
/// Creates `home/`, `user/`, `project/` and `registry/` directories under a
/// fresh [`TempDir`] so tests never touch the developer's real Gemini config.
/// In-process tests consume the layout through [`TestScopes::locations`];
/// spawned binaries get the same layout through [`TestScopes::env_vars`].
///
/// The directory tree is removed when the value is dropped, so keep the
/// fixture alive for the duration of the test.
pub struct TestScopes {
    temp: TempDir,
}

impl TestScopes {
    /// Create the scope layout beneath a new temporary directory.
    ///
    /// # Errors
    ///
    /// Fails if the temporary directory or any scope directory cannot be
    /// created.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        for dir in ["home", "user", "project", "registry"] {
            std::fs::create_dir_all(temp.path().join(dir))?;
        }
        Ok(Self {
            temp,
        })
    }

    /// Root of the temporary tree holding all scopes.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// The fake home directory.
    #[must_use]
    pub fn home(&self) -> std::path::PathBuf {
        self.temp.path().join("home")
    }

    /// The user-scope config directory (stands in for `~/.gemini`).
    #[must_use]
    pub fn user_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("user")
    }

    /// The project root directory.
    #[must_use]
    pub fn project_root(&self) -> std::path::PathBuf {
        self.temp.path().join("project")
    }

    /// The registry repository root.
    #[must_use]
    pub fn registry_root(&self) -> std::path::PathBuf {
        self.temp.path().join("registry")
    }

    /// Build a [`Locations`] value pointing at the fixture directories.
    #[must_use]
    pub fn locations(&self) -> Locations {
        Locations::new(
            self.home(),
            self.user_dir(),
            self.project_root(),
            Some(self.registry_root()),
        )
    }

    /// Environment variables that point a spawned `aicfg` process at this
    /// fixture.
    ///
    /// Pass the result to `assert_cmd`'s `Command::envs`. `HOME` only
    /// redirects home discovery on Unix; tests that depend on it are gated
    /// accordingly.
    #[must_use]
    pub fn env_vars(&self) -> Vec<(&'static str, OsString)> {
        vec![
            ("HOME", self.home().into_os_string()),
            ("AICFG_USER_DIR", self.user_dir().into_os_string()),
            ("AICFG_PROJECT_DIR", self.project_root().into_os_string()),
            ("AICFG_REPO_DIR", self.registry_root().into_os_string()),
            ("AICFG_SKIP_GIT_CHECK_FOR_TESTS", OsString::from("1")),
        ]
    }
}
