//! Common test utilities and fixtures for aicfg integration tests
//!
//! This module consolidates frequently used test patterns to reduce duplication
//! and improve test maintainability.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use aicfg_cli::test_utils::TestScopes;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Test project builder for creating test environments
///
/// Wraps a [`TestScopes`] fixture and spawns the `aicfg` binary against it,
/// so every test runs with its own user, project, and registry directories.
pub struct TestProject {
    scopes: TestScopes,
}

impl TestProject {
    /// Create a new test project with the standard scope layout
    pub fn new() -> Result<Self> {
        Ok(Self {
            scopes: TestScopes::new()?,
        })
    }

    /// The underlying scope fixture
    pub fn scopes(&self) -> &TestScopes {
        &self.scopes
    }

    /// Path of a user-scope command record
    pub fn user_command(&self, name: &str) -> PathBuf {
        self.scopes.user_dir().join("commands").join(format!("{name}.toml"))
    }

    /// Path of a project-scope command record
    pub fn project_command(&self, name: &str) -> PathBuf {
        self.scopes.project_root().join(".gemini").join("commands").join(format!("{name}.toml"))
    }

    /// Path of a registry-scope command record
    pub fn registry_command(&self, name: &str) -> PathBuf {
        self.scopes.registry_root().join(".gemini").join("commands").join(format!("{name}.toml"))
    }

    /// Path of the user settings document
    pub fn user_settings(&self) -> PathBuf {
        self.scopes.user_dir().join("settings.json")
    }

    /// Path of the project settings document
    pub fn project_settings(&self) -> PathBuf {
        self.scopes.project_root().join(".gemini").join("settings.json")
    }

    /// Parse the user settings document
    pub fn read_user_settings(&self) -> Result<serde_json::Value> {
        let content = fs::read_to_string(self.user_settings())
            .context("Failed to read user settings document")?;
        serde_json::from_str(&content).context("User settings document is not valid JSON")
    }

    /// Run an aicfg command against this project's scopes
    pub fn run_aicfg(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_aicfg_with_env(args, &[])
    }

    /// Run an aicfg command with extra environment variables
    pub fn run_aicfg_with_env(
        &self,
        args: &[&str],
        extra_env: &[(&str, &str)],
    ) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_aicfg");
        let mut command = Command::new(binary);
        command
            .args(args)
            .current_dir(self.scopes.project_root())
            .envs(self.scopes.env_vars())
            .env("NO_COLOR", "1")
            // Keep spawned commands deterministic regardless of the host shell
            .env_remove("GEMINI_API_KEY")
            .env_remove("EDITOR")
            .env_remove("VISUAL");
        for (key, value) in extra_env {
            command.env(key, value);
        }

        let output = command.output().context("Failed to run aicfg command")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "Expected command to fail\nStdout: {}\nStderr: {}",
            self.stdout, self.stderr
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(
            !path.exists(),
            "Expected file to not exist: {}",
            path.display()
        );
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }
}

/// Write an executable stub that answers a JSON-RPC initialize request
#[cfg(unix)]
pub fn write_answering_server(dir: &Path) -> Result<PathBuf> {
    write_stub_script(
        dir,
        "fake-mcp-server",
        "read _line\nprintf '%s\\n' '{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"capabilities\":{}}}'\n",
    )
}

/// Write an executable stub that exits without producing any output
#[cfg(unix)]
pub fn write_silent_server(dir: &Path) -> Result<PathBuf> {
    write_stub_script(dir, "silent-mcp-server", "read _line\nexit 0\n")
}

#[cfg(unix)]
fn write_stub_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}"))
        .with_context(|| format!("Failed to write stub script {}", path.display()))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .context("Failed to mark stub script executable")?;
    Ok(path)
}
