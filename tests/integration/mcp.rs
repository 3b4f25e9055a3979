//! End-to-end tests for the `mcp` command group.

use crate::common::TestProject;

#[cfg(unix)]
use crate::common::{write_answering_server, write_silent_server};

/// Test registering a URL server and finding it in the settings document
#[test]
fn test_mcp_add_url_server() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["mcp", "add", "--url", "https://mcp.example.com/sse", "--name", "docs"])
        .unwrap();
    output.assert_success().assert_stdout_contains("Registered 'docs'");

    let settings = project.read_user_settings().unwrap();
    assert_eq!(settings["mcpServers"]["docs"]["url"], "https://mcp.example.com/sse");
}

/// Test that URL servers require an explicit name
#[test]
fn test_mcp_add_url_requires_name() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["mcp", "add", "--url", "https://mcp.example.com/sse"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("--name");
}

/// Test that exactly one source flag must be given
#[test]
fn test_mcp_add_requires_one_source() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["mcp", "add"]).unwrap();
    output.assert_failure().assert_stderr_contains("Exactly one");

    let output = project
        .run_aicfg(&["mcp", "add", "--command", "a", "--url", "https://b"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("Exactly one");
}

/// Test registering a command that answers the startup probe
#[cfg(unix)]
#[test]
fn test_mcp_add_command_with_probe() {
    let project = TestProject::new().unwrap();
    let stub = write_answering_server(&project.scopes().project_root()).unwrap();
    let stub = stub.to_string_lossy().to_string();

    let output = project.run_aicfg(&["mcp", "add", "--command", &stub]).unwrap();
    output.assert_success().assert_stdout_contains("startup probe answered");

    // Name derived from "fake-mcp-server" by dropping the mcp token
    let settings = project.read_user_settings().unwrap();
    assert_eq!(settings["mcpServers"]["fake-server"]["command"], stub);
}

/// Test that a server that never answers is rejected and not persisted
#[cfg(unix)]
#[test]
fn test_mcp_add_failing_probe_is_rejected() {
    let project = TestProject::new().unwrap();
    let stub = write_silent_server(&project.scopes().project_root()).unwrap();
    let stub = stub.to_string_lossy().to_string();

    let output = project
        .run_aicfg(&["mcp", "add", "--command", &stub, "--timeout", "2"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("startup check failed");

    // Nothing was written
    assert!(!project.user_settings().exists() || {
        let settings = project.read_user_settings().unwrap();
        settings.get("mcpServers").is_none_or(|servers| {
            servers.as_object().map(serde_json::Map::is_empty).unwrap_or(true)
        })
    });
}

/// Test that --no-verify registers a server without probing it
#[cfg(unix)]
#[test]
fn test_mcp_add_no_verify_skips_probe() {
    let project = TestProject::new().unwrap();
    let stub = write_silent_server(&project.scopes().project_root()).unwrap();
    let stub = stub.to_string_lossy().to_string();

    let output = project
        .run_aicfg(&["mcp", "add", "--command", &stub, "--name", "quiet", "--no-verify"])
        .unwrap();
    output.assert_success().assert_stdout_contains("Registered 'quiet'");

    let settings = project.read_user_settings().unwrap();
    assert_eq!(settings["mcpServers"]["quiet"]["command"], stub);
}

/// Test that a missing executable is reported before any probe runs
#[test]
fn test_mcp_add_missing_executable() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["mcp", "add", "--command", "definitely-not-installed-aicfg"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("not found in PATH");
}

/// Test that registering the same name twice is a conflict
#[test]
fn test_mcp_add_duplicate_name() {
    let project = TestProject::new().unwrap();

    project
        .run_aicfg(&["mcp", "add", "--url", "https://a.example.com", "--name", "clash"])
        .unwrap()
        .assert_success();
    let output = project
        .run_aicfg(&["mcp", "add", "--url", "https://b.example.com", "--name", "clash"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("already registered");
}

/// Test listing across scopes with a wildcard filter
#[test]
fn test_mcp_list_with_filter() {
    let project = TestProject::new().unwrap();
    project
        .run_aicfg(&["mcp", "add", "--url", "https://a.example.com", "--name", "alpha"])
        .unwrap()
        .assert_success();
    project
        .run_aicfg(&[
            "mcp", "add", "--url", "https://b.example.com", "--name", "beta", "--scope", "project",
        ])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["mcp", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("alpha");
    output.assert_stdout_contains("beta");

    let output = project.run_aicfg(&["mcp", "list", "--filter", "AL*"]).unwrap();
    output.assert_success().assert_stdout_contains("alpha");
    assert!(!output.stdout.contains("beta"), "filtered name leaked: {}", output.stdout);

    let output = project.run_aicfg(&["mcp", "list", "--scope", "project"]).unwrap();
    output.assert_success().assert_stdout_contains("beta");
    assert!(!output.stdout.contains("alpha"), "scoped name leaked: {}", output.stdout);
}

/// Test listing with nothing registered
#[test]
fn test_mcp_list_empty() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["mcp", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("No MCP servers registered");
}

/// Test showing a URL server entry
#[test]
fn test_mcp_show_url_server() {
    let project = TestProject::new().unwrap();
    project
        .run_aicfg(&["mcp", "add", "--url", "https://mcp.example.com/sse", "--name", "docs"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["mcp", "show", "docs"]).unwrap();
    output.assert_success().assert_stdout_contains("Name: docs");
    output.assert_stdout_contains("URL: https://mcp.example.com/sse");
}

/// Test that showing an unknown server fails
#[test]
fn test_mcp_show_missing() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["mcp", "show", "ghost"]).unwrap();
    output.assert_failure().assert_stderr_contains("MCP server 'ghost' not found");
}

/// Test removing an entry, and that removal is not idempotent
#[test]
fn test_mcp_remove() {
    let project = TestProject::new().unwrap();
    project
        .run_aicfg(&["mcp", "add", "--url", "https://a.example.com", "--name", "gone"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["mcp", "remove", "gone"]).unwrap();
    output.assert_success().assert_stdout_contains("Removed 'gone'");

    let output = project.run_aicfg(&["mcp", "remove", "gone"]).unwrap();
    output.assert_failure().assert_stderr_contains("not found");
}

/// Test check-startup against a stub that answers the initialize request
#[cfg(unix)]
#[test]
fn test_mcp_check_startup_answering_server() {
    let project = TestProject::new().unwrap();
    let stub = write_answering_server(&project.scopes().project_root()).unwrap();

    let output = project
        .run_aicfg(&["mcp", "check-startup", &stub.to_string_lossy()])
        .unwrap();
    output.assert_success().assert_stdout_contains("Server responded to initialize request");
    output.assert_stdout_contains("\"result\"");
}

/// Test check-startup against a stub that stays silent until the timeout
#[cfg(unix)]
#[test]
fn test_mcp_check_startup_silent_server() {
    let project = TestProject::new().unwrap();
    let stub = write_silent_server(&project.scopes().project_root()).unwrap();

    let output = project
        .run_aicfg(&["mcp", "check-startup", &stub.to_string_lossy(), "--timeout", "2"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("startup check failed");
}
