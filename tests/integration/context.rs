//! End-to-end tests for the `context` command group.

use std::fs;

use crate::common::TestProject;

/// Test the status table with no context files anywhere
#[test]
fn test_context_status_empty() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["context", "status"]).unwrap();
    output.assert_success().assert_stdout_contains("User Scope");
    output.assert_stdout_contains("Project Scope");
    output.assert_stdout_contains("CONTEXT.md");
    output.assert_stdout_contains("missing");
    output.assert_stdout_contains("State: not_unified");
}

/// Test JSON status output for a single scope
#[test]
fn test_context_status_json() {
    let project = TestProject::new().unwrap();
    fs::create_dir_all(project.scopes().project_root().join(".config/ai-common")).unwrap();
    fs::write(
        project.scopes().project_root().join(".config/ai-common/CONTEXT.md"),
        "# Shared\n",
    )
    .unwrap();

    let output = project
        .run_aicfg(&["context", "status", "--scope", "project", "--format", "json"])
        .unwrap();
    output.assert_success();

    let status: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let scope = &status["scopes"]["project"];
    assert_eq!(scope["state"], "context_only");
    assert_eq!(scope["files"]["CONTEXT.md"]["exists"], true);
    assert_eq!(scope["files"]["GEMINI.md"]["status"], "missing");
    assert!(status["scopes"].get("user").is_none());
}

/// Test unifying a project scope with both assistant files present
#[cfg(unix)]
#[test]
fn test_context_unify_project_scope() {
    let project = TestProject::new().unwrap();
    let root = project.scopes().project_root();
    fs::create_dir_all(root.join(".claude")).unwrap();
    fs::write(root.join(".claude/CLAUDE.md"), "# Claude rules\n").unwrap();
    fs::create_dir_all(root.join(".gemini")).unwrap();
    fs::write(root.join(".gemini/GEMINI.md"), "# Gemini rules\n").unwrap();

    let output = project.run_aicfg(&["context", "unify", "--scope", "project"]).unwrap();
    output.assert_success().assert_stdout_contains("Success!");
    output.assert_stdout_contains("Unified CLAUDE.md and GEMINI.md");
    output.assert_stdout_contains("Backups created:");
    output.assert_stdout_contains("Symlinks created:");

    let merged = fs::read_to_string(root.join(".config/ai-common/CONTEXT.md")).unwrap();
    assert!(merged.contains("*** CONTEXT IMPORTED FROM CLAUDE.md"));
    assert!(merged.contains("# Gemini rules"));
    assert!(root.join(".claude/CLAUDE.md").is_symlink());
    assert!(root.join(".gemini/GEMINI.md").is_symlink());
    assert!(root.join(".claude/CLAUDE.md.bak").exists());

    // A second run reports the no-op
    let output = project.run_aicfg(&["context", "unify", "--scope", "project"]).unwrap();
    output.assert_success().assert_stdout_contains("Already unified");
}

/// Test that unify fails when there is nothing to merge
#[test]
fn test_context_unify_nothing_to_merge() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["context", "unify", "--scope", "project"]).unwrap();
    output.assert_failure().assert_stderr_contains("Context file not found");
}

/// Test that unify refuses to replace a symlink it does not own
#[cfg(unix)]
#[test]
fn test_context_unify_foreign_symlink() {
    let project = TestProject::new().unwrap();
    let root = project.scopes().project_root();
    let elsewhere = root.join("elsewhere.md");
    fs::write(&elsewhere, "foreign").unwrap();
    fs::create_dir_all(root.join(".claude")).unwrap();
    std::os::unix::fs::symlink(&elsewhere, root.join(".claude/CLAUDE.md")).unwrap();

    let output = project.run_aicfg(&["context", "unify", "--scope", "project"]).unwrap();
    output.assert_failure().assert_stderr_contains("is a symlink to");
}

/// Test that analyze without an API key fails cleanly
#[test]
fn test_context_analyze_requires_api_key() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["context", "analyze", "all", "What do these files say?"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("GEMINI_API_KEY");
}

/// Test the file-names list/add/remove cycle
#[test]
fn test_context_file_names_cycle() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["context", "file-names", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("No context files configured");

    let output = project.run_aicfg(&["context", "file-names", "add", "CONTEXT.md"]).unwrap();
    output.assert_success().assert_stdout_contains("Added 'CONTEXT.md'");

    // Adding again is an idempotent no-op
    let output = project.run_aicfg(&["context", "file-names", "add", "CONTEXT.md"]).unwrap();
    output.assert_success().assert_stdout_contains("already in");

    let settings = project.read_user_settings().unwrap();
    assert_eq!(settings["context"]["fileName"], serde_json::json!(["CONTEXT.md"]));

    let output = project.run_aicfg(&["context", "file-names", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("CONTEXT.md");

    let output = project
        .run_aicfg(&["context", "file-names", "remove", "CONTEXT.md"])
        .unwrap();
    output.assert_success().assert_stdout_contains("Removed 'CONTEXT.md'");

    let output = project
        .run_aicfg(&["context", "file-names", "remove", "CONTEXT.md"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("not found");
}
