//! End-to-end tests for the `cmds` command group.

use std::fs;

use crate::common::{FileAssert, TestProject};

/// Test creating a command record with an inline prompt
#[test]
fn test_cmds_add_with_prompt_creates_record() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&[
            "cmds",
            "add",
            "fix-bug",
            "Fix the bug described in the issue",
            "--desc",
            "Bug fixer",
        ])
        .unwrap();
    output.assert_success().assert_stdout_contains("Created");
    output.assert_stdout_contains("(Scope: USER)");

    FileAssert::exists(project.user_command("fix-bug"));
    FileAssert::contains(project.user_command("fix-bug"), "Bug fixer");
    FileAssert::contains(project.user_command("fix-bug"), "Fix the bug described in the issue");
}

/// Test creating a command record in the project scope
#[test]
fn test_cmds_add_project_scope() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["cmds", "add", "deploy", "Deploy the service", "--scope", "project"])
        .unwrap();
    output.assert_success().assert_stdout_contains("(Scope: PROJECT)");

    FileAssert::exists(project.project_command("deploy"));
    FileAssert::not_exists(project.user_command("deploy"));
}

/// Test that re-adding an existing command replaces its content
#[test]
fn test_cmds_add_overwrites_existing() {
    let project = TestProject::new().unwrap();

    project.run_aicfg(&["cmds", "add", "fix-bug", "First draft"]).unwrap().assert_success();
    let output = project.run_aicfg(&["cmds", "add", "fix-bug", "Second draft"]).unwrap();
    output.assert_success().assert_stdout_contains("Created");

    FileAssert::contains(project.user_command("fix-bug"), "Second draft");
    let content = fs::read_to_string(project.user_command("fix-bug")).unwrap();
    assert!(!content.contains("First draft"), "old record survived: {content}");
}

/// Test that a namespace becomes a subdirectory of the commands dir
#[test]
fn test_cmds_add_with_namespace() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_aicfg(&["cmds", "add", "commit", "Write a commit message", "-n", "git"])
        .unwrap();
    output.assert_success();

    FileAssert::exists(project.user_command("git/commit"));
}

/// Test that leaving the editor template untouched aborts the add
#[cfg(unix)]
#[test]
fn test_cmds_add_editor_abort() {
    let project = TestProject::new().unwrap();

    // `true` exits immediately without touching the template file
    let output = project
        .run_aicfg_with_env(&["cmds", "add", "drafted"], &[("EDITOR", "true")])
        .unwrap();
    output.assert_success().assert_stdout_contains("Aborted.");
    output.assert_stdout_contains("No content provided.");

    FileAssert::not_exists(project.user_command("drafted"));
}

/// Test that listing with no commands still renders the table frame
#[test]
fn test_cmds_list_empty() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["cmds", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("Custom Slash Commands");
    output.assert_stdout_contains("Command");
}

/// Test the sync glyphs: in-sync copies then a diverged user copy
#[test]
fn test_cmds_list_sync_status() {
    let project = TestProject::new().unwrap();

    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();
    project.run_aicfg(&["cmds", "register", "fix-bug"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("fix-bug");
    output.assert_stdout_contains("✓");

    // Diverge the user copy; the listing must flag the mismatch
    fs::write(
        project.user_command("fix-bug"),
        "description = \"changed\"\nprompt = \"different\"\n",
    )
    .unwrap();

    let output = project.run_aicfg(&["cmds", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("≠");
}

/// Test JSON list output carries per-scope file info
#[test]
fn test_cmds_list_json() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "list", "--format", "json"]).unwrap();
    output.assert_success();

    let listings: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let listing = &listings.as_array().unwrap()[0];
    assert_eq!(listing["name"], "fix-bug");
    assert_eq!(listing["synced"], true);
    assert_eq!(listing["user"]["exists"], true);
    assert_eq!(listing["registry"]["exists"], false);
}

/// Test wildcard filtering of the listing
#[test]
fn test_cmds_list_filter() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();
    project.run_aicfg(&["cmds", "add", "deploy", "Ship it"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "list", "--filter", "fix*"]).unwrap();
    output.assert_success().assert_stdout_contains("fix-bug");
    assert!(!output.stdout.contains("deploy"), "filtered name leaked: {}", output.stdout);
}

/// Test showing a command record
#[test]
fn test_cmds_show() {
    let project = TestProject::new().unwrap();
    project
        .run_aicfg(&["cmds", "add", "fix-bug", "Fix the bug", "--desc", "Bug fixer"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["cmds", "show", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Description: Bug fixer");
    output.assert_stdout_contains("Fix the bug");
}

/// Test that showing a missing command fails with a suggestion
#[test]
fn test_cmds_show_missing() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["cmds", "show", "ghost"]).unwrap();
    output.assert_failure().assert_stderr_contains("Command 'ghost' not found");
    output.assert_stderr_contains("aicfg cmds list");
}

/// Test removing a command, and that a second removal fails
#[test]
fn test_cmds_remove() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "remove", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Removed 'fix-bug' from user scope.");
    FileAssert::not_exists(project.user_command("fix-bug"));

    let output = project.run_aicfg(&["cmds", "remove", "fix-bug"]).unwrap();
    output.assert_failure().assert_stderr_contains("not found in user scope");
}

/// Test registering a command into the registry
#[test]
fn test_cmds_register() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "register", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Registered 'fix-bug'");
    output.assert_stdout_contains("Note:");
    FileAssert::exists(project.registry_command("fix-bug"));

    // Registering again with identical content is a no-op, not a conflict
    project.run_aicfg(&["cmds", "register", "fix-bug"]).unwrap().assert_success();
}

/// Test that a diverged registry copy is only overwritten with --update
#[test]
fn test_cmds_register_conflict_requires_update() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();

    fs::create_dir_all(project.registry_command("fix-bug").parent().unwrap()).unwrap();
    fs::write(
        project.registry_command("fix-bug"),
        "description = \"older\"\nprompt = \"outdated prompt\"\n",
    )
    .unwrap();

    let output = project.run_aicfg(&["cmds", "register", "fix-bug"]).unwrap();
    output.assert_failure().assert_stderr_contains("already exists in registry scope");
    output.assert_stderr_contains("--update");

    let output = project.run_aicfg(&["cmds", "register", "fix-bug", "--update"]).unwrap();
    output.assert_success();
    FileAssert::contains(project.registry_command("fix-bug"), "Fix it");
}

/// Test that diverging user and project copies make register ambiguous
#[test]
fn test_cmds_register_ambiguous_source() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "deploy", "User version"]).unwrap().assert_success();
    project
        .run_aicfg(&["cmds", "add", "deploy", "Project version", "--scope", "project"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["cmds", "register", "deploy"]).unwrap();
    output.assert_failure().assert_stderr_contains("Ambiguous source");
    output.assert_stderr_contains("--source-scope");

    let output = project
        .run_aicfg(&["cmds", "register", "deploy", "--source-scope", "project"])
        .unwrap();
    output.assert_success();
    FileAssert::contains(project.registry_command("deploy"), "Project version");
}

/// Test the publish and install round trip between user and registry
#[test]
fn test_cmds_publish_and_install() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "publish", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Published 'fix-bug' to Registry");

    project.run_aicfg(&["cmds", "remove", "fix-bug"]).unwrap().assert_success();
    FileAssert::not_exists(project.user_command("fix-bug"));

    let output = project.run_aicfg(&["cmds", "install", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Installed 'fix-bug' to User scope");
    FileAssert::contains(project.user_command("fix-bug"), "Fix it");
}

/// Test that publishing a missing command fails
#[test]
fn test_cmds_publish_missing() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["cmds", "publish", "ghost"]).unwrap();
    output.assert_failure().assert_stderr_contains("not found in user scope");
}

/// Test the unified diff between registry and user copies
#[test]
fn test_cmds_diff_shows_divergence() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "fix-bug", "Fix it"]).unwrap().assert_success();
    project.run_aicfg(&["cmds", "register", "fix-bug"]).unwrap().assert_success();

    // Identical copies produce no hunks
    let output = project.run_aicfg(&["cmds", "diff", "fix-bug"]).unwrap();
    output.assert_success();
    assert!(output.stdout.trim().is_empty(), "expected no diff output: {}", output.stdout);

    fs::write(
        project.user_command("fix-bug"),
        "description = \"Command for fix-bug\"\nprompt = \"Fix it thoroughly\"\n",
    )
    .unwrap();

    let output = project.run_aicfg(&["cmds", "diff", "fix-bug"]).unwrap();
    output.assert_success().assert_stdout_contains("Registry (fix-bug)");
    output.assert_stdout_contains("User (fix-bug)");
    output.assert_stdout_contains("+prompt = \"Fix it thoroughly\"");
}

/// Test that diffing needs copies in both scopes
#[test]
fn test_cmds_diff_single_copy() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["cmds", "add", "solo", "Only here"]).unwrap().assert_success();

    let output = project.run_aicfg(&["cmds", "diff", "solo"]).unwrap();
    output.assert_success().assert_stdout_contains("cannot be diffed");
}
