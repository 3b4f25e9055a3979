//! End-to-end tests for the `paths` and `allowed-tools` command groups.

use crate::common::TestProject;

/// Test adding an include directory, with the instant-apply tip
#[test]
fn test_paths_add() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["paths", "add", "~/shared/docs"]).unwrap();
    output.assert_success().assert_stdout_contains("Added '~/shared/docs'");
    output.assert_stdout_contains("Tip:");
    output.assert_stdout_contains("/dir add ~/shared/docs");

    let document = project.read_user_settings().unwrap();
    assert_eq!(document["context"]["includeDirectories"], serde_json::json!(["~/shared/docs"]));
}

/// Test that adding the same directory twice reports it as already present
#[test]
fn test_paths_add_is_idempotent() {
    let project = TestProject::new().unwrap();

    project.run_aicfg(&["paths", "add", "~/shared/docs"]).unwrap().assert_success();
    let output = project.run_aicfg(&["paths", "add", "~/shared/docs"]).unwrap();
    output.assert_success().assert_stdout_contains("'~/shared/docs' is already in");

    let document = project.read_user_settings().unwrap();
    assert_eq!(
        document["context"]["includeDirectories"].as_array().unwrap().len(),
        1,
        "duplicate entry was stored"
    );
}

/// Test the paths listing, empty and populated
#[test]
fn test_paths_list() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["paths", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("No paths configured.");

    project.run_aicfg(&["paths", "add", "~/work/notes"]).unwrap().assert_success();
    project.run_aicfg(&["paths", "add", "~/work/api"]).unwrap().assert_success();

    let output = project.run_aicfg(&["paths", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("Path");
    output.assert_stdout_contains("~/work/api");
    output.assert_stdout_contains("~/work/notes");
}

/// Test removing a directory and the error on a missing one
#[test]
fn test_paths_remove() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["paths", "add", "~/shared/docs"]).unwrap().assert_success();

    let output = project.run_aicfg(&["paths", "remove", "~/shared/docs"]).unwrap();
    output.assert_success().assert_stdout_contains("Removed '~/shared/docs'");
    output.assert_stdout_contains("/dir remove ~/shared/docs");

    let output = project.run_aicfg(&["paths", "remove", "~/shared/docs"]).unwrap();
    output.assert_failure().assert_stderr_contains("Path '~/shared/docs' not found");
}

/// Test scoped paths land in the project settings document
#[test]
fn test_paths_project_scope() {
    let project = TestProject::new().unwrap();

    project
        .run_aicfg(&["paths", "add", "./local-docs", "--scope", "project"])
        .unwrap()
        .assert_success();

    assert!(project.project_settings().exists());
    assert!(!project.user_settings().exists());
}

/// Test adding an allowed tool, which requires an explicit scope
#[test]
fn test_allowed_tools_add() {
    let project = TestProject::new().unwrap();

    // Scope is mandatory for this group
    let output = project.run_aicfg(&["allowed-tools", "add", "ReadFile"]).unwrap();
    output.assert_failure();

    let output = project
        .run_aicfg(&["allowed-tools", "add", "ReadFile", "--scope", "user"])
        .unwrap();
    output.assert_success().assert_stdout_contains("Added 'ReadFile'");

    let document = project.read_user_settings().unwrap();
    assert_eq!(document["tools"]["allowed"], serde_json::json!(["ReadFile"]));
}

/// Test the allowed tools listing
#[test]
fn test_allowed_tools_list() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["allowed-tools", "list", "--scope", "user"]).unwrap();
    output.assert_success().assert_stdout_contains("No allowed tools configured.");

    project
        .run_aicfg(&["allowed-tools", "add", "Shell(git status)", "--scope", "user"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["allowed-tools", "list", "--scope", "user"]).unwrap();
    output.assert_success().assert_stdout_contains("Tool Name");
    output.assert_stdout_contains("Shell(git status)");
}

/// Test removing an allowed tool and the error on a missing one
#[test]
fn test_allowed_tools_remove() {
    let project = TestProject::new().unwrap();
    project
        .run_aicfg(&["allowed-tools", "add", "ReadFile", "--scope", "user"])
        .unwrap()
        .assert_success();

    let output = project
        .run_aicfg(&["allowed-tools", "remove", "ReadFile", "--scope", "user"])
        .unwrap();
    output.assert_success().assert_stdout_contains("Removed 'ReadFile'");

    let output = project
        .run_aicfg(&["allowed-tools", "remove", "ReadFile", "--scope", "user"])
        .unwrap();
    output.assert_failure().assert_stderr_contains("Tool 'ReadFile' not found");
}

/// Test user and project tool lists are independent
#[test]
fn test_allowed_tools_scopes_are_independent() {
    let project = TestProject::new().unwrap();

    project
        .run_aicfg(&["allowed-tools", "add", "ReadFile", "--scope", "user"])
        .unwrap()
        .assert_success();
    project
        .run_aicfg(&["allowed-tools", "add", "WriteFile", "--scope", "project"])
        .unwrap()
        .assert_success();

    let output = project.run_aicfg(&["allowed-tools", "list", "--scope", "project"]).unwrap();
    output.assert_success().assert_stdout_contains("WriteFile");
    assert!(!output.stdout.contains("ReadFile"), "user tool leaked: {}", output.stdout);
}
