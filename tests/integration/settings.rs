//! End-to-end tests for the `settings` command group.

use std::fs;

use crate::common::TestProject;

/// Test the set/get round trip with boolean coercion
#[test]
fn test_settings_set_and_get() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["settings", "set", "vim-mode", "true"]).unwrap();
    output.assert_success().assert_stdout_contains("Set vim-mode = true");

    let document = project.read_user_settings().unwrap();
    assert_eq!(document["general"]["vimMode"], serde_json::json!(true));

    let output = project.run_aicfg(&["settings", "get", "vim-mode"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "true");
}

/// Test that falsy spellings coerce to false
#[test]
fn test_settings_set_falsy_value() {
    let project = TestProject::new().unwrap();

    project.run_aicfg(&["settings", "set", "vim-mode", "off"]).unwrap().assert_success();

    let document = project.read_user_settings().unwrap();
    assert_eq!(document["general"]["vimMode"], serde_json::json!(false));
}

/// Test integer coercion and its rejection of non-numeric input
#[test]
fn test_settings_set_integer() {
    let project = TestProject::new().unwrap();

    project.run_aicfg(&["settings", "set", "max-line-length", "120"]).unwrap().assert_success();
    let document = project.read_user_settings().unwrap();
    assert_eq!(document["terminal"]["maxLineLength"], serde_json::json!(120));

    let output = project.run_aicfg(&["settings", "set", "max-line-length", "wide"]).unwrap();
    output.assert_failure().assert_stderr_contains("expected integer");
}

/// Test list coercion splits comma-separated input
#[test]
fn test_settings_set_list() {
    let project = TestProject::new().unwrap();

    project
        .run_aicfg(&["settings", "set", "allowed-tools", "ReadFile, Shell(git status)"])
        .unwrap()
        .assert_success();

    let document = project.read_user_settings().unwrap();
    assert_eq!(
        document["tools"]["allowed"],
        serde_json::json!(["ReadFile", "Shell(git status)"])
    );
}

/// Test the restart note on aliases that need a relaunch
#[test]
fn test_settings_set_restart_note() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["settings", "set", "preview-features", "true"]).unwrap();
    output.assert_success().assert_stdout_contains("You must /quit and run gemini -r");

    // Aliases without the restart flag stay quiet
    let output = project.run_aicfg(&["settings", "set", "vim-mode", "true"]).unwrap();
    output.assert_success();
    assert!(!output.stdout.contains("/quit"), "unexpected restart note: {}", output.stdout);
}

/// Test that an unknown alias fails with a near-miss suggestion
#[test]
fn test_settings_set_unknown_alias() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["settings", "set", "vim-mod", "true"]).unwrap();
    output.assert_failure().assert_stderr_contains("Unknown setting alias 'vim-mod'");
    output.assert_stderr_contains("Did you mean 'vim-mode'?");
}

/// Test that getting an unset alias reports "not set" without failing
#[test]
fn test_settings_get_unset_value() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["settings", "get", "theme"]).unwrap();
    output.assert_success().assert_stdout_contains("not set");
}

/// Test explicit scope targeting for set and get
#[test]
fn test_settings_scope_targeting() {
    let project = TestProject::new().unwrap();

    project
        .run_aicfg(&["settings", "set", "theme", "dracula", "--scope", "project"])
        .unwrap()
        .assert_success();

    assert!(project.project_settings().exists());
    assert!(!project.user_settings().exists());

    // Without a scope the project document wins once it exists
    let output = project.run_aicfg(&["settings", "get", "theme"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "dracula");

    // The user document never saw the value
    let output = project.run_aicfg(&["settings", "get", "theme", "--scope", "user"]).unwrap();
    output.assert_success().assert_stdout_contains("not set");
}

/// Test that set preserves unrelated keys in the document
#[test]
fn test_settings_set_preserves_existing_keys() {
    let project = TestProject::new().unwrap();

    fs::write(
        project.user_settings(),
        serde_json::json!({
            "mcpServers": {"docs": {"url": "https://example.com/mcp"}},
            "general": {"autoUpdate": false}
        })
        .to_string(),
    )
    .unwrap();

    project.run_aicfg(&["settings", "set", "vim-mode", "true"]).unwrap().assert_success();

    let document = project.read_user_settings().unwrap();
    assert_eq!(document["general"]["vimMode"], serde_json::json!(true));
    assert_eq!(document["general"]["autoUpdate"], serde_json::json!(false));
    assert_eq!(document["mcpServers"]["docs"]["url"], serde_json::json!("https://example.com/mcp"));
}

/// Test the alias listing table
#[test]
fn test_settings_list() {
    let project = TestProject::new().unwrap();
    project.run_aicfg(&["settings", "set", "theme", "dracula"]).unwrap().assert_success();

    let output = project.run_aicfg(&["settings", "list"]).unwrap();
    output.assert_success().assert_stdout_contains("Setting Aliases");
    output.assert_stdout_contains("Active Config:");
    output.assert_stdout_contains("vim-mode");
    output.assert_stdout_contains("general.vimMode");
    output.assert_stdout_contains("dracula");
}

/// Test filtering the alias listing
#[test]
fn test_settings_list_filter() {
    let project = TestProject::new().unwrap();

    let output = project.run_aicfg(&["settings", "list", "--filter", "vim"]).unwrap();
    output.assert_success().assert_stdout_contains("vim-mode");
    assert!(!output.stdout.contains("max-line-length"), "filter leaked: {}", output.stdout);
}
