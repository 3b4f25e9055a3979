//! Cross-module flows over a shared scope fixture.

use anyhow::Result;
use serde_json::json;

use aicfg_cli::commands::CommandStore;
use aicfg_cli::core::Scope;
use aicfg_cli::mcp::{McpRegistrar, RegisterRequest, ServerSource};
use aicfg_cli::settings::SettingsStore;
use aicfg_cli::test_utils::TestScopes;

/// A record written with a multi-line prompt reads back byte-identical.
#[test]
fn command_round_trip_is_exact() -> Result<()> {
    let scopes = TestScopes::new()?;
    let locations = scopes.locations();
    let store = CommandStore::new(&locations);

    let prompt = "Fix the bug.\n\nSteps:\n  1. reproduce\n  2. fix\n  3. add a test\n";
    store.add("fix-bug", None, Some(prompt), Some("Bug fixer"), Scope::User)?;

    let (scope, record) = store.get("fix-bug")?.expect("record should exist");
    assert_eq!(scope, Scope::User);
    assert_eq!(record.prompt, prompt);
    assert_eq!(record.description, "Bug fixer");
    Ok(())
}

/// Sync status follows the content hashes as copies spread and diverge.
#[test]
fn sync_status_tracks_copies_across_scopes() -> Result<()> {
    let scopes = TestScopes::new()?;
    let locations = scopes.locations();
    let store = CommandStore::new(&locations);

    let synced = |store: &CommandStore| -> Result<bool> {
        let listings = store.list(Some("deploy"), None)?;
        Ok(listings[0].synced)
    };

    // One copy: trivially synced.
    store.add("deploy", None, Some("Ship it"), None, Scope::User)?;
    assert!(synced(&store)?);

    // Identical copies in all three scopes: still synced.
    store.register("deploy", false, None)?;
    store.add("deploy", None, Some("Ship it"), None, Scope::Project)?;
    assert!(synced(&store)?);

    // Any diverging copy breaks it.
    store.add("deploy", None, Some("Ship it differently"), None, Scope::Project)?;
    assert!(!synced(&store)?);

    // Restricting the listing to the agreeing scopes restores it.
    let listings = store.list(Some("deploy"), Some(&[Scope::User, Scope::Registry]))?;
    assert!(listings[0].synced);
    Ok(())
}

/// Publish, lose the local copy, install it back from the registry.
#[test]
fn publish_then_install_round_trip() -> Result<()> {
    let scopes = TestScopes::new()?;
    let locations = scopes.locations();
    let store = CommandStore::new(&locations);

    store.add("review", Some("git"), Some("Review the diff"), None, Scope::User)?;
    store.publish("git/review")?;
    assert!(scopes.registry_root().join(".gemini/commands/git/review.toml").exists());

    store.delete("git/review", Scope::User)?;
    assert!(store.get("git/review")?.map(|(scope, _)| scope) == Some(Scope::Registry));

    store.install("git/review")?;
    let (scope, record) = store.get("git/review")?.expect("installed copy");
    assert_eq!(scope, Scope::User);
    assert_eq!(record.prompt, "Review the diff");
    Ok(())
}

/// The registrar and the settings store edit the same document without
/// clobbering each other's keys.
#[tokio::test]
async fn registrar_and_settings_share_one_document() -> Result<()> {
    let scopes = TestScopes::new()?;
    let locations = scopes.locations();

    let settings = SettingsStore::new(&locations);
    settings.set_by_alias("vim-mode", "true", Some(Scope::User))?;

    let registrar = McpRegistrar::new(&locations);
    let mut request = RegisterRequest::new(
        ServerSource::Url("https://mcp.example.com/sse".to_string()),
        Scope::User,
    );
    request.name = Some("docs".to_string());
    registrar.register(request).await?;

    let document = settings.load(Some(Scope::User))?;
    assert_eq!(
        aicfg_cli::settings::get_by_path(&document, "general.vimMode"),
        Some(&json!(true))
    );
    assert_eq!(
        aicfg_cli::settings::get_by_path(&document, "mcpServers.docs.url"),
        Some(&json!("https://mcp.example.com/sse"))
    );

    // And removal leaves the unrelated setting in place.
    registrar.remove("docs", Scope::User)?;
    let document = settings.load(Some(Scope::User))?;
    assert_eq!(
        aicfg_cli::settings::get_by_path(&document, "general.vimMode"),
        Some(&json!(true))
    );
    Ok(())
}

/// Project-over-user resolution spans plain settings and server entries
/// alike, since both live in the same documents.
#[tokio::test]
async fn project_scope_shadows_user_scope() -> Result<()> {
    let scopes = TestScopes::new()?;
    let locations = scopes.locations();

    let settings = SettingsStore::new(&locations);
    settings.set_by_alias("log-level", "info", Some(Scope::User))?;
    settings.set_by_alias("log-level", "debug", Some(Scope::Project))?;

    let views = settings.list_by_alias(Scope::Project)?;
    let log_level = views
        .iter()
        .find(|view| view.spec.alias == "log-level")
        .and_then(|view| view.value.clone());
    assert_eq!(log_level, Some(json!("debug")));

    let registrar = McpRegistrar::new(&locations);
    for (scope, url) in [(Scope::User, "https://user.example"), (Scope::Project, "https://proj.example")] {
        let mut request = RegisterRequest::new(ServerSource::Url(url.to_string()), scope);
        request.name = Some("shared".to_string());
        registrar.register(request).await?;
    }

    let (scope, config) = registrar.get("shared", None)?;
    assert_eq!(scope, Scope::Project);
    assert_eq!(config.target(), "https://proj.example");
    Ok(())
}
