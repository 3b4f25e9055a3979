//! MCP tool server backing the `aicfg-mcp` binary.
//!
//! Exposes the command and settings stores as callable tools over stdio so an
//! AI agent can manage its own slash commands, context paths, and settings.
//! The full command listing is also published as the readable resource
//! `aicfg://commands`.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;

use crate::commands::CommandStore;
use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::settings::{INCLUDE_DIRECTORIES_PATH, SettingsStore};

/// URI of the resource listing every known slash command.
pub const COMMANDS_RESOURCE_URI: &str = "aicfg://commands";

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddSlashCommandArgs {
    /// Command name (e.g. 'fix-bug')
    pub name: String,
    /// The prompt text for the command
    pub prompt: String,
    /// Short description
    pub description: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListSlashCommandsArgs {
    /// Shell-style wildcard pattern to filter by name (e.g. "commit*")
    pub filter_pattern: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetSlashCommandArgs {
    /// Command name, including any namespace (e.g. 'git/commit')
    pub name: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddContextPathArgs {
    /// Directory to add to the context include list
    pub path: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SetSettingArgs {
    /// Setting alias (e.g. 'vim-mode')
    pub alias: String,
    /// New value, coerced to the alias's declared type
    pub value: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetSettingArgs {
    /// Setting alias (e.g. 'vim-mode')
    pub alias: String,
}

/// Render a tool response as pretty-printed JSON text.
fn payload(value: &serde_json::Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Map a store error onto the protocol error that fits it.
fn tool_error(err: &AicfgError) -> McpError {
    tracing::warn!(error = %err, "Tool call failed");
    match err {
        AicfgError::InvalidCommandName { .. }
        | AicfgError::UnknownAlias { .. }
        | AicfgError::InvalidSettingValue { .. }
        | AicfgError::ConfigError { .. } => McpError::invalid_params(err.to_string(), None),
        AicfgError::CommandNotFound { .. } | AicfgError::CommandNotFoundInScope { .. } => {
            McpError::invalid_request(err.to_string(), None)
        }
        _ => McpError::internal_error(err.to_string(), None),
    }
}

/// MCP service over the command and settings stores.
///
/// Writes always target the user scope; listings span every discovered scope.
#[derive(Clone)]
pub struct AicfgService {
    locations: Locations,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AicfgService {
    pub fn new(locations: Locations) -> Self {
        Self {
            locations,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a user-scope slash command
    #[tool(description = "Add a new slash command to the local configuration")]
    async fn add_slash_command(
        &self,
        Parameters(args): Parameters<AddSlashCommandArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = CommandStore::new(&self.locations);
        let path = store
            .add(
                &args.name,
                None,
                Some(&args.prompt),
                args.description.as_deref(),
                Scope::User,
            )
            .map_err(|e| tool_error(&e))?;
        payload(&json!({
            "success": true,
            "path": path.display().to_string(),
            "status": "PRIVATE",
        }))
    }

    /// Names plus per-scope sync status
    #[tool(description = "List all available slash commands and their status")]
    async fn list_slash_commands(
        &self,
        Parameters(args): Parameters<ListSlashCommandsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = CommandStore::new(&self.locations);
        let commands = store
            .list(args.filter_pattern.as_deref(), None)
            .map_err(|e| tool_error(&e))?;
        payload(&json!({ "commands": commands }))
    }

    /// Full record from the highest-precedence scope that has it
    #[tool(description = "Show one slash command's full record")]
    async fn get_slash_command(
        &self,
        Parameters(args): Parameters<GetSlashCommandArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = CommandStore::new(&self.locations);
        let Some((scope, record)) = store.get(&args.name).map_err(|e| tool_error(&e))? else {
            return Err(tool_error(&AicfgError::CommandNotFound {
                name: args.name,
            }));
        };
        payload(&json!({
            "name": args.name,
            "scope": scope.as_str(),
            "description": record.description,
            "prompt": record.prompt,
        }))
    }

    /// Idempotent membership add on `context.includeDirectories`
    #[tool(description = "Add a directory to the Gemini context paths")]
    async fn add_context_path(
        &self,
        Parameters(args): Parameters<AddContextPathArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = SettingsStore::new(&self.locations);
        store
            .add_list_item(INCLUDE_DIRECTORIES_PATH, &args.path, Some(Scope::User))
            .map_err(|e| tool_error(&e))?;
        let config_file = store
            .document_path(Some(Scope::User))
            .map_err(|e| tool_error(&e))?;
        payload(&json!({
            "success": true,
            "config_file": config_file.display().to_string(),
            "added_path": args.path,
            "tip": "Run '/dir add <path>' in Gemini to apply instantly.",
        }))
    }

    /// Coerce and write an aliased setting in the user scope
    #[tool(description = "Set a Gemini CLI setting by its alias")]
    async fn set_setting(
        &self,
        Parameters(args): Parameters<SetSettingArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = SettingsStore::new(&self.locations);
        let update = store
            .set_by_alias(&args.alias, &args.value, Some(Scope::User))
            .map_err(|e| tool_error(&e))?;
        payload(&json!({
            "success": true,
            "alias": args.alias,
            "path": update.path,
            "value": update.value,
            "restart_required": update.restart,
        }))
    }

    /// Read an aliased setting from the user scope
    #[tool(description = "Read a Gemini CLI setting by its alias")]
    async fn get_setting(
        &self,
        Parameters(args): Parameters<GetSettingArgs>,
    ) -> Result<CallToolResult, McpError> {
        let store = SettingsStore::new(&self.locations);
        let value = store
            .get_by_alias(&args.alias, Some(Scope::User))
            .map_err(|e| tool_error(&e))?;
        payload(&json!({
            "alias": args.alias,
            "value": value,
        }))
    }

    /// The command listing serialized for the `aicfg://commands` resource.
    fn commands_resource_text(&self) -> Result<String, McpError> {
        let store = CommandStore::new(&self.locations);
        let commands = store.list(None, None).map_err(|e| tool_error(&e))?;
        serde_json::to_string_pretty(&commands)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_handler]
impl ServerHandler for AicfgService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Manage Gemini CLI configuration: add_slash_command, list_slash_commands, \
                 get_slash_command, add_context_path, set_setting, get_setting. The resource \
                 aicfg://commands holds the full command listing as JSON."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut raw = RawResource::new(COMMANDS_RESOURCE_URI, "commands");
        raw.description = Some("List of all slash commands as a JSON resource".to_string());
        raw.mime_type = Some("application/json".to_string());
        Ok(ListResourcesResult {
            resources: vec![Resource::new(raw, None)],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != COMMANDS_RESOURCE_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                None,
            ));
        }
        let text = self.commands_resource_text()?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: request.uri,
                mime_type: Some("application/json".to_string()),
                text,
                meta: None,
            }],
        })
    }
}
