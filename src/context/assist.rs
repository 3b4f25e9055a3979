//! Gemini-assisted context analysis and revision
//!
//! Both operations build a prompt from the on-disk context files and send it
//! to the Gemini generative language API. Analysis is read-only; revision
//! rewrites the scope's context file after backing it up.

use super::{ContextManager, ContextStatus, read_plain_file};
use crate::config::Locations;
use crate::core::{AicfgError, Scope};
use crate::utils::fs::{backup_file, read_text_file, write_text_file};
use serde_json::Value;

/// Model used when none is requested.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Minimal client for the Gemini `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client from `GEMINI_API_KEY`, with an optional model override.
    ///
    /// # Errors
    ///
    /// Fails when `GEMINI_API_KEY` is not set.
    pub fn from_env(model: Option<String>) -> Result<Self, AicfgError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| AicfgError::MissingApiKey)?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// The model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the generated text.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success status codes, or a response
    /// without generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AicfgError> {
        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, self.api_key);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!(model = %self.model, prompt_bytes = prompt.len(), "Sending generate request");
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AicfgError::ApiRequestFailed {
                reason: format!("HTTP {status}: {}", truncate(&detail, 300)),
            });
        }

        let payload: Value = response.json().await?;
        extract_text(&payload).ok_or_else(|| AicfgError::ApiRequestFailed {
            reason: "response held no generated text".to_string(),
        })
    }
}

/// Result of a context analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Scope label the analysis covered (`user`, `project`, or `all`)
    pub scope: String,
    /// The assistant's answer
    pub response: String,
    /// Model that produced the answer
    pub model: String,
}

/// Result of a context revision
#[derive(Debug, Clone)]
pub struct Revision {
    /// Scope whose file was rewritten
    pub scope: Scope,
    /// Home-contracted path of the rewritten file
    pub file: String,
    /// Home-contracted path of the backup
    pub backup: String,
    /// Model that produced the new content
    pub model: String,
}

/// Ask the assistant a question about the context files of one or all scopes.
///
/// With `scope` unset, both the user and project scopes are described in the
/// prompt and the question is asked once over the combined picture.
///
/// # Errors
///
/// Fails when the API key is missing, the scope is invalid, or the API call
/// fails.
pub async fn analyze_context(
    locations: &Locations,
    scope: Option<Scope>,
    prompt: &str,
    model: Option<String>,
) -> Result<Analysis, AicfgError> {
    let client = GeminiClient::from_env(model)?;
    let manager = ContextManager::new(locations);
    let status = manager.status(scope)?;

    let full_prompt = match scope {
        Some(scope) => format!(
            "You are analyzing AI assistant context files.\n\n{}",
            build_scope_prompt(&manager, &status, scope, prompt)?
        ),
        None => {
            let user = build_scope_prompt(&manager, &status, Scope::User, "")?;
            let project = build_scope_prompt(&manager, &status, Scope::Project, "")?;
            format!(
                "You are analyzing AI assistant context files from both user and project scopes.\n\n\
                 {user}\n\n{project}\n\n*** USER QUESTION ***\n\n{prompt}"
            )
        }
    };

    let response = client.generate(&full_prompt).await?;
    Ok(Analysis {
        scope: scope.map_or_else(|| "all".to_string(), |s| s.as_str().to_string()),
        response,
        model: client.model().to_string(),
    })
}

/// Rewrite a scope's context file according to the user's instructions.
///
/// The first regular (non-symlink) file among `CONTEXT.md`, `CLAUDE.md`, and
/// `GEMINI.md` is the revision target. The previous content is copied to a
/// `.bak` sibling before the new content is written.
///
/// # Errors
///
/// Fails when the API key is missing, the scope has no regular context file,
/// or the API call fails.
pub async fn revise_context(
    locations: &Locations,
    scope: Scope,
    prompt: &str,
    model: Option<String>,
) -> Result<Revision, AicfgError> {
    let client = GeminiClient::from_env(model)?;
    let manager = ContextManager::new(locations);
    let paths = manager.paths(scope)?;

    let target = paths
        .entries()
        .into_iter()
        .map(|(_, path)| path.to_path_buf())
        .find(|path| path.exists() && !path.is_symlink())
        .ok_or_else(|| AicfgError::ContextFileNotFound {
            path: manager.home_relative(&paths.unified),
        })?;
    let content = read_text_file(&target).map_err(|e| AicfgError::FileSystemError {
        operation: "read context file".to_string(),
        path: format!("{}: {e}", target.display()),
    })?;

    let revision_prompt = format!(
        "You are an expert technical writer and configuration manager.\n\
         Your task is to update the following Context File based on the user's request.\n\
         Strictly adhere to these rules:\n\
         1. Return ONLY the full content of the updated file. No markdown code blocks, no intro/outro text.\n\
         2. Preserve all existing sections, formatting, and content unless the user's request specifically implies changing them.\n\
         3. Ensure the result is valid Markdown.\n\
         \n\
         --- CURRENT FILE: {} ---\n\
         {content}\n\
         --- END CURRENT FILE ---\n\
         \n\
         USER REQUEST: {prompt}",
        manager.home_relative(&target)
    );

    let raw = client.generate(&revision_prompt).await?;
    let new_content = strip_code_fence(&raw);

    let backup = backup_file(&target).map_err(|e| AicfgError::FileSystemError {
        operation: "back up context file".to_string(),
        path: format!("{}: {e}", target.display()),
    })?;
    write_text_file(&target, &new_content).map_err(|e| AicfgError::FileSystemError {
        operation: "write revised context file".to_string(),
        path: format!("{}: {e}", target.display()),
    })?;
    tracing::info!(file = %target.display(), model = %client.model(), "Revised context file");

    Ok(Revision {
        scope,
        file: manager.home_relative(&target),
        backup: manager.home_relative(&backup),
        model: client.model().to_string(),
    })
}

/// One scope's section of the analysis prompt: location header, status JSON,
/// the readable file contents, and the question.
fn build_scope_prompt(
    manager: &ContextManager<'_>,
    status: &ContextStatus,
    scope: Scope,
    question: &str,
) -> Result<String, AicfgError> {
    let mut sections = Vec::new();

    match &status.git_root {
        Some(root) => sections.push(format!(
            "Working directory: {}\nGit repository root: {root}",
            status.working_directory
        )),
        None => sections.push(format!(
            "Working directory: {} (not a git repository)",
            status.working_directory
        )),
    }

    if let Some(scope_status) = status.scopes.get(scope.as_str()) {
        sections.push(format!(
            "*** CONTEXT STATUS ({scope} scope) ***\n\n{}",
            serde_json::to_string_pretty(scope_status)?
        ));
    }

    let paths = manager.paths(scope)?;
    for (_, path) in paths.entries() {
        if let Some(content) = read_plain_file(path) {
            sections.push(format!(
                "*** {} ***\n\n{}",
                manager.home_relative(path),
                content.trim()
            ));
        }
    }

    sections.push(format!("*** USER QUESTION ***\n\n{question}"));
    Ok(sections.join("\n\n"))
}

/// Drop a surrounding markdown code fence, if the model added one anyway.
fn strip_code_fence(raw: &str) -> String {
    let mut text = raw;
    if let Some(rest) = text.strip_prefix("```markdown") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// Pull the generated text out of a `generateContent` response.
fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let pieces: Vec<&str> =
        parts.iter().filter_map(|part| part.get("text").and_then(Value::as_str)).collect();
    if pieces.is_empty() {
        None
    } else {
        Some(pieces.concat())
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
