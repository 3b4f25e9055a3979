//! Startup probe for stdio MCP servers
//!
//! Before a process-based server entry is persisted, the candidate command is
//! smoke-tested: spawn it, pipe a single JSON-RPC `initialize` request to its
//! stdin, close stdin, and wait for it to exit. A healthy server answers with
//! exactly one JSON line carrying a `result` (or a structured `error`) and
//! exits once its input reaches EOF.
//!
//! The probe is one-shot. Nothing supervises or restarts the process, and a
//! timeout simply kills it and reports failure.

use crate::core::AicfgError;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// How long a candidate server gets to answer the initialize request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one startup probe
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Whether the probe saw a well-formed JSON-RPC response
    pub success: bool,
    /// The parsed response line, when one was produced
    pub response: Option<Value>,
    /// Failure reason, when the probe did not succeed
    pub error: Option<String>,
}

impl ProbeOutcome {
    fn succeeded(response: Value) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(reason.into()),
        }
    }

    /// Convert a failed outcome into the error the CLI reports.
    ///
    /// # Errors
    ///
    /// Returns [`AicfgError::StartupProbeFailed`] unless the probe succeeded.
    pub fn into_result(self, command: &str) -> Result<Value, AicfgError> {
        if self.success
            && let Some(response) = self.response
        {
            return Ok(response);
        }
        Err(AicfgError::StartupProbeFailed {
            command: command.to_string(),
            reason: self.error.unwrap_or_else(|| "no response".to_string()),
        })
    }
}

/// The JSON-RPC initialize request piped to candidate servers.
fn initialize_request() -> String {
    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "aicfg",
                "version": env!("CARGO_PKG_VERSION"),
            },
        },
    });
    format!("{request}\n")
}

/// Spawn `argv` and check that it answers a JSON-RPC initialize request.
///
/// Success requires the process to emit exactly one JSON line containing a
/// `result` or `error` field before `probe_timeout` elapses. Every failure
/// mode (missing executable, timeout, garbage output) is folded into a failed
/// [`ProbeOutcome`] rather than an `Err`; the caller decides whether that is
/// fatal.
///
/// # Errors
///
/// Fails only when `argv` is empty.
pub async fn check_startup(
    argv: &[String],
    probe_timeout: Duration,
) -> Result<ProbeOutcome, AicfgError> {
    let (program, args) = argv.split_first().ok_or_else(|| AicfgError::ConfigError {
        message: "Cannot probe an empty command line".to_string(),
    })?;

    tracing::debug!(command = %argv.join(" "), timeout_secs = probe_timeout.as_secs(), "Probing server startup");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // A timeout drops the child future; make sure the process dies with it.
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return Ok(ProbeOutcome::failed(format!("failed to start '{program}': {e}")));
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let request = initialize_request();
        if let Err(e) = stdin.write_all(request.as_bytes()).await {
            return Ok(ProbeOutcome::failed(format!("failed to write initialize request: {e}")));
        }
        if let Err(e) = stdin.shutdown().await {
            return Ok(ProbeOutcome::failed(format!("failed to close server stdin: {e}")));
        }
    }

    let output = match timeout(probe_timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Ok(ProbeOutcome::failed(format!("failed to read server output: {e}")));
        }
        Err(_) => {
            tracing::warn!(command = %argv.join(" "), "Startup probe timed out");
            return Ok(ProbeOutcome::failed(format!(
                "timed out after {} seconds",
                probe_timeout.as_secs()
            )));
        }
    };

    Ok(evaluate_stdout(&String::from_utf8_lossy(&output.stdout)))
}

/// Judge probe stdout: exactly one JSON line with a `result` or `error` key.
fn evaluate_stdout(stdout: &str) -> ProbeOutcome {
    let lines: Vec<&str> = stdout.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    let line = match lines.as_slice() {
        [] => return ProbeOutcome::failed("no output before exit"),
        [line] => *line,
        more => {
            return ProbeOutcome::failed(format!(
                "expected a single JSON response line, got {} lines",
                more.len()
            ));
        }
    };

    let parsed: Value = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => return ProbeOutcome::failed(format!("output is not valid JSON: {e}")),
    };

    let well_formed =
        parsed.as_object().is_some_and(|obj| obj.contains_key("result") || obj.contains_key("error"));
    if well_formed {
        ProbeOutcome::succeeded(parsed)
    } else {
        ProbeOutcome::failed("JSON response has neither 'result' nor 'error' field")
    }
}
