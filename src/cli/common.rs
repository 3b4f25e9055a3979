//! Shared helpers for CLI command implementations.
//!
//! The list-backed command groups (`paths`, `allowed-tools`, and the context
//! file-name subcommands) all render the same single-column table over a
//! string list stored in the settings document. The readers and printers for
//! that shape live here so the groups stay thin.

use colored::Colorize;
use serde_json::Value;

use crate::core::{AicfgError, Scope};
use crate::settings::SettingsStore;

/// Read a string list from the settings document at `path`.
///
/// A missing key or a value of the wrong shape reads as an empty list. A lone
/// string is treated as a one-element list, matching how the Gemini CLI
/// tolerates scalar values where a list is expected. Non-string elements
/// inside an array are skipped.
pub fn read_string_list(
    store: &SettingsStore<'_>,
    path: &str,
    scope: Option<Scope>,
) -> Result<Vec<String>, AicfgError> {
    let value = store.get(path, scope)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}

/// Print a single-column table with a colored header and rule.
///
/// The column width grows to fit the longest value. Padding happens on the
/// plain strings before coloring so ANSI escapes never skew the layout.
pub fn print_single_column(header: &str, values: &[String]) {
    let width = values
        .iter()
        .map(String::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len());

    println!();
    println!("{}", format!("{:<width$}", header).cyan().bold());
    println!("{}", "-".repeat(width).bright_black());
    for value in values {
        println!("{value}");
    }
}
