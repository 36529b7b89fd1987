//! Implementation of `fieldcheck rules`.
//!
//! Lists every rule name in the process-wide registry with its default
//! message. Parameterised messages have no fixed text and are shown as such.
use std::io::Write;

use fieldcheck_core::{MessageEntry, Registry, with_registry};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;

/// One row of the listing.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RuleInfo {
    /// Registered rule name.
    pub name: String,
    /// Fixed default message, or `None` when it depends on the parameter.
    pub message: Option<String>,
}

/// Runs the `rules` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] when stdout cannot be written.
pub fn run(format: OutputFormat) -> Result<(), CliError> {
    let rows = with_registry(describe);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_rules(&mut out, &rows, format).map_err(|e| stdout_error(&e))
}

/// Collects the rule listing from `registry` in name order.
pub fn describe(registry: &Registry) -> Vec<RuleInfo> {
    registry
        .rule_names()
        .map(|name| RuleInfo {
            name: name.to_owned(),
            message: match registry.messages().get(name) {
                Some(MessageEntry::Literal(text)) => Some(text.clone()),
                Some(MessageEntry::Generator(_)) | None => None,
            },
        })
        .collect()
}

fn write_rules<W: Write>(w: &mut W, rows: &[RuleInfo], format: OutputFormat) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => {
            let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for row in rows {
                let message = row.message.as_deref().unwrap_or("(depends on parameter)");
                writeln!(w, "{:<width$}  {message}", row.name)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *w, rows)?;
            writeln!(w)?;
        }
    }
    w.flush()
}
