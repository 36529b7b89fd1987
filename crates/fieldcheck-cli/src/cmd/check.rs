//! Implementation of `fieldcheck check <file>`.
//!
//! Reads a validation document, registers its options under one validation
//! key and executes that key.
//!
//! Exit codes:
//! - 0 = every field passed
//! - 1 = at least one field failed
//! - 2 = the document could not be read or parsed
use std::io::Write;

use fieldcheck_core::{
    UnknownRulePolicy, ValidationOption, ValidationResult, Validator, ValidatorConfig,
};
use serde::Deserialize;

use crate::cli::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;

/// The on-disk shape of a validation document.
#[derive(Debug, Default, Deserialize)]
pub struct CheckDocument {
    /// Validation key; `--key` takes precedence.
    #[serde(default)]
    pub key: Option<String>,
    /// The fields to validate.
    #[serde(default)]
    pub options: Vec<ValidationOption>,
}

/// Runs the `check` command.
///
/// Prints the failing fields to stdout (or the whole result in JSON mode) and
/// returns [`CliError::ValidationFailed`] when any field failed.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] when `content` is not a validation document.
/// - [`CliError::MissingKey`] when no non-empty key was supplied.
/// - [`CliError::ValidationFailed`] when one or more fields failed.
pub fn run(
    content: &str,
    key: Option<&str>,
    strict: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let doc: CheckDocument = serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
        detail: e.to_string(),
    })?;

    let key = key
        .map(str::to_owned)
        .or(doc.key)
        .filter(|k| !k.is_empty())
        .ok_or(CliError::MissingKey)?;

    let result = validate(&key, doc.options, strict);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, &result, format).map_err(|e| stdout_error(&e))?;

    if result.is_valid() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed {
            failed: result.data.len(),
        })
    }
}

/// Registers `options` under `key` on a fresh validator and executes it.
pub fn validate(key: &str, options: Vec<ValidationOption>, strict: bool) -> ValidationResult {
    let config = ValidatorConfig {
        unknown_rules: if strict {
            UnknownRulePolicy::Report
        } else {
            UnknownRulePolicy::Ignore
        },
    };
    let mut validator = Validator::with_config(config);
    let total = options.len();
    validator.add_rules(key, options);
    tracing::debug!(key, options = total, "executing validation document");
    validator.execute(key)
}

/// Writes `result` in the requested format.
///
/// Human mode writes one `field: message` line per failing field and nothing
/// for a passing result. JSON mode writes the result object followed by a
/// newline.
pub fn write_result<W: Write>(
    w: &mut W,
    result: &ValidationResult,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => {
            for (field, message) in result.errors() {
                writeln!(w, "{field}: {message}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *w, result)?;
            writeln!(w)?;
        }
    }
    w.flush()
}
