/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `fieldcheck` binary. Every
/// variant maps to a stable exit code via [`CliError::exit_code`]:
///
/// - Exit code **2**: the input could not be read or parsed, so no validation
///   ran.
/// - Exit code **1**: validation ran and at least one field failed.
use std::fmt;
use std::path::PathBuf;

/// All error conditions that the `fieldcheck` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// Reading from stdin failed.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error while reading input or writing output.
    IoError {
        /// What was being read or written.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input is not a valid validation document.
    ParseFailed {
        /// The parser's message, which ends with the line and column.
        detail: String,
    },

    /// Neither `--key` nor the document supplied a non-empty validation key.
    MissingKey,

    // --- Exit code 1: validation failures ---
    /// Validation ran and one or more fields failed.
    ///
    /// The per-field messages have already been printed.
    ValidationFailed {
        /// Number of failing fields.
        failed: usize,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::MissingKey => 2,

            Self::ValidationFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::ParseFailed { detail } => {
                format!("error: invalid validation document: {detail}")
            }
            Self::MissingKey => {
                "error: no validation key; pass --key or set \"key\" in the document".to_owned()
            }
            Self::ValidationFailed { failed } => {
                format!("error: validation failed for {failed} field(s)")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_failures_are_exit_2() {
        let errors = [
            CliError::FileNotFound {
                path: PathBuf::from("form.json"),
            },
            CliError::PermissionDenied {
                path: PathBuf::from("/root/form.json"),
            },
            CliError::FileTooLarge {
                source: "big.json".to_owned(),
                limit: 1024,
                actual: Some(2048),
            },
            CliError::InvalidUtf8 {
                source: "-".to_owned(),
                byte_offset: 3,
            },
            CliError::StdinReadError {
                detail: "interrupted".to_owned(),
            },
            CliError::IoError {
                source: "stdout".to_owned(),
                detail: "broken pipe".to_owned(),
            },
            CliError::ParseFailed {
                detail: "expected value at line 1 column 1".to_owned(),
            },
            CliError::MissingKey,
        ];
        for e in &errors {
            assert_eq!(e.exit_code(), 2, "{e}");
        }
    }

    #[test]
    fn validation_failure_is_exit_1() {
        assert_eq!(CliError::ValidationFailed { failed: 2 }.exit_code(), 1);
    }

    #[test]
    fn file_not_found_message_contains_path() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("signup.json"),
        };
        let msg = e.message();
        assert!(msg.contains("signup.json"), "message: {msg}");
        assert!(msg.contains("not found"), "message: {msg}");
    }

    #[test]
    fn file_too_large_without_actual() {
        let e = CliError::FileTooLarge {
            source: "-".to_owned(),
            limit: 10,
            actual: None,
        };
        assert!(e.message().contains("exceeded limit of 10 bytes"));
    }

    #[test]
    fn validation_failed_mentions_count() {
        let msg = CliError::ValidationFailed { failed: 3 }.to_string();
        assert!(msg.contains("3 field(s)"), "message: {msg}");
    }
}
