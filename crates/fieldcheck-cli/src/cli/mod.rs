//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` prints one `field: message` line per failing field. `Json` prints
/// the serialized validation result as a single object.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default).
    Human,
    /// A single JSON object.
    Json,
}

/// All top-level subcommands exposed by the `fieldcheck` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Validate the fields described by a JSON validation document.
    ///
    /// The document has the shape `{"key": "...", "options": [...]}`, where
    /// each option carries a `model` (`name`, `value`), a `rules` map and an
    /// optional `messages` map.
    Check {
        /// Path to a validation document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Validation key to register and execute under.
        ///
        /// Overrides the document's `key`.
        #[arg(long)]
        key: Option<String>,
        /// Fail fields that reference a rule name nobody registered.
        #[arg(long)]
        strict: bool,
    },

    /// List the registered rule names and their default messages.
    Rules,

    /// Print the fieldcheck-core library version.
    Version,
}

/// Root CLI struct for the `fieldcheck` binary.
#[derive(Parser)]
#[command(
    name = "fieldcheck",
    version,
    about = "Declarative field validation driven by named rules"
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `FIELDCHECK_MAX_FILE_SIZE` environment
    /// variable. The CLI flag takes precedence over the environment variable.
    /// Default: 16777216 (16 MB).
    #[arg(
        long,
        global = true,
        env = "FIELDCHECK_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,
}
