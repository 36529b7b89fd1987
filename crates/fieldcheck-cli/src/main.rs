mod cli;
mod cmd;
mod error;
mod io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = dispatch(&cli) {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Check { file, key, strict } => {
            let content = io::read_input(file, cli.max_file_size)?;
            cmd::check::run(&content, key.as_deref(), *strict, cli.format)
        }
        Command::Rules => cmd::rules::run(cli.format),
        Command::Version => {
            println!("{}", fieldcheck_core::version());
            Ok(())
        }
    }
}
