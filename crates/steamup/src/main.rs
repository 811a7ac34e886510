//! steamup CLI entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use steamup::cli::{self, Cli, CliError, Commands, EXIT_OK, exit_code_for};
use steamup::commands;

fn main() {
    let cli = cli::parse();

    if let Err(e) = steamup::tracing::init(cli.level) {
        eprintln!("Failed to initialize tracing: {e:?}");
        std::process::exit(cli::EXIT_CONFIG);
    }

    match run(cli) {
        Ok(()) => std::process::exit(EXIT_OK),
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Setup { smoke_tolerance } => {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| CliError::config(format!("Failed to start async runtime: {e}")))?;
            runtime.block_on(commands::setup::execute(smoke_tolerance))
        }
        Commands::Cleanup => commands::cleanup::execute(),
    }
}
