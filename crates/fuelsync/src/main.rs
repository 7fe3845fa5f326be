mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fuelsync_core::Console;

use crate::cli::Cli;
use crate::commands::{LocalCommand, SessionCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cmd = match SessionCommand::try_from(cli.command) {
        Ok(cmd) => cmd,
        // Config commands don't need a backend session
        Err(LocalCommand::Config(args)) => return commands::config_cmd::handle(args, &cli.global),
        Err(LocalCommand::Completions(args)) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fuelsync", &mut std::io::stdout());
            return Ok(());
        }
    };

    let session = config::resolve_session(&cli.global)?;
    let notices = commands::util::notices(&cli.global);
    let console = Console::new(&session.sync, session.tokens, Arc::new(notices))
        .map_err(|e| CliError::from_api(e, "backend"))?;

    tracing::debug!(command = ?cmd, "dispatching command");
    commands::dispatch(cmd, &console, session.sync.offline, &cli.global).await
}
