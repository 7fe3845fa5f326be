//! Command dispatch: bridges CLI args -> console operations -> output formatting.

pub mod config_cmd;
pub mod health;
pub mod stations;
pub mod users;
pub mod util;
pub mod washing_bay;

use fuelsync_core::Console;

use crate::cli::{Command, CompletionsArgs, ConfigArgs, GlobalOpts, StationsArgs, UsersArgs, WashingBayArgs};
use crate::error::CliError;

/// Commands that talk to the backend through a [`Console`].
#[derive(Debug)]
pub enum SessionCommand {
    Health,
    Stations(StationsArgs),
    Users(UsersArgs),
    WashingBay(WashingBayArgs),
}

/// Commands that run locally, before any backend session exists.
#[derive(Debug)]
pub enum LocalCommand {
    Config(ConfigArgs),
    Completions(CompletionsArgs),
}

impl TryFrom<Command> for SessionCommand {
    type Error = LocalCommand;

    fn try_from(cmd: Command) -> Result<Self, Self::Error> {
        match cmd {
            Command::Health => Ok(Self::Health),
            Command::Stations(args) => Ok(Self::Stations(args)),
            Command::Users(args) => Ok(Self::Users(args)),
            Command::WashingBay(args) => Ok(Self::WashingBay(args)),
            Command::Config(args) => Err(LocalCommand::Config(args)),
            Command::Completions(args) => Err(LocalCommand::Completions(args)),
        }
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: SessionCommand,
    console: &Console,
    offline: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        SessionCommand::Health => health::handle(console, offline, global).await,
        SessionCommand::Stations(args) => stations::handle(console, args, global).await,
        SessionCommand::Users(args) => users::handle(console, args, global).await,
        SessionCommand::WashingBay(args) => washing_bay::handle(console, args, global).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("fuelsync").chain(args.iter().copied()))
            .map(|cli| cli.command)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn backend_commands_need_a_session() {
        assert!(matches!(SessionCommand::try_from(command(&["health"])), Ok(SessionCommand::Health)));
        assert!(matches!(
            SessionCommand::try_from(command(&["wb", "list"])),
            Ok(SessionCommand::WashingBay(_))
        ));
    }

    #[test]
    fn local_commands_are_handed_back() {
        assert!(matches!(
            SessionCommand::try_from(command(&["config", "show"])),
            Err(LocalCommand::Config(_))
        ));
        assert!(matches!(
            SessionCommand::try_from(command(&["completions", "bash"])),
            Err(LocalCommand::Completions(_))
        ));
    }
}
