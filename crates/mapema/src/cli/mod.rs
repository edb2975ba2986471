//! Command-line interface for mapema.
//!
//! This module provides the CLI structure for the `mapema` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AlertTypeArg, AlertsCommand, ConfigCommand, MapCommand, RoutesCommand, StatusArg,
    TokenCommand, TrafficCommand,
};

/// mapema - Nairobi traffic and transit at a glance
///
/// Browse matatu routes and traffic alerts, check corridor congestion, and
/// manage the access token used by the live map.
#[derive(Debug, Parser)]
#[command(name = "mapema")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List transit routes
    Routes(RoutesCommand),

    /// List traffic alerts
    Alerts(AlertsCommand),

    /// Show the corridor status board
    Traffic(TrafficCommand),

    /// Manage the map access token
    #[command(subcommand)]
    Token(TokenCommand),

    /// Run a map session against a recording widget and print its calls
    Map(MapCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn traffic() -> Command {
        Command::Traffic(TrafficCommand { json: false })
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "mapema");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        let mut cli = Cli {
            config: None,
            verbose: 0,
            quiet: false,
            command: traffic(),
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
        cli.verbose = 1;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
        cli.verbose = 3;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
        cli.quiet = true;
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_parse_routes_with_filters() {
        let cli =
            Cli::try_parse_from(["mapema", "routes", "--query", "westlands", "-s", "clear"])
                .unwrap();
        match cli.command {
            Command::Routes(cmd) => {
                assert_eq!(cmd.query, "westlands");
                assert_eq!(cmd.status, Some(StatusArg::Clear));
                assert!(!cmd.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_routes_defaults() {
        let cli = Cli::try_parse_from(["mapema", "routes"]).unwrap();
        match cli.command {
            Command::Routes(cmd) => {
                assert!(cmd.query.is_empty());
                assert!(cmd.status.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_routes_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["mapema", "routes", "--status", "gridlock"]).is_err());
    }

    #[test]
    fn test_parse_alerts() {
        let cli = Cli::try_parse_from([
            "mapema",
            "alerts",
            "--type",
            "roadwork",
            "--include-resolved",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Alerts(cmd) => {
                assert_eq!(cmd.category, Some(AlertTypeArg::Roadwork));
                assert!(cmd.include_resolved);
                assert!(cmd.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_token_set() {
        let cli = Cli::try_parse_from(["mapema", "token", "set", "pk.test123"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Token(TokenCommand::Set { ref value }) if value == "pk.test123"
        ));
    }

    #[test]
    fn test_parse_map_no_controls() {
        let cli = Cli::try_parse_from(["mapema", "map", "--no-controls"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Map(MapCommand {
                no_controls: true,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["mapema", "config", "validate", "--file", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["mapema", "-c", "/custom/config.toml", "traffic"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["mapema", "-vv", "traffic"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["mapema", "-q", "traffic"]).unwrap();
        assert!(cli.quiet);
    }
}
