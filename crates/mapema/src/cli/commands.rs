//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{AlertCategory, Classification};

/// Route listing arguments.
#[derive(Debug, Args)]
pub struct RoutesCommand {
    /// Case-insensitive text matched against name, origin and destination
    #[arg(long, default_value = "")]
    pub query: String,

    /// Only show routes with this congestion status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Alert listing arguments.
#[derive(Debug, Args)]
pub struct AlertsCommand {
    /// Only show alerts of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub category: Option<AlertTypeArg>,

    /// Include alerts that have been resolved
    #[arg(short, long)]
    pub include_resolved: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Traffic board arguments.
#[derive(Debug, Args)]
pub struct TrafficCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Map session arguments.
#[derive(Debug, Args)]
pub struct MapCommand {
    /// Build the map without navigation and geolocation controls
    #[arg(long)]
    pub no_controls: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Access token commands.
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Store the map access token
    Set {
        /// The token value
        value: String,
    },

    /// Show whether a token is stored, by fingerprint
    Show,

    /// Remove the stored token
    Clear,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Congestion status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Free-flowing traffic
    Clear,
    /// Slow traffic
    Moderate,
    /// Heavy traffic
    Congested,
}

impl From<StatusArg> for Classification {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Clear => Self::Clear,
            StatusArg::Moderate => Self::Moderate,
            StatusArg::Congested => Self::Congested,
        }
    }
}

/// Alert type argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertTypeArg {
    /// Accidents and breakdowns
    Incident,
    /// Road works and closures
    Roadwork,
    /// Planned events
    Event,
    /// General information
    Info,
}

impl From<AlertTypeArg> for AlertCategory {
    fn from(arg: AlertTypeArg) -> Self {
        match arg {
            AlertTypeArg::Incident => Self::Incident,
            AlertTypeArg::Roadwork => Self::Roadwork,
            AlertTypeArg::Event => Self::Event,
            AlertTypeArg::Info => Self::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(Classification::from(StatusArg::Clear), Classification::Clear);
        assert_eq!(
            Classification::from(StatusArg::Moderate),
            Classification::Moderate
        );
        assert_eq!(
            Classification::from(StatusArg::Congested),
            Classification::Congested
        );
    }

    #[test]
    fn test_alert_type_arg_conversion() {
        assert_eq!(
            AlertCategory::from(AlertTypeArg::Incident),
            AlertCategory::Incident
        );
        assert_eq!(
            AlertCategory::from(AlertTypeArg::Roadwork),
            AlertCategory::Roadwork
        );
        assert_eq!(AlertCategory::from(AlertTypeArg::Event), AlertCategory::Event);
        assert_eq!(AlertCategory::from(AlertTypeArg::Info), AlertCategory::Info);
    }

    #[test]
    fn test_value_enum_names_match_model() {
        for arg in StatusArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(Classification::from(*arg).to_string(), name);
        }
    }
}
