//! Structured log output for the `mapema` binary and library.
//!
//! Logs are written to stderr so that `--json` output on stdout stays
//! machine-readable. Access tokens never appear in logs: every call site
//! formats a [`crate::credential::Credential`] through its `Display` impl,
//! which prints only a fingerprint.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the `mapema` target logs when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Lifecycle events such as widget creation and release.
    #[default]
    Normal,
    /// Adds skipped calls, ignored signals and overlay details (`-v`).
    Verbose,
    /// Adds every widget call and filter decision (`-vv`).
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the `-v` count to a verbosity. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level emitted at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive scoping this verbosity to the `mapema` target.
    #[must_use]
    pub fn default_directive(&self) -> String {
        format!("mapema={}", self.to_level_filter())
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the directive derived from `verbosity`.
/// Calling this again after a subscriber is installed does nothing.
///
/// ```no_run
/// use mapema::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}

/// Warn-level logging captured by the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
