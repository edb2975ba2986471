//! Error types for mapema.
//!
//! This module defines all error types used throughout the mapema crate.
//! Every failure is handled locally by the presentation layer; the predicate
//! helpers on [`Error`] tell a caller which fallback state to show.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mapema operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Credential Errors ===
    /// No access token is available for the map widget.
    #[error("no map access token available")]
    MissingCredential,

    // === Map Widget Errors ===
    /// An overlay or marker operation was attempted before the widget signaled readiness.
    #[error("map widget is not ready")]
    NotReady,

    /// The handle refers to a map instance that has already been torn down.
    #[error("map handle {generation} is no longer live")]
    StaleHandle {
        /// Generation of the stale handle.
        generation: u64,
    },

    /// The external widget failed during construction.
    #[error("map widget failed to initialize: {message}")]
    WidgetInitFailure {
        /// Description of what went wrong.
        message: String,
    },

    /// The widget was disposed before it ever signaled readiness.
    #[error("map widget was disposed before signaling readiness")]
    ReadySignalDropped,

    /// A live widget rejected a source, layer or marker.
    #[error("map widget operation failed: {0}")]
    Widget(#[from] crate::map::WidgetError),

    // === Data Errors ===
    /// A congestion classification outside the known set was encountered.
    #[error("unknown congestion classification: {value:?}")]
    UnknownClassification {
        /// The offending value.
        value: String,
    },

    /// A categorical value outside its known set was encountered.
    #[error("unknown {kind}: {value:?}")]
    UnknownValue {
        /// Which kind of value was being parsed.
        kind: &'static str,
        /// The offending value.
        value: String,
    },

    /// A dataset file could not be loaded.
    #[error("failed to load dataset from {path}: {message}")]
    DataLoad {
        /// Path to the dataset file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for mapema operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a widget initialization error.
    #[must_use]
    pub fn widget_init(message: impl Into<String>) -> Self {
        Self::WidgetInitFailure {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the credential capture form should be shown.
    #[must_use]
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }

    /// Check if this error is a call-sequencing mistake against the widget.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady | Self::StaleHandle { .. })
    }

    /// Check if the user can recover by supplying a (new) credential.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::WidgetInitFailure { .. } | Self::ReadySignalDropped
        )
    }
}
