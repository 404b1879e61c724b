//! Error types for the providers and their storage engine.

use std::path::PathBuf;

use telephony_sql::{InvalidIdentifier, MalformedSelection, ProjectionError, SortOrderError};
use thiserror::Error;

/// Errors returned by provider operations and [`QueryExecutor`] implementations.
///
/// [`QueryExecutor`]: crate::QueryExecutor
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The caller selection failed the parenthesis check and the provider
    /// runs with [`SelectionPolicy::Reject`](crate::SelectionPolicy::Reject).
    #[error("invalid selection: {0}")]
    MalformedSelection(#[from] MalformedSelection),
    /// A column name in the supplied values is not a plain identifier.
    #[error(transparent)]
    InvalidColumn(#[from] InvalidIdentifier),
    /// A projection entry is not a column, `*` or `count(*)`.
    #[error(transparent)]
    InvalidProjection(#[from] ProjectionError),
    /// A sort term is not `column [ASC|DESC]`.
    #[error(transparent)]
    InvalidSortOrder(#[from] SortOrderError),
    /// The target does not support the requested operation.
    #[error("{operation} is not supported on {target}")]
    Unsupported {
        /// Provider target, e.g. `sms/42`.
        target: String,
        /// Operation name.
        operation: &'static str,
    },
    /// A `UNIQUE`, `NOT NULL` or other constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// Storage engine error.
    #[error("database error: {0}")]
    Db(String),
    /// Stored schema version cannot be opened by this build.
    #[error("schema version mismatch: {0}")]
    VersionMismatch(String),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<rusqlite::Error> for ProviderError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(message.clone().unwrap_or_else(|| err.to_string()))
            },
            _ => Self::Db(err.to_string()),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
