//! Database error types for arbor-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed, or a stored value could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data handed to a repo method).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A stored value failed a core type check.
    #[error(transparent)]
    Core(#[from] arbor_core::errors::CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether retrying the same operation may succeed (lock contention).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LibSql(_) | Self::Query(_) => crate::retry::is_transient_message(&self.to_string()),
            _ => false,
        }
    }
}
