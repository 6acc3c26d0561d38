//! Cross-cutting error types for Arbor.
//!
//! Domain-specific errors (`DatabaseError`, `ImportError`, `ConfigError`) are
//! defined in their respective crates and converge on `anyhow` in `arbor-cli`.

use thiserror::Error;

/// Errors that can be raised by any Arbor crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed validation at a type boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
