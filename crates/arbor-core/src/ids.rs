//! Identifier value types and ID prefix constants.
//!
//! Node ids and destinations arrive from spreadsheets as loosely typed cells.
//! They are normalized exactly once, here, so every comparison downstream is
//! a plain string equality.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Prefix for usage log entry ids (`use-a3f8b2c1`).
pub const PREFIX_USAGE: &str = "use";

/// Opaque identifier of a node within one topic.
///
/// Used both for a node's own id and for every option destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Normalize a raw cell into a `NodeId`.
    ///
    /// Trims surrounding whitespace and collapses integral float renderings
    /// (`"2.0"`, `"14.00"`) to their integer form, so a sheet that exported a
    /// numeric column as floats still links up with plain integer ids.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the value is empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("node id must not be empty".into()));
        }
        Ok(Self(collapse_integral_float(trimmed).to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn collapse_integral_float(raw: &str) -> &str {
    match raw.split_once('.') {
        Some((int, frac))
            if !int.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && !frac.is_empty()
                && frac.bytes().all(|b| b == b'0') =>
        {
            int
        }
        _ => raw,
    }
}

/// Free-text identifier of the person using a guide (usually an email).
///
/// Not verified beyond containing `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserIdentifier(String);

impl UserIdentifier {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the trimmed value has no `@`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if !trimmed.contains('@') {
            return Err(CoreError::Validation(format!(
                "user identifier '{trimmed}' must contain '@'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
