//! Import error and warning types.

use serde::Serialize;
use thiserror::Error;

use arbor_core::ids::NodeId;

/// Errors that reject an import before the store is touched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("topic name must not be empty")]
    EmptyTopic,

    #[error("table needs at least 'id' and 'question' columns, found {found}")]
    MissingColumns { found: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("topic '{topic}' rejected: {} invalid row(s)", .errors.len())]
    InvalidRows {
        topic: String,
        errors: Vec<RowError>,
    },
}

/// A row that does not fit the node schema. `row` is the 1-based data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("row {row}: {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RowErrorKind {
    #[error("missing id")]
    MissingId,
    #[error("missing question")]
    MissingQuestion,
    #[error("duplicate id '{0}'")]
    DuplicateId(NodeId),
}

/// Non-fatal findings about an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ImportWarning {
    /// An option points at an id that is not in the batch.
    DanglingDestination {
        node: NodeId,
        label: String,
        destination: NodeId,
    },
    /// A label appears twice on one row; the later destination wins.
    DuplicateLabel { node: NodeId, label: String },
    /// The input had no data rows; importing it empties the topic.
    EmptyBatch,
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingDestination {
                node,
                label,
                destination,
            } => write!(
                f,
                "node '{node}' option '{label}' points at missing node '{destination}'"
            ),
            Self::DuplicateLabel { node, label } => {
                write!(f, "node '{node}' repeats option '{label}'; last one kept")
            }
            Self::EmptyBatch => f.write_str("no data rows; the topic will be emptied"),
        }
    }
}
