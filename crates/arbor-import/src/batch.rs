//! Row validation and node assembly.

use std::collections::HashSet;

use serde::Serialize;

use arbor_core::entities::{FlowNode, NodeOptions, TopicFlow};
use arbor_core::ids::NodeId;

use crate::error::{ImportError, ImportWarning, RowError, RowErrorKind};
use crate::table::Table;

/// A validated node set for one topic, ready for `replace_topic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBatch {
    pub topic: String,
    pub nodes: Vec<FlowNode>,
    pub warnings: Vec<ImportWarning>,
}

/// One input row before validation, whatever the source format.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawRow {
    /// 1-based data row number.
    pub row: usize,
    pub id: String,
    pub question: String,
    pub pairs: Vec<(String, String)>,
}

/// Build an [`ImportBatch`] from a CSV [`Table`].
///
/// Column 0 is the id, column 1 the question; from column 2 on, columns pair
/// up as (label, destination). A label column without a destination column
/// is ignored, as is a pair with either side blank. Rows with every cell
/// blank are skipped.
///
/// # Errors
///
/// Returns `ImportError::EmptyTopic` for a blank topic, and
/// `ImportError::InvalidRows` listing every row that lacks an id or question
/// or repeats an id.
pub fn build_batch(topic: &str, table: &Table) -> Result<ImportBatch, ImportError> {
    let width = table.headers.len();
    let rows = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(index, _)| RawRow {
            row: index + 1,
            id: table.cell(index, 0).to_string(),
            question: table.cell(index, 1).to_string(),
            pairs: (2..width)
                .step_by(2)
                .filter(|label_col| label_col + 1 < width)
                .map(|label_col| {
                    (
                        table.cell(index, label_col).to_string(),
                        table.cell(index, label_col + 1).to_string(),
                    )
                })
                .collect(),
        })
        .collect();
    assemble(topic, rows)
}

/// Validate raw rows as a whole and turn them into nodes.
pub(crate) fn assemble(topic: &str, rows: Vec<RawRow>) -> Result<ImportBatch, ImportError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ImportError::EmptyTopic);
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(rows.len());

    for raw in rows {
        let id = NodeId::parse(&raw.id).ok();
        let question = raw.question.trim();

        if id.is_none() {
            errors.push(RowError {
                row: raw.row,
                kind: RowErrorKind::MissingId,
            });
        }
        if question.is_empty() {
            errors.push(RowError {
                row: raw.row,
                kind: RowErrorKind::MissingQuestion,
            });
        }
        let Some(id) = id else { continue };
        if !seen.insert(id.clone()) {
            errors.push(RowError {
                row: raw.row,
                kind: RowErrorKind::DuplicateId(id),
            });
            continue;
        }
        if question.is_empty() {
            continue;
        }

        let mut options = NodeOptions::new();
        for (label, destination) in &raw.pairs {
            let label = label.trim();
            let Ok(destination) = NodeId::parse(destination) else {
                continue;
            };
            if label.is_empty() {
                continue;
            }
            if options.insert(label, destination).is_some() {
                warnings.push(ImportWarning::DuplicateLabel {
                    node: id.clone(),
                    label: label.to_string(),
                });
            }
        }

        nodes.push(FlowNode {
            topic: topic.to_string(),
            id,
            question: question.to_string(),
            options,
        });
    }

    if !errors.is_empty() {
        tracing::warn!(topic, invalid = errors.len(), "rejected import batch");
        return Err(ImportError::InvalidRows {
            topic: topic.to_string(),
            errors,
        });
    }

    let flow = TopicFlow::new(topic, nodes);
    if flow.is_empty() {
        warnings.push(ImportWarning::EmptyBatch);
    }
    warnings.extend(flow.dangling_destinations().into_iter().map(|dangling| {
        ImportWarning::DanglingDestination {
            node: dangling.node,
            label: dangling.label,
            destination: dangling.destination,
        }
    }));

    Ok(ImportBatch {
        topic: flow.topic,
        nodes: flow.nodes,
        warnings,
    })
}
