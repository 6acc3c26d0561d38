//! # arbor-import
//!
//! Turns untyped tabular input into a validated node set for one topic.
//!
//! The input shape is `id, question, label_1, dest_1, label_2, dest_2, ...`.
//! Whole batches are validated before anything reaches the store: a single
//! bad row rejects the batch, and every bad row is reported at once.
//!
//! Two sources are supported:
//! - CSV (comma or semicolon, auto-detected) via [`read_table`] + [`build_batch`]
//! - the JSON payload of the external image extraction service via
//!   [`parse_json_batch`]

mod batch;
mod error;
mod json;
mod table;

pub use batch::{ImportBatch, build_batch};
pub use error::{ImportError, ImportWarning, RowError, RowErrorKind};
pub use json::parse_json_batch;
pub use table::{Table, detect_delimiter, read_table};
