use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::UsageCategory;

/// An append-only record of one option click or search.
///
/// For a flow step `subject` is `"[<topic>] <question>"` and `step_label` is
/// the chosen option. For a search `subject` is the query text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UsageLogEntry {
    pub id: String,
    pub user_identifier: String,
    pub category: UsageCategory,
    pub subject: String,
    pub step_label: Option<String>,
    pub reached_terminal: Option<bool>,
    pub created_at: DateTime<Utc>,
}
