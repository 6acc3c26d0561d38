//! Entity structs for all Arbor domain objects.
//!
//! Each persisted entity maps to a table in the libSQL database. All structs
//! derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and
//! schema validation.

mod flow_node;
mod usage;

pub use flow_node::{DanglingDestination, FlowNode, NodeOptions, TopicFlow};
pub use usage::UsageLogEntry;
