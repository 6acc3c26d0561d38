use arbor_core::entities::{FlowNode, UsageLogEntry};
use arbor_core::session::SessionState;
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `arb schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_value(args.type_name)?, flags.format)
}

fn schema_value(type_name: SchemaType) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name {
        SchemaType::Node => schema_for!(FlowNode),
        SchemaType::UsageEntry => schema_for!(UsageLogEntry),
        SchemaType::SessionState => schema_for!(SessionState),
    };
    Ok(serde_json::to_value(schema)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn schemas_are_titled_after_their_type() {
        for (type_name, title) in [
            (SchemaType::Node, "FlowNode"),
            (SchemaType::UsageEntry, "UsageLogEntry"),
            (SchemaType::SessionState, "SessionState"),
        ] {
            let schema = schema_value(type_name).unwrap();
            assert_eq!(schema["title"], title);
        }
    }

    #[test]
    fn node_schema_describes_options_as_string_map() {
        let schema = schema_value(SchemaType::Node).unwrap();
        assert_eq!(schema["properties"]["options"]["type"], "object");
        assert_eq!(
            schema["properties"]["options"]["additionalProperties"]["type"],
            "string"
        );
    }
}
