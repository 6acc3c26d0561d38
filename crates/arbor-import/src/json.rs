//! JSON payloads from the image extraction service.
//!
//! The service is best-effort: the payload may be wrapped in a Markdown code
//! fence, ids may come back as numbers, and `options` may be an object, a
//! JSON-encoded string of one, or null.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};

use crate::batch::{ImportBatch, RawRow, assemble};
use crate::error::ImportError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Nodes(Vec<JsonNode>),
    Wrapped { nodes: Vec<JsonNode> },
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: JsonOptions,
}

/// A string or number cell.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Options in document order. Null destinations are dropped.
#[derive(Debug, Default)]
struct JsonOptions(Vec<(String, String)>);

impl<'de> Deserialize<'de> for JsonOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = JsonOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an options object, a JSON string holding one, or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(JsonOptions::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(JsonOptions::default())
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value.trim().is_empty() {
                    return Ok(JsonOptions::default());
                }
                serde_json::from_str(value).map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((label, destination)) = map.next_entry::<String, Option<Scalar>>()? {
                    if let Some(destination) = destination {
                        entries.push((label, destination.to_string()));
                    }
                }
                Ok(JsonOptions(entries))
            }
        }

        deserializer.deserialize_any(OptionsVisitor)
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Build an [`ImportBatch`] from an extraction service payload.
///
/// Accepts a bare array of nodes or an object with a `nodes` array. Rows are
/// numbered from 1 in array order and go through the same validation as CSV
/// rows.
///
/// # Errors
///
/// Returns `ImportError::Json` when the payload does not parse, plus every
/// error [`crate::build_batch`] can return.
pub fn parse_json_batch(topic: &str, json: &str) -> Result<ImportBatch, ImportError> {
    let nodes = match serde_json::from_str::<Payload>(strip_fence(json))? {
        Payload::Nodes(nodes) | Payload::Wrapped { nodes } => nodes,
    };
    let rows = nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| RawRow {
            row: index + 1,
            id: node.id.map(|id| id.to_string()).unwrap_or_default(),
            question: node.question.unwrap_or_default(),
            pairs: node.options.0,
        })
        .collect();
    assemble(topic, rows)
}
