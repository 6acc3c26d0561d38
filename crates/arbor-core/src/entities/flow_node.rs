use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::NodeId;

/// Ordered mapping from button label to destination node.
///
/// Labels are unique. Serialized as a JSON object whose key order is the
/// insertion order, which is also the order buttons are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOptions {
    entries: Vec<(String, NodeId)>,
}

impl NodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option. An existing label keeps its position and gets the
    /// new destination; the previous destination is returned.
    pub fn insert(&mut self, label: impl Into<String>, destination: NodeId) -> Option<NodeId> {
        let label = label.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            return Some(std::mem::replace(existing, destination));
        }
        self.entries.push((label, destination));
        None
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&NodeId> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, destination)| destination)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.entries.iter().map(|(l, d)| (l.as_str(), d))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, NodeId)> for NodeOptions {
    fn from_iter<I: IntoIterator<Item = (L, NodeId)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (label, destination) in iter {
            options.insert(label, destination);
        }
        options
    }
}

impl Serialize for NodeOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, destination) in &self.entries {
            map.serialize_entry(label, destination)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NodeOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = NodeOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of button label to destination node id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut options = NodeOptions::new();
                while let Some((label, destination)) = map.next_entry::<String, NodeId>()? {
                    options.insert(label, destination);
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// One question or instruction point in a guide.
///
/// A node with no options is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlowNode {
    pub topic: String,
    pub id: NodeId,
    pub question: String,
    #[schemars(with = "BTreeMap<String, String>")]
    pub options: NodeOptions,
}

impl FlowNode {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }
}

/// An option whose destination is not a node of the same topic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DanglingDestination {
    pub node: NodeId,
    pub label: String,
    pub destination: NodeId,
}

/// The ordered node set of one topic, as held by the store.
///
/// The first node is the topic's start node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFlow {
    pub topic: String,
    pub nodes: Vec<FlowNode>,
}

impl TopicFlow {
    #[must_use]
    pub fn new(topic: impl Into<String>, nodes: Vec<FlowNode>) -> Self {
        Self {
            topic: topic.into(),
            nodes,
        }
    }

    #[must_use]
    pub fn start(&self) -> Option<&FlowNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every option in the flow that points outside of it, in node order.
    #[must_use]
    pub fn dangling_destinations(&self) -> Vec<DanglingDestination> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.options
                    .iter()
                    .filter(|(_, destination)| !self.contains(destination))
                    .map(|(label, destination)| DanglingDestination {
                        node: node.id.clone(),
                        label: label.to_string(),
                        destination: destination.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::parse(raw).unwrap()
    }

    fn node(raw_id: &str, options: &[(&str, &str)]) -> FlowNode {
        FlowNode {
            topic: "Engine".to_string(),
            id: id(raw_id),
            question: format!("question {raw_id}"),
            options: options.iter().map(|(l, d)| (*l, id(d))).collect(),
        }
    }

    #[test]
    fn options_keep_insertion_order_in_json() {
        let options: NodeOptions = [("Yes", id("2")), ("No", id("3")), ("Maybe", id("1"))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"Yes":"2","No":"3","Maybe":"1"}"#);

        let back: NodeOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.labels().collect::<Vec<_>>(), vec!["Yes", "No", "Maybe"]);
    }

    #[test]
    fn insert_existing_label_replaces_in_place() {
        let mut options = NodeOptions::new();
        assert_eq!(options.insert("Yes", id("2")), None);
        options.insert("No", id("3"));
        assert_eq!(options.insert("Yes", id("9")), Some(id("2")));

        assert_eq!(options.len(), 2);
        assert_eq!(options.get("Yes"), Some(&id("9")));
        assert_eq!(options.labels().collect::<Vec<_>>(), vec!["Yes", "No"]);
    }

    #[test]
    fn empty_options_mean_terminal() {
        assert!(node("2", &[]).is_terminal());
        assert!(!node("1", &[("Yes", "2")]).is_terminal());
    }

    #[test]
    fn topic_flow_start_is_first_node() {
        let flow = TopicFlow::new("Engine", vec![node("3", &[]), node("1", &[])]);
        assert_eq!(flow.start().map(|n| n.id.as_str()), Some("3"));
        assert!(TopicFlow::new("Empty", Vec::new()).start().is_none());
    }

    #[test]
    fn dangling_destinations_are_reported_in_order() {
        let flow = TopicFlow::new(
            "Engine",
            vec![
                node("1", &[("Yes", "2"), ("No", "3")]),
                node("2", &[]),
                node("3", &[("Yes", "4"), ("No", "2")]),
            ],
        );
        assert_eq!(
            flow.dangling_destinations(),
            vec![DanglingDestination {
                node: id("3"),
                label: "Yes".to_string(),
                destination: id("4"),
            }]
        );
    }
}
