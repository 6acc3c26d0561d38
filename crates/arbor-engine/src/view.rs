//! Rendering contract handed to the presentation layer.

use serde::Serialize;

use arbor_core::entities::TopicFlow;
use arbor_core::session::SessionState;

/// What to show for the current node.
///
/// `options` are the node's own labels in display order, so every rendered
/// button is a valid `choose` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub topic: String,
    pub node_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeView {
    /// View of `state` within `flow`, or `None` when there is no current
    /// node or it has disappeared from the store.
    #[must_use]
    pub fn render(state: &SessionState, flow: &TopicFlow) -> Option<Self> {
        let node = flow.node(state.current_node_id()?)?;
        Some(Self {
            topic: flow.topic.clone(),
            node_id: node.id.to_string(),
            question: node.question.clone(),
            options: node.options.labels().map(str::to_string).collect(),
            terminal: node.is_terminal(),
            error: state.last_error().map(str::to_string),
        })
    }
}

/// Outcome of one engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub state: SessionState,
    pub view: Option<NodeView>,
    /// Message for the user when the store could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Step {
    pub(crate) fn degraded(state: SessionState, notice: String) -> Self {
        Self {
            state,
            view: None,
            notice: Some(notice),
        }
    }
}
