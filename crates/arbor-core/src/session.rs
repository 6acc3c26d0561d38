//! Traversal state machine.
//!
//! `SessionState` is a value threaded through every traversal operation, and
//! `transition` is a pure function over it:
//!
//! ```text
//! NoTopicSelected --select--> AtNode(topic, start)
//! AtNode --choose(label)--> AtNode(topic, dest)          destination exists
//!                       --> Error(topic, node, message)  destination missing
//! AtNode | Error --reset--> AtNode(topic, start)
//! ```
//!
//! Side effects are returned as data (`Effect`) and performed by the caller.
//! A transition into a missing node never produces an effect.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::TopicFlow;
use crate::ids::NodeId;

/// Where one user currently is inside the guides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    NoTopicSelected,
    AtNode {
        topic: String,
        node_id: NodeId,
    },
    /// A choice pointed at a missing node. `node_id` is still the node the
    /// user was looking at, so it stays displayable.
    Error {
        topic: String,
        node_id: NodeId,
        message: String,
    },
}

impl SessionState {
    #[must_use]
    pub fn current_topic(&self) -> Option<&str> {
        match self {
            Self::NoTopicSelected => None,
            Self::AtNode { topic, .. } | Self::Error { topic, .. } => Some(topic),
        }
    }

    #[must_use]
    pub const fn current_node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NoTopicSelected => None,
            Self::AtNode { node_id, .. } | Self::Error { node_id, .. } => Some(node_id),
        }
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// State at the start node of `flow`, or `NoTopicSelected` if it is empty.
    #[must_use]
    pub fn at_start(flow: &TopicFlow) -> Self {
        flow.start().map_or(Self::NoTopicSelected, |start| Self::AtNode {
            topic: flow.topic.clone(),
            node_id: start.id.clone(),
        })
    }
}

/// A user action against the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectTopic(String),
    Choose(String),
    Reset,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Log a completed step. `reached_terminal` is set when the destination
    /// has no options.
    RecordStep {
        topic: String,
        question: String,
        label: String,
        reached_terminal: bool,
    },
}

/// Result of applying an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
}

impl Transition {
    const fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Apply `event` to `state`.
///
/// `flow` must be the flow of the topic the event concerns: the selected
/// topic for `SelectTopic`, the state's current topic otherwise.
#[must_use]
pub fn transition(state: &SessionState, flow: &TopicFlow, event: &Event) -> Transition {
    match event {
        Event::SelectTopic(_) => Transition::to(SessionState::at_start(flow)),
        Event::Reset => match state {
            SessionState::NoTopicSelected => Transition::to(SessionState::NoTopicSelected),
            SessionState::AtNode { .. } | SessionState::Error { .. } => {
                Transition::to(SessionState::at_start(flow))
            }
        },
        Event::Choose(label) => choose(state, flow, label),
    }
}

fn choose(state: &SessionState, flow: &TopicFlow, label: &str) -> Transition {
    let SessionState::AtNode { topic, node_id } = state else {
        return Transition::to(state.clone());
    };

    let Some(current) = flow.node(node_id) else {
        return Transition::to(SessionState::Error {
            topic: topic.clone(),
            node_id: node_id.clone(),
            message: format!("node '{node_id}' not found"),
        });
    };

    let Some(destination) = current.options.get(label) else {
        return Transition::to(state.clone());
    };

    match flow.node(destination) {
        Some(next) => Transition {
            state: SessionState::AtNode {
                topic: topic.clone(),
                node_id: next.id.clone(),
            },
            effect: Some(Effect::RecordStep {
                topic: topic.clone(),
                question: current.question.clone(),
                label: label.to_string(),
                reached_terminal: next.is_terminal(),
            }),
        },
        None => Transition::to(SessionState::Error {
            topic: topic.clone(),
            node_id: node_id.clone(),
            message: format!("destination '{destination}' not found"),
        }),
    }
}
