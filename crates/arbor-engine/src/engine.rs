//! Store-backed traversal operations.

use arbor_core::entities::{FlowNode, TopicFlow};
use arbor_core::ids::UserIdentifier;
use arbor_core::session::{Effect, Event, SessionState, transition};
use arbor_db::repos::usage::NewUsage;
use arbor_db::service::ArborService;

use crate::view::{NodeView, Step};

/// Traversal operations for one user.
///
/// The engine holds no session state of its own: every operation takes the
/// caller's [`SessionState`] and returns the next one inside a [`Step`].
/// Flows are re-read from the store on every call.
pub struct FlowEngine<'a> {
    service: &'a ArborService,
    user: UserIdentifier,
}

impl<'a> FlowEngine<'a> {
    #[must_use]
    pub const fn new(service: &'a ArborService, user: UserIdentifier) -> Self {
        Self { service, user }
    }

    #[must_use]
    pub const fn user(&self) -> &UserIdentifier {
        &self.user
    }

    /// Enter `topic` at its start node.
    ///
    /// An unknown or empty topic leaves the user with no topic selected.
    pub async fn select_topic(&self, topic: &str) -> Step {
        let flow = match self.service.load_flow(topic).await {
            Ok(flow) => flow,
            Err(error) => {
                tracing::warn!(%error, topic, "failed to load topic");
                return Step::degraded(
                    SessionState::NoTopicSelected,
                    format!("topic '{topic}' is unavailable right now"),
                );
            }
        };
        let step = self
            .apply(&SessionState::NoTopicSelected, &flow, &Event::SelectTopic(topic.to_string()))
            .await;
        if step.state == SessionState::NoTopicSelected {
            return Step {
                notice: Some(format!("topic '{topic}' has no nodes")),
                ..step
            };
        }
        step
    }

    /// Follow the option labelled `label` from the current node.
    pub async fn choose(&self, state: &SessionState, label: &str) -> Step {
        self.step_within_topic(state, &Event::Choose(label.to_string()))
            .await
    }

    /// Go back to the start node of the current topic, clearing any error.
    pub async fn reset(&self, state: &SessionState) -> Step {
        self.step_within_topic(state, &Event::Reset).await
    }

    /// Nodes whose question or topic contains `query`, case-insensitively.
    ///
    /// Every non-blank query is recorded in the usage log.
    pub async fn search(&self, query: &str, limit: u32) -> Vec<FlowNode> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.service
            .record_usage(&NewUsage::search(self.user.as_str(), query))
            .await;
        match self.service.search_nodes(query, limit).await {
            Ok(nodes) => nodes,
            Err(error) => {
                tracing::warn!(%error, query, "node search failed");
                Vec::new()
            }
        }
    }

    async fn step_within_topic(&self, state: &SessionState, event: &Event) -> Step {
        let Some(topic) = state.current_topic() else {
            return Step {
                state: state.clone(),
                view: None,
                notice: None,
            };
        };
        match self.service.load_flow(topic).await {
            Ok(flow) => self.apply(state, &flow, event).await,
            Err(error) => {
                tracing::warn!(%error, topic, "failed to load topic");
                Step::degraded(
                    state.clone(),
                    format!("topic '{topic}' is unavailable right now"),
                )
            }
        }
    }

    async fn apply(&self, state: &SessionState, flow: &TopicFlow, event: &Event) -> Step {
        let next = transition(state, flow, event);
        if let Some(effect) = &next.effect {
            self.perform(effect).await;
        }
        if let SessionState::Error { message, .. } = &next.state {
            tracing::debug!(topic = %flow.topic, %message, "traversal entered error state");
        }
        Step {
            view: NodeView::render(&next.state, flow),
            state: next.state,
            notice: None,
        }
    }

    async fn perform(&self, effect: &Effect) {
        match effect {
            Effect::RecordStep {
                topic,
                question,
                label,
                reached_terminal,
            } => {
                let usage = NewUsage::flow_step(
                    self.user.as_str(),
                    topic,
                    question,
                    label,
                    *reached_terminal,
                );
                self.service.record_usage(&usage).await;
            }
        }
    }
}
