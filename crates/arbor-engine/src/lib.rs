//! # arbor-engine
//!
//! Traversal of decision-tree guides on top of the flow store.
//!
//! [`FlowEngine`] applies the pure state machine from `arbor_core::session`
//! against the latest stored flow, performs the usage logging it asks for,
//! and turns the resulting state into a [`NodeView`] for the presentation
//! layer. None of its operations fail: store problems become an unchanged
//! state with a notice, an empty list, or a logged warning. [`topic_summaries`]
//! lists what can be selected and needs no user.

mod catalog;
mod engine;
mod view;

pub use catalog::{TopicSummary, topic_summaries};
pub use engine::FlowEngine;
pub use view::{NodeView, Step};
