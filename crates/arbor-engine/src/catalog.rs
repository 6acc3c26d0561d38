//! Topic listing for pickers and `arb topics`.

use serde::Serialize;

use arbor_db::service::ArborService;

/// A selectable topic and how many nodes it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub nodes: usize,
}

/// Selectable topics in name order. Empty when the store cannot be read.
pub async fn topic_summaries(service: &ArborService) -> Vec<TopicSummary> {
    let topics = match service.list_topics().await {
        Ok(topics) => topics,
        Err(error) => {
            tracing::warn!(%error, "failed to list topics");
            return Vec::new();
        }
    };
    let mut summaries = Vec::with_capacity(topics.len());
    for topic in topics {
        match service.get_nodes(&topic).await {
            Ok(nodes) => summaries.push(TopicSummary {
                nodes: nodes.len(),
                topic,
            }),
            Err(error) => {
                tracing::warn!(%error, topic, "failed to count topic nodes");
                return Vec::new();
            }
        }
    }
    summaries
}
