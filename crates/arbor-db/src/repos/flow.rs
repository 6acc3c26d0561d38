//! Flow store repository.
//!
//! Nodes are read per topic in import order and written per topic as a whole:
//! a replace deletes the topic's node set and inserts the new one inside a
//! single transaction, so readers never see a partial topic.

use chrono::Utc;
use serde::Serialize;

use arbor_core::entities::{FlowNode, NodeOptions, TopicFlow};
use arbor_core::ids::NodeId;

use crate::error::DatabaseError;
use crate::helpers::format_datetime;
use crate::retry::retry_transient;
use crate::service::ArborService;

const SELECT_COLS: &str = "topic, id, question, options";

/// Outcome of a topic replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    pub deleted: u64,
    pub inserted: u64,
}

fn row_to_node(row: &libsql::Row) -> Result<FlowNode, DatabaseError> {
    let topic: String = row.get(0)?;
    let id: String = row.get(1)?;
    let options_json: String = row.get(3)?;
    let options: NodeOptions = serde_json::from_str(&options_json).map_err(|e| {
        DatabaseError::Query(format!(
            "invalid options JSON for node '{id}' in topic '{topic}': {e}"
        ))
    })?;
    Ok(FlowNode {
        id: NodeId::parse(&id)?,
        question: row.get(2)?,
        topic,
        options,
    })
}

async fn collect_nodes(mut rows: libsql::Rows) -> Result<Vec<FlowNode>, DatabaseError> {
    let mut nodes = Vec::new();
    while let Some(row) = rows.next().await? {
        nodes.push(row_to_node(&row)?);
    }
    Ok(nodes)
}

async fn write_topic(
    conn: &libsql::Connection,
    topic: &str,
    nodes: &[FlowNode],
) -> Result<ReplaceReport, DatabaseError> {
    let deleted = conn
        .execute("DELETE FROM flow_nodes WHERE topic = ?1", [topic])
        .await?;

    let imported_at = format_datetime(&Utc::now());
    let mut inserted = 0;
    for (position, node) in (0_i64..).zip(nodes) {
        let options = serde_json::to_string(&node.options)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        conn.execute(
            "INSERT INTO flow_nodes (topic, id, position, question, options, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                topic,
                node.id.as_str(),
                position,
                node.question.as_str(),
                options,
                imported_at.as_str()
            ],
        )
        .await?;
        inserted += 1;
    }

    Ok(ReplaceReport { deleted, inserted })
}

impl ArborService {
    /// Distinct topic names, sorted ascending. Empty when nothing is imported.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_topics(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT DISTINCT topic FROM flow_nodes ORDER BY topic", ())
            .await?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next().await? {
            topics.push(row.get::<String>(0)?);
        }
        Ok(topics)
    }

    /// All nodes of `topic` in import order. Empty for an unknown topic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored row is corrupt.
    pub async fn get_nodes(&self, topic: &str) -> Result<Vec<FlowNode>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM flow_nodes WHERE topic = ?1 ORDER BY position"
                ),
                [topic],
            )
            .await?;
        let nodes = collect_nodes(rows).await?;
        tracing::debug!(topic, count = nodes.len(), "loaded flow nodes");
        Ok(nodes)
    }

    /// The node set of `topic` as a `TopicFlow`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn load_flow(&self, topic: &str) -> Result<TopicFlow, DatabaseError> {
        Ok(TopicFlow::new(topic, self.get_nodes(topic).await?))
    }

    /// Replace every node of `topic` with `nodes`, atomically.
    ///
    /// Runs in one transaction: if any insert fails the transaction is rolled
    /// back and the previous node set stays in place. Lock contention is
    /// retried per the service's `RetryConfig`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if a node belongs to another
    /// topic, or `DatabaseError` if the write fails.
    pub async fn replace_topic(
        &self,
        topic: &str,
        nodes: &[FlowNode],
    ) -> Result<ReplaceReport, DatabaseError> {
        if let Some(stray) = nodes.iter().find(|node| node.topic != topic) {
            return Err(DatabaseError::InvalidState(format!(
                "node '{}' belongs to topic '{}', not '{topic}'",
                stray.id, stray.topic
            )));
        }

        let report = retry_transient(self.retry(), "replace_topic", move || {
            self.replace_topic_once(topic, nodes)
        })
        .await?;
        tracing::info!(
            topic,
            deleted = report.deleted,
            inserted = report.inserted,
            "replaced topic"
        );
        Ok(report)
    }

    async fn replace_topic_once(
        &self,
        topic: &str,
        nodes: &[FlowNode],
    ) -> Result<ReplaceReport, DatabaseError> {
        let tx = self.db().conn().transaction().await?;
        match write_topic(&tx, topic, nodes).await {
            Ok(report) => {
                tx.commit().await?;
                Ok(report)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!(%rollback_error, topic, "rollback after failed replace failed");
                }
                Err(error)
            }
        }
    }

    /// Remove every node of `topic`. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_topic(&self, topic: &str) -> Result<u64, DatabaseError> {
        let deleted = self
            .db()
            .conn()
            .execute("DELETE FROM flow_nodes WHERE topic = ?1", [topic])
            .await?;
        tracing::info!(topic, deleted, "deleted topic");
        Ok(deleted)
    }

    /// Case-insensitive substring search over question text and topic name.
    ///
    /// Results are ordered by topic, then import order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_nodes(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FlowNode>, DatabaseError> {
        let needle = query.trim().to_lowercase();
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM flow_nodes ORDER BY topic, position"),
                (),
            )
            .await?;
        let mut hits = collect_nodes(rows).await?;
        hits.retain(|node| {
            node.question.to_lowercase().contains(&needle)
                || node.topic.to_lowercase().contains(&needle)
        });
        hits.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn test_service() -> ArborService {
        ArborService::new_local(":memory:").await.unwrap()
    }

    fn id(raw: &str) -> NodeId {
        NodeId::parse(raw).unwrap()
    }

    fn node(topic: &str, raw_id: &str, question: &str, options: &[(&str, &str)]) -> FlowNode {
        FlowNode {
            topic: topic.to_string(),
            id: id(raw_id),
            question: question.to_string(),
            options: options.iter().map(|(l, d)| (*l, id(d))).collect(),
        }
    }

    fn engine_nodes() -> Vec<FlowNode> {
        vec![
            node("Engine", "1", "Engine won't start?", &[("Yes", "2"), ("No", "3")]),
            node("Engine", "2", "Check battery", &[]),
            node("Engine", "3", "Engine runs rough?", &[("Yes", "4"), ("No", "2")]),
        ]
    }

    #[tokio::test]
    async fn empty_store_has_no_topics() {
        let svc = test_service().await;
        assert!(svc.list_topics().await.unwrap().is_empty());
        assert!(svc.get_nodes("Engine").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_then_read_back_preserves_order_and_options() {
        let svc = test_service().await;
        let report = svc.replace_topic("Engine", &engine_nodes()).await.unwrap();
        assert_eq!(report, ReplaceReport { deleted: 0, inserted: 3 });

        let nodes = svc.get_nodes("Engine").await.unwrap();
        assert_eq!(nodes, engine_nodes());
        assert_eq!(
            nodes[0].options.labels().collect::<Vec<_>>(),
            vec!["Yes", "No"]
        );
    }

    #[tokio::test]
    async fn import_order_is_kept_even_when_ids_are_unsorted() {
        let svc = test_service().await;
        let nodes = vec![
            node("Lights", "10", "start here", &[("Go", "2")]),
            node("Lights", "2", "second", &[]),
        ];
        svc.replace_topic("Lights", &nodes).await.unwrap();
        let flow = svc.load_flow("Lights").await.unwrap();
        assert_eq!(flow.start().map(|n| n.id.as_str()), Some("10"));
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_node_set() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();

        let replacement = vec![node("Engine", "a", "New start", &[])];
        let report = svc.replace_topic("Engine", &replacement).await.unwrap();
        assert_eq!(report, ReplaceReport { deleted: 3, inserted: 1 });
        assert_eq!(svc.get_nodes("Engine").await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_nodes() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();

        // Duplicate id violates the primary key on the second insert.
        let broken = vec![
            node("Engine", "x", "first", &[]),
            node("Engine", "x", "second", &[]),
        ];
        let result = svc.replace_topic("Engine", &broken).await;
        assert!(result.is_err());
        assert_eq!(svc.get_nodes("Engine").await.unwrap(), engine_nodes());
    }

    #[tokio::test]
    async fn replace_rejects_nodes_of_another_topic() {
        let svc = test_service().await;
        let result = svc
            .replace_topic("Brakes", &[node("Engine", "1", "q", &[])])
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
        assert!(svc.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn topics_are_distinct_and_sorted() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();
        svc.replace_topic("Brakes", &[node("Brakes", "1", "Squeal?", &[])])
            .await
            .unwrap();
        assert_eq!(svc.list_topics().await.unwrap(), vec!["Brakes", "Engine"]);
    }

    #[tokio::test]
    async fn deleting_last_nodes_removes_topic() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();
        assert_eq!(svc.delete_topic("Engine").await.unwrap(), 3);
        assert!(svc.list_topics().await.unwrap().is_empty());
        assert_eq!(svc.delete_topic("Engine").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn replace_with_empty_set_removes_topic() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();
        svc.replace_topic("Engine", &[]).await.unwrap();
        assert!(svc.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_limited() {
        let svc = test_service().await;
        svc.replace_topic("Engine", &engine_nodes()).await.unwrap();

        let hits = svc.search_nodes("ENGINE", 10).await.unwrap();
        assert_eq!(hits.len(), 3, "topic name matches every node");

        let hits = svc.search_nodes("battery", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id("2"));

        assert_eq!(svc.search_nodes("engine", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_options_surface_as_query_error() {
        let svc = test_service().await;
        svc.db()
            .conn()
            .execute(
                "INSERT INTO flow_nodes (topic, id, position, question, options) VALUES ('Engine', '1', 0, 'q', 'not json')",
                (),
            )
            .await
            .unwrap();
        let err = svc.get_nodes("Engine").await.unwrap_err();
        assert!(err.to_string().contains("invalid options JSON for node '1'"));
    }

    #[tokio::test]
    async fn reads_fail_when_store_is_unavailable() {
        let svc = test_service().await;
        svc.db()
            .conn()
            .execute("DROP TABLE flow_nodes", ())
            .await
            .unwrap();
        assert!(svc.list_topics().await.is_err());
        assert!(svc.get_nodes("Engine").await.is_err());
    }
}
