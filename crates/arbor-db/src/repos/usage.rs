//! Usage log repository.
//!
//! Append-only entries recording each option click and search. Writing is
//! fire-and-forget from the caller's point of view: [`ArborService::record_usage`]
//! never fails, it logs and moves on.

use chrono::Utc;

use arbor_core::entities::UsageLogEntry;
use arbor_core::enums::UsageCategory;
use arbor_core::ids::PREFIX_USAGE;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_bool, get_opt_string, parse_datetime, parse_enum};
use crate::service::ArborService;

const SELECT_COLS: &str =
    "id, user_identifier, category, subject, step_label, reached_terminal, created_at";

/// A usage event before it is stored (no id or timestamp yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsage {
    pub user_identifier: String,
    pub category: UsageCategory,
    pub subject: String,
    pub step_label: Option<String>,
    pub reached_terminal: Option<bool>,
}

impl NewUsage {
    /// An option click inside a guide.
    #[must_use]
    pub fn flow_step(
        user_identifier: &str,
        topic: &str,
        question: &str,
        label: &str,
        reached_terminal: bool,
    ) -> Self {
        Self {
            user_identifier: user_identifier.to_string(),
            category: UsageCategory::Flow,
            subject: format!("[{topic}] {question}"),
            step_label: Some(label.to_string()),
            reached_terminal: Some(reached_terminal),
        }
    }

    /// A node search.
    #[must_use]
    pub fn search(user_identifier: &str, query: &str) -> Self {
        Self {
            user_identifier: user_identifier.to_string(),
            category: UsageCategory::Search,
            subject: query.to_string(),
            step_label: None,
            reached_terminal: None,
        }
    }
}

fn row_to_entry(row: &libsql::Row) -> Result<UsageLogEntry, DatabaseError> {
    Ok(UsageLogEntry {
        id: row.get(0)?,
        user_identifier: row.get(1)?,
        category: parse_enum(&row.get::<String>(2)?)?,
        subject: row.get(3)?,
        step_label: get_opt_string(row, 4)?,
        reached_terminal: get_opt_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl ArborService {
    /// Store a usage event and return the stored entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the id cannot be generated or the INSERT fails.
    pub async fn append_usage(&self, usage: &NewUsage) -> Result<UsageLogEntry, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USAGE).await?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO usage_log ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                libsql::params![
                    id.as_str(),
                    usage.user_identifier.as_str(),
                    usage.category.as_str(),
                    usage.subject.as_str(),
                    usage.step_label.as_deref(),
                    usage.reached_terminal.map(i64::from),
                    format_datetime(&now)
                ],
            )
            .await?;

        Ok(UsageLogEntry {
            id,
            user_identifier: usage.user_identifier.clone(),
            category: usage.category,
            subject: usage.subject.clone(),
            step_label: usage.step_label.clone(),
            reached_terminal: usage.reached_terminal,
            created_at: now,
        })
    }

    /// Store a usage event, suppressing any failure.
    ///
    /// The caller's operation must not depend on the log, so errors are
    /// reported through `tracing` only.
    pub async fn record_usage(&self, usage: &NewUsage) {
        if let Err(error) = self.append_usage(usage).await {
            tracing::warn!(
                %error,
                category = %usage.category,
                "failed to record usage entry; continuing"
            );
        }
    }

    /// Delete every usage entry. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn clear_usage(&self) -> Result<u64, DatabaseError> {
        let deleted = self
            .db()
            .conn()
            .execute("DELETE FROM usage_log", ())
            .await?;
        tracing::info!(deleted, "cleared usage log");
        Ok(deleted)
    }

    /// The newest `limit` usage entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_usage(&self, limit: u32) -> Result<Vec<UsageLogEntry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM usage_log ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                libsql::params![limit],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn test_service() -> ArborService {
        ArborService::new_local(":memory:").await.unwrap()
    }

    const USER: &str = "agent@example.com";

    #[test]
    fn flow_step_subject_names_topic_and_question() {
        let usage = NewUsage::flow_step(USER, "Engine", "Engine won't start?", "Yes", false);
        assert_eq!(usage.subject, "[Engine] Engine won't start?");
        assert_eq!(usage.step_label.as_deref(), Some("Yes"));
        assert_eq!(usage.reached_terminal, Some(false));
    }

    #[tokio::test]
    async fn append_and_list_roundtrip() {
        let svc = test_service().await;
        let stored = svc
            .append_usage(&NewUsage::flow_step(USER, "Engine", "Engine won't start?", "Yes", true))
            .await
            .unwrap();
        assert!(stored.id.starts_with("use-"));

        let listed = svc.list_usage(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, stored.id);
        assert_eq!(listed[0].category, UsageCategory::Flow);
        assert_eq!(listed[0].reached_terminal, Some(true));
        assert_eq!(
            listed[0].created_at.timestamp_micros(),
            stored.created_at.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn search_entries_have_no_step_fields() {
        let svc = test_service().await;
        svc.append_usage(&NewUsage::search(USER, "battery")).await.unwrap();

        let listed = svc.list_usage(10).await.unwrap();
        assert_eq!(listed[0].category, UsageCategory::Search);
        assert_eq!(listed[0].subject, "battery");
        assert_eq!(listed[0].step_label, None);
        assert_eq!(listed[0].reached_terminal, None);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let svc = test_service().await;
        for query in ["first", "second", "third"] {
            svc.append_usage(&NewUsage::search(USER, query)).await.unwrap();
        }

        let subjects: Vec<String> = svc
            .list_usage(2)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.subject)
            .collect();
        assert_eq!(subjects, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let svc = test_service().await;
        svc.append_usage(&NewUsage::search(USER, "a")).await.unwrap();
        svc.append_usage(&NewUsage::search(USER, "b")).await.unwrap();

        assert_eq!(svc.clear_usage().await.unwrap(), 2);
        assert!(svc.list_usage(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_usage_swallows_store_failure() {
        let svc = test_service().await;
        svc.db()
            .conn()
            .execute("DROP TABLE usage_log", ())
            .await
            .unwrap();

        assert!(svc.append_usage(&NewUsage::search(USER, "x")).await.is_err());
        // Must return normally.
        svc.record_usage(&NewUsage::search(USER, "x")).await;
    }
}
