use crate::db::models::open_models::{format_timestamp, NewOpenEvent, OpenEvent, OpenEventDb, OpenFilter};
use crate::error::Error;
use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, subject_id, ts, remote_addr, forwarded_for, resolved_ip, user_agent, referer
    FROM opens
"#;

/// Append-only log of pixel fetches
#[derive(Clone)]
pub struct OpensRepository {
    pool: Arc<SqlitePool>,
}

impl OpensRepository {
    /// Create a new opens repository
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Store one event and return it with its row id
    pub async fn append(&self, event: &NewOpenEvent) -> Result<OpenEvent> {
        let result = sqlx::query(
            r#"
            INSERT INTO opens (
                subject_id, ts, remote_addr, forwarded_for, resolved_ip, user_agent, referer
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.subject_id.as_str())
        .bind(format_timestamp(&event.timestamp))
        .bind(event.remote_address.as_str())
        .bind(event.forwarded_for.as_deref())
        .bind(event.resolved_ip.as_deref())
        .bind(event.user_agent.as_str())
        .bind(event.referrer.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to append open event: {}", e)))?;

        let id = result.last_insert_rowid();
        debug!("Stored open event {} for subject {:?}", id, event.subject_id);

        Ok(OpenEvent {
            id,
            subject_id: event.subject_id.clone(),
            timestamp: event.timestamp,
            remote_address: event.remote_address.clone(),
            forwarded_for: event.forwarded_for.clone(),
            resolved_ip: event.resolved_ip.clone(),
            user_agent: event.user_agent.clone(),
            referrer: event.referrer.clone(),
        })
    }

    /// Events matching the filter, newest first
    pub async fn list(&self, filter: &OpenFilter) -> Result<Vec<OpenEvent>> {
        let mut sql = String::from(SELECT_COLUMNS);

        if filter.subject_id.is_some() {
            sql.push_str(" WHERE subject_id = ?");
        }

        // Row id breaks ties between fires stamped in the same microsecond
        sql.push_str(" ORDER BY ts DESC, id DESC");

        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut db_query = sqlx::query_as::<_, OpenEventDb>(&sql);

        if let Some(subject_id) = &filter.subject_id {
            db_query = db_query.bind(subject_id.as_str());
        }

        if let Some(limit) = filter.limit {
            db_query = db_query.bind(limit);
        }

        let rows = db_query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list open events: {}", e)))?;

        let events = rows
            .into_iter()
            .map(OpenEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Number of stored events, optionally for one subject
    pub async fn count(&self, subject_id: Option<&str>) -> Result<i64> {
        let count = match subject_id {
            Some(subject_id) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM opens WHERE subject_id = ?")
                    .bind(subject_id)
                    .fetch_one(&*self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM opens")
                    .fetch_one(&*self.pool)
                    .await
            }
        }
        .map_err(|e| Error::Database(format!("Failed to count open events: {}", e)))?;

        Ok(count)
    }

    /// Delete every event for `subject_id`, or every event at all when it is `None`.
    ///
    /// Returns the number of rows removed. There is no way back.
    pub async fn delete(&self, subject_id: Option<&str>) -> Result<u64> {
        let result = match subject_id {
            Some(subject_id) => {
                sqlx::query("DELETE FROM opens WHERE subject_id = ?")
                    .bind(subject_id)
                    .execute(&*self.pool)
                    .await
            }
            None => sqlx::query("DELETE FROM opens").execute(&*self.pool).await,
        }
        .map_err(|e| Error::Database(format!("Failed to delete open events: {}", e)))?;

        Ok(result.rows_affected())
    }
}
