//! Durable topic operations for collision events.
//!
//! The `alert_event_outbox` table plays the broker for the "asteroid-alert"
//! stream: producers append rows, the single consumer group fetches
//! undelivered rows in id order and marks them delivered once their effect is
//! persisted. An entry stays undelivered across failures, so redelivery is
//! at-least-once.

use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::Result;
use crate::alert::event::CollisionEvent;

/// Name of the collision event stream.
pub const ALERT_TOPIC: &str = "asteroid-alert";

/// An entry fetched from the topic.
#[derive(Debug, Clone)]
pub struct TopicEntry {
    pub id: i64,
    pub payload: String,
    pub created_at: i64,
    pub attempts: i64,
}

/// Topic operations.
pub struct AlertTopicOps;

impl AlertTopicOps {
    /// Publish one collision event onto the topic.
    pub async fn publish(pool: &SqlitePool, event: &CollisionEvent) -> Result<i64> {
        let payload = serde_json::to_string(event)?;

        let result = sqlx::query(
            r#"
            INSERT INTO alert_event_outbox (topic, payload, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(ALERT_TOPIC)
        .bind(payload)
        .bind(crate::database::time::now_ms())
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch undelivered entries, oldest first.
    pub async fn fetch_undelivered(pool: &SqlitePool, limit: i32) -> Result<Vec<TopicEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, payload, created_at, attempts
            FROM alert_event_outbox
            WHERE topic = ? AND delivered_at IS NULL
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(ALERT_TOPIC)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| TopicEntry {
                id: row.get("id"),
                payload: row.get("payload"),
                created_at: row.get("created_at"),
                attempts: row.get("attempts"),
            })
            .collect();

        Ok(entries)
    }

    /// Mark an entry delivered within an existing transaction.
    ///
    /// Runs inside the same transaction that persists the entry's effect, so
    /// acknowledgment and persistence are atomic. Does NOT commit; the caller
    /// owns the transaction.
    pub async fn mark_delivered(tx: &mut SqliteConnection, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE alert_event_outbox SET delivered_at = ?, attempts = attempts + 1, last_error = NULL WHERE id = ?",
        )
        .bind(crate::database::time::now_ms())
        .bind(id)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// Record a delivery failure; the entry stays undelivered.
    pub async fn record_failure(pool: &SqlitePool, id: i64, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE alert_event_outbox SET attempts = attempts + 1, last_error = ? WHERE id = ?",
        )
        .bind(error)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Park a poison entry: mark it delivered but keep its last error.
    pub async fn park(pool: &SqlitePool, id: i64, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE alert_event_outbox SET delivered_at = ?, attempts = attempts + 1, last_error = ? WHERE id = ?",
        )
        .bind(crate::database::time::now_ms())
        .bind(error)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::database::run_migrations(&pool).await.unwrap();
        pool
    }

    fn test_event() -> CollisionEvent {
        CollisionEvent {
            asteroid_name: "Apophis".to_string(),
            close_approach_date: "2029-04-13".to_string(),
            miss_distance_kilometers: "31000".to_string(),
            estimated_diameter_avg_meters: 335.0,
        }
    }

    #[tokio::test]
    async fn test_publish_then_fetch() {
        let pool = setup_test_db().await;

        AlertTopicOps::publish(&pool, &test_event()).await.unwrap();

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].payload.contains("asteroidName"));
        assert_eq!(entries[0].attempts, 0);
    }

    #[tokio::test]
    async fn test_mark_delivered_removes_from_fetch() {
        let pool = setup_test_db().await;

        let id = AlertTopicOps::publish(&pool, &test_event()).await.unwrap();

        let mut tx = crate::database::begin_immediate(&pool).await.unwrap();
        AlertTopicOps::mark_delivered(&mut tx, id).await.unwrap();
        tx.commit().await.unwrap();

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_keeps_entry_undelivered() {
        let pool = setup_test_db().await;

        let id = AlertTopicOps::publish(&pool, &test_event()).await.unwrap();
        AlertTopicOps::record_failure(&pool, id, "insert failed")
            .await
            .unwrap();

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_park_removes_entry_but_keeps_error() {
        let pool = setup_test_db().await;

        let id = AlertTopicOps::publish(&pool, &test_event()).await.unwrap();
        AlertTopicOps::park(&pool, id, "bad payload").await.unwrap();

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert!(entries.is_empty());

        let (last_error,): (Option<String>,) =
            sqlx::query_as("SELECT last_error FROM alert_event_outbox WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(last_error.as_deref(), Some("bad payload"));
    }
}
