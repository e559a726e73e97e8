//! Notification repository for database operations.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::Result;
use crate::database::models::NotificationDbModel;

/// Notification repository trait for notification data access.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new notification; returns the assigned id.
    async fn save(&self, notification: &NotificationDbModel) -> Result<i64>;

    /// All notifications that have not been emailed yet, oldest first.
    async fn find_unsent(&self) -> Result<Vec<NotificationDbModel>>;

    /// Mark exactly the given ids as sent, in one atomic statement.
    ///
    /// Idempotent: email_sent is monotonic false -> true, so re-marking an
    /// already-sent id has no observable effect.
    async fn mark_sent(&self, ids: &[i64]) -> Result<()>;

    /// Find a notification by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationDbModel>>;

    /// Recent notifications, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<NotificationDbModel>>;
}

/// SQLx implementation of NotificationRepository.
pub struct SqlxNotificationRepository {
    pool: SqlitePool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a notification within an existing transaction.
    ///
    /// Used by the consumer to make persistence atomic with topic
    /// acknowledgment. Does NOT commit.
    pub async fn insert_tx(
        tx: &mut SqliteConnection,
        notification: &NotificationDbModel,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification (
                user_id, asteroid_name, close_approach_date, miss_distance_km,
                estimated_diameter_avg_m, email_sent, source_asteroid_id, received_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.user_id)
        .bind(&notification.asteroid_name)
        .bind(notification.close_approach_date)
        .bind(&notification.miss_distance_km)
        .bind(notification.estimated_diameter_avg_m)
        .bind(notification.email_sent)
        .bind(&notification.source_asteroid_id)
        .bind(notification.received_at)
        .execute(tx)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn save(&self, notification: &NotificationDbModel) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification (
                user_id, asteroid_name, close_approach_date, miss_distance_km,
                estimated_diameter_avg_m, email_sent, source_asteroid_id, received_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.user_id)
        .bind(&notification.asteroid_name)
        .bind(notification.close_approach_date)
        .bind(&notification.miss_distance_km)
        .bind(notification.estimated_diameter_avg_m)
        .bind(notification.email_sent)
        .bind(&notification.source_asteroid_id)
        .bind(notification.received_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_unsent(&self) -> Result<Vec<NotificationDbModel>> {
        let notifications = sqlx::query_as::<_, NotificationDbModel>(
            "SELECT * FROM notification WHERE email_sent = FALSE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn mark_sent(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        // One UPDATE over exactly the snapshot's ids. A blanket
        // "mark all currently unsent" would also catch rows created after
        // the snapshot was taken.
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "UPDATE notification SET email_sent = TRUE WHERE id IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids.iter().copied() {
            query = query.bind(id);
        }
        query.execute(&self.pool).await?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationDbModel>> {
        let notification =
            sqlx::query_as::<_, NotificationDbModel>("SELECT * FROM notification WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(notification)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<NotificationDbModel>> {
        let notifications = sqlx::query_as::<_, NotificationDbModel>(
            "SELECT * FROM notification ORDER BY received_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }
}
