//! User repository for database operations.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::UserDbModel;

/// User repository trait for user data access operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user in the database.
    async fn create(&self, user: &UserDbModel) -> Result<()>;

    /// Find a user by the external identity subject.
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<UserDbModel>>;

    /// Refresh a user's email/full name and stamp last_login_at.
    async fn sync_login(
        &self,
        google_id: &str,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<()>;

    /// Update the notification preference.
    async fn set_notification_enabled(&self, google_id: &str, enabled: bool) -> Result<()>;

    /// Emails of every user with notifications enabled.
    async fn find_recipients_with_notifications_enabled(&self) -> Result<Vec<String>>;
}

/// SQLx implementation of UserRepository.
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &UserDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, google_id, email, full_name, notification_enabled,
                created_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.google_id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.notification_enabled)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE google_id = ?")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn sync_login(
        &self,
        google_id: &str,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET email = ?, full_name = ?, last_login_at = ? WHERE google_id = ?",
        )
        .bind(email)
        .bind(full_name)
        .bind(crate::database::time::now_ms())
        .bind(google_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_notification_enabled(&self, google_id: &str, enabled: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET notification_enabled = ? WHERE google_id = ?")
            .bind(enabled)
            .bind(google_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::Error::not_found("User", google_id));
        }
        Ok(())
    }

    async fn find_recipients_with_notifications_enabled(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT email FROM users WHERE notification_enabled = TRUE")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(email,)| email).collect())
    }
}
