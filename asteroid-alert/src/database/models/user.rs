//! User database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model.
///
/// Identity itself lives with the external provider; we keep the external
/// subject (`google_id`) plus the notification preference and audit stamps.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// External identity subject (unique)
    pub google_id: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Whether the user receives digest emails.
    pub notification_enabled: bool,
    /// Unix epoch milliseconds (UTC) when the user was created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) of last login sync.
    pub last_login_at: Option<i64>,
}

impl UserDbModel {
    /// Create a new user. Notifications are enabled by default.
    pub fn new(
        google_id: impl Into<String>,
        email: impl Into<String>,
        full_name: Option<String>,
    ) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            google_id: google_id.into(),
            email: email.into(),
            full_name,
            notification_enabled: true,
            created_at: now,
            last_login_at: Some(now),
        }
    }

    /// Get created_at as `DateTime<Utc>`.
    pub fn get_created_at(&self) -> DateTime<Utc> {
        crate::database::time::ms_to_datetime(self.created_at)
    }

    /// Get last_login_at as `DateTime<Utc>`.
    pub fn get_last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at.map(crate::database::time::ms_to_datetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = UserDbModel::new("sub-123", "user@example.com", Some("Test User".into()));
        assert!(user.notification_enabled, "new users opt in by default");
        assert!(uuid::Uuid::parse_str(&user.id).is_ok());
        assert_eq!(user.google_id, "sub-123");
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn test_new_user_uuid_uniqueness() {
        let a = UserDbModel::new("sub-1", "a@example.com", None);
        let b = UserDbModel::new("sub-1", "a@example.com", None);
        assert_ne!(a.id, b.id);
    }
}
