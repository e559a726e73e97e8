//! API request/response models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::models::{NotificationDbModel, UserDbModel};
use crate::database::time::ms_to_datetime;

/// User profile and settings as exposed over the API.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub google_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub notification_enabled: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp.
    pub last_login_at: Option<String>,
}

impl From<UserDbModel> for UserResponse {
    fn from(user: UserDbModel) -> Self {
        Self {
            id: user.id,
            google_id: user.google_id,
            email: user.email,
            full_name: user.full_name,
            notification_enabled: user.notification_enabled,
            created_at: ms_to_datetime(user.created_at).to_rfc3339(),
            last_login_at: user.last_login_at.map(|ms| ms_to_datetime(ms).to_rfc3339()),
        }
    }
}

/// One notification as exposed over the API.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: i64,
    pub asteroid_name: String,
    pub close_approach_date: Option<NaiveDate>,
    pub miss_distance_kilometers: String,
    pub estimated_diameter_avg_meters: f64,
    pub email_sent: bool,
    pub source_asteroid_id: String,
    /// RFC 3339 timestamp of ingestion.
    pub received_at: String,
}

impl From<NotificationDbModel> for NotificationResponse {
    fn from(notification: NotificationDbModel) -> Self {
        Self {
            id: notification.id,
            asteroid_name: notification.asteroid_name,
            close_approach_date: notification.close_approach_date,
            miss_distance_kilometers: notification.miss_distance_km,
            estimated_diameter_avg_meters: notification.estimated_diameter_avg_m,
            email_sent: notification.email_sent,
            source_asteroid_id: notification.source_asteroid_id,
            received_at: ms_to_datetime(notification.received_at).to_rfc3339(),
        }
    }
}

/// Notification settings update.
///
/// An explicit, enumerated structure: unknown keys are rejected outright
/// rather than logged and ignored.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateNotificationSettingsRequest {
    pub notification_enabled: bool,
}
