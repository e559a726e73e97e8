//! Notification database model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted asteroid alert, tracked through Pending/Sent states.
///
/// `email_sent` transitions exactly once, false -> true, when a dispatch
/// cycle has attempted delivery to every recipient. Rows are never deleted
/// by the pipeline.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationDbModel {
    /// Surrogate id (0 until persisted).
    pub id: i64,
    /// Weak back reference to a user; dispatch never requires it.
    pub user_id: Option<String>,
    pub asteroid_name: String,
    /// None when the source event carried the "UNKNOWN" sentinel or an
    /// unparseable date.
    pub close_approach_date: Option<NaiveDate>,
    /// Exact decimal, stored verbatim as text.
    pub miss_distance_km: String,
    pub estimated_diameter_avg_m: f64,
    pub email_sent: bool,
    /// External identifier of the asteroid; "N/A" when the event carried none.
    pub source_asteroid_id: String,
    /// Unix epoch milliseconds (UTC) of ingestion.
    pub received_at: i64,
}

impl NotificationDbModel {
    /// Create a new pending notification, stamped with the current time.
    pub fn new(
        asteroid_name: impl Into<String>,
        close_approach_date: Option<NaiveDate>,
        miss_distance_km: impl Into<String>,
        estimated_diameter_avg_m: f64,
        source_asteroid_id: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            user_id: None,
            asteroid_name: asteroid_name.into(),
            close_approach_date,
            miss_distance_km: miss_distance_km.into(),
            estimated_diameter_avg_m,
            email_sent: false,
            source_asteroid_id: source_asteroid_id.into(),
            received_at: crate::database::time::now_ms(),
        }
    }
}
