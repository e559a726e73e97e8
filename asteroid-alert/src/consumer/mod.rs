//! Collision event ingestion.
//!
//! Subscribes to the "asteroid-alert" topic and persists each event as a
//! pending notification. Persistence and acknowledgment happen in one
//! immediate transaction, so a failed insert leaves the entry undelivered
//! and it is redelivered on a later poll. Duplicate deliveries therefore
//! produce duplicate notification rows; outbound dedup rests on the
//! `email_sent` flag alone.

use std::time::Duration;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::alert::event::{CollisionEvent, UNKNOWN_APPROACH_DATE};
use crate::database::models::NotificationDbModel;
use crate::database::repositories::{AlertTopicOps, SqlxNotificationRepository, TopicEntry};

/// Redelivery bound for a single topic entry. Past this the entry is parked
/// so one poison message cannot wedge the stream.
const MAX_DELIVERY_ATTEMPTS: i64 = 5;

/// Placeholder for events that carry no source identifier (the wire format
/// has none).
const SOURCE_ID_PLACEHOLDER: &str = "N/A";

/// Entries fetched per poll.
const POLL_BATCH_SIZE: i32 = 32;

/// Parse a wire close-approach date.
///
/// The "UNKNOWN" sentinel and unparseable values both map to None; a bad
/// date is logged but never fatal.
pub fn parse_approach_date(raw: &str) -> Option<NaiveDate> {
    if raw.eq_ignore_ascii_case(UNKNOWN_APPROACH_DATE) {
        return None;
    }

    match raw.parse::<NaiveDate>() {
        Ok(date) => Some(date),
        Err(e) => {
            error!(raw = %raw, error = %e, "Failed to parse close approach date");
            None
        }
    }
}

/// Topic consumer: polls for undelivered events and ingests them.
pub struct AlertConsumer {
    pool: SqlitePool,
    poll_interval: Duration,
    cancellation_token: CancellationToken,
}

impl AlertConsumer {
    pub fn new(
        pool: SqlitePool,
        poll_interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            pool,
            poll_interval,
            cancellation_token,
        }
    }

    /// Spawn the consumer loop.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = self.cancellation_token.cancelled() => {
                        info!("Alert consumer shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }

                if let Err(e) = self.poll_once().await {
                    warn!(error = %e, "Consumer poll failed");
                }
            }
        })
    }

    /// Drain one batch of undelivered entries. Returns how many were ingested.
    pub async fn poll_once(&self) -> Result<usize> {
        let entries = AlertTopicOps::fetch_undelivered(&self.pool, POLL_BATCH_SIZE).await?;

        let mut ingested = 0;
        for entry in entries {
            if self.ingest_entry(&entry).await {
                ingested += 1;
            }
        }

        Ok(ingested)
    }

    /// Ingest one entry; returns true when a notification was persisted.
    async fn ingest_entry(&self, entry: &TopicEntry) -> bool {
        let event: CollisionEvent = match serde_json::from_str(&entry.payload) {
            Ok(event) => event,
            Err(e) => {
                error!(entry_id = entry.id, error = %e, "Undecodable topic payload");
                self.handle_failure(entry, &format!("payload parse error: {}", e))
                    .await;
                return false;
            }
        };

        debug!(entry_id = entry.id, asteroid = %event.asteroid_name, "Ingesting collision event");

        let notification = NotificationDbModel::new(
            event.asteroid_name.clone(),
            parse_approach_date(&event.close_approach_date),
            event.miss_distance_kilometers.clone(),
            event.estimated_diameter_avg_meters,
            SOURCE_ID_PLACEHOLDER,
        );

        match self.persist_and_ack(entry.id, &notification).await {
            Ok(id) => {
                info!(notification_id = id, asteroid = %notification.asteroid_name, "Notification saved");
                true
            }
            Err(e) => {
                warn!(entry_id = entry.id, error = %e, "Failed to persist notification; entry will be redelivered");
                self.handle_failure(entry, &e.to_string()).await;
                false
            }
        }
    }

    /// Insert the notification and mark the entry delivered, atomically.
    async fn persist_and_ack(
        &self,
        entry_id: i64,
        notification: &NotificationDbModel,
    ) -> Result<i64> {
        let mut tx = crate::database::begin_immediate(&self.pool).await?;
        let id = SqlxNotificationRepository::insert_tx(&mut tx, notification).await?;
        AlertTopicOps::mark_delivered(&mut tx, entry_id).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn handle_failure(&self, entry: &TopicEntry, error_msg: &str) {
        // attempts counts prior failures; this one makes attempts + 1.
        let result = if entry.attempts + 1 >= MAX_DELIVERY_ATTEMPTS {
            error!(
                entry_id = entry.id,
                attempts = entry.attempts + 1,
                "Giving up on topic entry; parking it"
            );
            AlertTopicOps::park(&self.pool, entry.id, error_msg).await
        } else {
            AlertTopicOps::record_failure(&self.pool, entry.id, error_msg).await
        };

        if let Err(e) = result {
            error!(entry_id = entry.id, error = %e, "Failed to record delivery failure");
        }
    }
}
