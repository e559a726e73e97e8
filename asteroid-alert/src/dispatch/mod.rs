//! Digest dispatch.
//!
//! One dispatch cycle: snapshot unsent notifications, render one digest,
//! send it to every opted-in recipient, then mark exactly the snapshot's ids
//! sent. Marking happens after all attempts regardless of per-recipient
//! outcome: a recipient may miss a digest on a transient transport failure,
//! but no recipient is ever double-digested for the same notification set.

pub mod digest;
pub mod scheduler;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::Result;
use crate::database::repositories::{NotificationRepository, UserRepository};
use crate::mail::Mailer;

/// Digest email subject.
const DIGEST_SUBJECT: &str = "NASA Asteroid Collision Event";

/// Reads pending notifications and fans the rendered digest out to all
/// opted-in recipients.
pub struct Dispatcher {
    notification_repo: Arc<dyn NotificationRepository>,
    user_repo: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
}

impl Dispatcher {
    pub fn new(
        notification_repo: Arc<dyn NotificationRepository>,
        user_repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            mailer,
        }
    }

    /// Run one dispatch cycle. Returns the number of recipients that were
    /// sent the digest successfully.
    pub async fn dispatch(&self) -> Result<usize> {
        let pending = self.notification_repo.find_unsent().await?;
        if pending.is_empty() {
            debug!("No pending notifications; nothing to dispatch");
            return Ok(0);
        }

        let recipients = self
            .user_repo
            .find_recipients_with_notifications_enabled()
            .await?;
        if recipients.is_empty() {
            // Records stay pending for a future cycle with recipients.
            info!("No recipients with notifications enabled; leaving {} notifications pending", pending.len());
            return Ok(0);
        }

        let body = digest::render_digest(&pending);

        let mut notified = 0;
        for recipient in &recipients {
            match self.mailer.send(recipient, DIGEST_SUBJECT, &body).await {
                Ok(()) => {
                    debug!(recipient = %recipient, "Digest sent");
                    notified += 1;
                }
                Err(e) => {
                    // Isolated: remaining recipients and the mark-sent step
                    // proceed regardless.
                    warn!(recipient = %recipient, error = %e, "Failed to send digest");
                }
            }
        }

        let ids: Vec<i64> = pending.iter().map(|n| n.id).collect();
        self.notification_repo.mark_sent(&ids).await?;

        info!(
            "Dispatch cycle complete: {} notifications to {}/{} recipients",
            ids.len(),
            notified,
            recipients.len()
        );
        Ok(notified)
    }
}
