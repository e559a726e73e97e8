//! Periodic alert production.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::AlertProducer;

/// Drives the alert producer on a fixed interval with a sliding date window.
///
/// A transient feed failure is logged and retried on the next tick; the
/// schedule itself is the retry mechanism.
pub struct AlertScheduler {
    producer: Arc<AlertProducer>,
    interval: Duration,
    window_days: u32,
    cancellation_token: CancellationToken,
}

impl AlertScheduler {
    pub fn new(
        producer: Arc<AlertProducer>,
        interval: Duration,
        window_days: u32,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            producer,
            interval,
            window_days: window_days.max(1),
            cancellation_token,
        }
    }

    /// Spawn the scheduler loop.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = self.cancellation_token.cancelled() => {
                        info!("Alert scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                let to = Utc::now().date_naive();
                let from = to
                    .checked_sub_days(Days::new(u64::from(self.window_days - 1)))
                    .unwrap_or(to);

                match self.producer.alert(from, to).await {
                    Ok(published) => {
                        debug!("Alert cycle published {} events", published);
                    }
                    Err(e) => {
                        warn!(error = %e, "Alert cycle failed; retrying next tick");
                    }
                }
            }
        })
    }
}
