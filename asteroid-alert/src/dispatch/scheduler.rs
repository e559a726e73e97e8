//! Digest scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Dispatcher;

/// Fires the dispatcher on a fixed interval.
///
/// The timer itself never waits on a cycle's sends (fire-and-continue), but
/// cycles are mutually exclusive: a tick that finds the previous cycle still
/// running is skipped. Without that guard two overlapping cycles could both
/// snapshot the same unsent rows before either marks them, duplicating digest
/// lines across two emails. The atomic per-id mark bounds the damage either
/// way; the guard removes it.
pub struct DigestScheduler {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl DigestScheduler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            dispatcher,
            interval,
            cancellation_token,
        }
    }

    /// Spawn the scheduler loop.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let in_flight = Arc::new(Mutex::new(()));
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = self.cancellation_token.cancelled() => {
                        info!("Digest scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                let dispatcher = self.dispatcher.clone();
                let guard = in_flight.clone();
                tokio::spawn(async move {
                    // Single-flight: skip the tick if a cycle is still running.
                    let Ok(_lock) = guard.try_lock() else {
                        debug!("Previous dispatch cycle still running; skipping tick");
                        return;
                    };

                    match dispatcher.dispatch().await {
                        Ok(notified) if notified > 0 => {
                            debug!("Dispatch cycle notified {} recipients", notified);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "Dispatch cycle failed");
                        }
                    }
                });
            }
        })
    }
}
