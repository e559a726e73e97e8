//! Outbound mail transport.
//!
//! The transport itself is an external collaborator; only the synchronous
//! per-call send contract matters here. The production implementation relays
//! through an HTTP mail API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::Result;

/// Mail transport contract: one synchronous send per call, no batching.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Mail relay configuration.
#[derive(Debug, Clone)]
pub struct MailRelayConfig {
    /// Relay endpoint. Empty disables outbound mail.
    pub url: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// Sender address.
    pub from_address: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

/// HTTP mail relay.
pub struct HttpMailer {
    config: MailRelayConfig,
    client: Client,
}

impl HttpMailer {
    pub fn new(config: MailRelayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.url.is_empty() && !self.config.from_address.is_empty()
    }

    fn build_payload(&self, to: &str, subject: &str, body: &str) -> serde_json::Value {
        json!({
            "from": self.config.from_address,
            "to": to,
            "subject": subject,
            "text": body,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if !self.is_enabled() {
            debug!("Mail relay not configured; dropping message to {}", to);
            return Ok(());
        }

        let mut request = self
            .client
            .post(&self.config.url)
            .json(&self.build_payload(to, subject, body));

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| crate::Error::Mail(format!("relay request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Mail relay failed: {} - {}", status, text);
            return Err(crate::Error::Mail(format!(
                "relay returned {}: {}",
                status, text
            )));
        }

        debug!("Mail sent to {}", to);
        Ok(())
    }
}
