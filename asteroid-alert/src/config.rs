//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::Result;

/// Application configuration.
///
/// Every field has a default so the service starts with nothing but
/// `NASA_API_KEY` (and that falls back to NASA's public `DEMO_KEY`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database URL.
    pub database_url: String,
    /// API server bind address.
    pub bind_address: String,
    /// API server port.
    pub port: u16,
    /// NeoWs feed base URL.
    pub feed_base_url: String,
    /// NeoWs API key.
    pub feed_api_key: String,
    /// Per-call feed/mail HTTP timeout.
    pub request_timeout: Duration,
    /// How often the alert producer queries the feed.
    pub alert_interval: Duration,
    /// How many days (inclusive, ending today) each alert query covers.
    pub alert_window_days: u32,
    /// How often the consumer polls the topic for undelivered events.
    pub topic_poll_interval: Duration,
    /// How often the digest scheduler fires.
    pub digest_interval: Duration,
    /// Mail relay endpoint. Empty disables outbound mail.
    pub mail_relay_url: String,
    /// Bearer token for the mail relay.
    pub mail_relay_token: Option<String>,
    /// Sender address for digests.
    pub mail_from_address: String,
    /// Secret used to validate externally issued JWTs.
    pub jwt_secret: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:asteroid-alert.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            feed_base_url: "https://api.nasa.gov".to_string(),
            feed_api_key: "DEMO_KEY".to_string(),
            request_timeout: Duration::from_secs(30),
            alert_interval: Duration::from_secs(3600),
            alert_window_days: 1,
            topic_poll_interval: Duration::from_secs(1),
            digest_interval: Duration::from_secs(10),
            mail_relay_url: String::new(),
            mail_relay_token: None,
            mail_from_address: "alerts@asteroid-alert.local".to_string(),
            jwt_secret: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env_or_default() -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = env_nonempty("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = env_nonempty("API_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Some(port) = env_nonempty("API_PORT") {
            config.port = port
                .parse()
                .map_err(|_| crate::Error::config(format!("Invalid API_PORT: {}", port)))?;
        }
        if let Some(url) = env_nonempty("NASA_API_BASE_URL") {
            config.feed_base_url = url;
        }
        if let Some(key) = env_nonempty("NASA_API_KEY") {
            config.feed_api_key = key;
        }
        if let Some(secs) = env_secs("REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = secs;
        }
        if let Some(secs) = env_secs("ALERT_INTERVAL_SECS")? {
            config.alert_interval = secs;
        }
        if let Some(days) = env_nonempty("ALERT_WINDOW_DAYS") {
            config.alert_window_days = days
                .parse()
                .map_err(|_| crate::Error::config(format!("Invalid ALERT_WINDOW_DAYS: {}", days)))?;
        }
        if let Some(secs) = env_secs("TOPIC_POLL_INTERVAL_SECS")? {
            config.topic_poll_interval = secs;
        }
        if let Some(secs) = env_secs("DIGEST_INTERVAL_SECS")? {
            config.digest_interval = secs;
        }
        if let Some(url) = env_nonempty("MAIL_RELAY_URL") {
            config.mail_relay_url = url;
        }
        config.mail_relay_token = env_nonempty("MAIL_RELAY_TOKEN");
        if let Some(from) = env_nonempty("MAIL_FROM_ADDRESS") {
            config.mail_from_address = from;
        }
        config.jwt_secret = env_nonempty("JWT_SECRET");

        Ok(config)
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(name: &str) -> Result<Option<Duration>> {
    match env_nonempty(name) {
        Some(raw) => {
            let secs: u64 = raw
                .parse()
                .map_err(|_| crate::Error::config(format!("Invalid {}: {}", name, raw)))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.digest_interval, Duration::from_secs(10));
        assert_eq!(config.feed_api_key, "DEMO_KEY");
        assert!(config.mail_relay_url.is_empty());
    }
}
