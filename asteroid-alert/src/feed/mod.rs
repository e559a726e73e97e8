//! NeoWs feed access.
//!
//! Pure data access; hazard classification and event mapping live in
//! [`crate::alert`].

pub mod models;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use crate::Result;
use models::{NeoFeedResponse, NeoRecord};

/// Feed client contract: near-Earth-object records for an inclusive date range.
#[async_trait]
pub trait NeoFeedClient: Send + Sync {
    async fn fetch_neo_records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NeoRecord>>;
}

/// NASA NeoWs HTTP client.
pub struct NasaNeoClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl NasaNeoClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl NeoFeedClient for NasaNeoClient {
    async fn fetch_neo_records(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NeoRecord>> {
        let url = format!("{}/neo/rest/v1/feed", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("start_date", from.to_string()),
                ("end_date", to.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::FeedRequest(format!(
                "NeoWs feed returned {}: {}",
                status, body
            )));
        }

        let feed: NeoFeedResponse = response.json().await?;
        let records = feed.into_records();
        debug!("NeoWs feed returned {} records", records.len());
        Ok(records)
    }
}
