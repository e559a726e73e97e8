//! Alert production: feed query, hazard classification, event mapping, and
//! topic publish.

pub mod event;
pub mod scheduler;

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::Result;
use crate::database::repositories::AlertTopicOps;
use crate::feed::NeoFeedClient;
use crate::feed::models::NeoRecord;
use event::{CollisionEvent, UNKNOWN_APPROACH_DATE};

/// Whether a record is alert-worthy. The feed's hazard flag is authoritative.
pub fn is_hazardous(record: &NeoRecord) -> bool {
    record.is_potentially_hazardous
}

/// Map a hazardous record to a collision event.
///
/// A missing close-approach entry (or a missing date on the first entry)
/// degrades to the "UNKNOWN" sentinel rather than failing; a missing meters
/// diameter range fails the mapping and the record is skipped by the caller.
pub fn map_event(record: &NeoRecord) -> Result<CollisionEvent> {
    let diameter = record
        .estimated_diameter
        .as_ref()
        .and_then(|d| d.meters.as_ref())
        .ok_or_else(|| {
            crate::Error::Mapping(format!(
                "record {} has no meters diameter range",
                record.id
            ))
        })?;

    let first_approach = record.close_approach_data.first();

    let close_approach_date = first_approach
        .and_then(|a| a.close_approach_date)
        .map(|d| d.to_string())
        .unwrap_or_else(|| UNKNOWN_APPROACH_DATE.to_string());

    let miss_distance_kilometers = first_approach
        .and_then(|a| a.miss_distance.as_ref())
        .map(|m| m.kilometers.clone())
        .unwrap_or_else(|| "0".to_string());

    Ok(CollisionEvent {
        asteroid_name: record.name.clone(),
        close_approach_date,
        miss_distance_kilometers,
        estimated_diameter_avg_meters: (diameter.min + diameter.max) / 2.0,
    })
}

/// Publishes collision events for hazardous records in a date range.
///
/// Stateless apart from the topic writes; a feed fetch failure is fatal to
/// the invocation and surfaced to the caller, while a single record that
/// cannot be mapped is logged and skipped.
pub struct AlertProducer {
    feed_client: Arc<dyn NeoFeedClient>,
    pool: SqlitePool,
}

impl AlertProducer {
    pub fn new(feed_client: Arc<dyn NeoFeedClient>, pool: SqlitePool) -> Self {
        Self { feed_client, pool }
    }

    /// Query the feed for `[from, to]`, publish one event per hazardous
    /// record, and return the number of events published.
    pub async fn alert(&self, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        info!("Querying NeoWs feed for {} to {}", from, to);
        let records = self.feed_client.fetch_neo_records(from, to).await?;
        info!("Received {} records from feed", records.len());

        let hazardous: Vec<&NeoRecord> = records.iter().filter(|r| is_hazardous(r)).collect();
        info!("Found {} hazardous records", hazardous.len());

        let mut published = 0;
        for record in hazardous {
            let event = match map_event(record) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        asteroid = %record.name,
                        error = %e,
                        "Skipping record that could not be mapped"
                    );
                    continue;
                }
            };

            AlertTopicOps::publish(&self.pool, &event).await?;
            published += 1;
        }

        info!("Published {} collision events", published);
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::models::{CloseApproachData, DiameterRange, EstimatedDiameter, MissDistance};
    use async_trait::async_trait;

    fn record(name: &str, hazardous: bool) -> NeoRecord {
        NeoRecord {
            id: "2099942".to_string(),
            name: name.to_string(),
            is_potentially_hazardous: hazardous,
            estimated_diameter: Some(EstimatedDiameter {
                meters: Some(DiameterRange {
                    min: 300.0,
                    max: 370.0,
                }),
            }),
            close_approach_data: vec![CloseApproachData {
                close_approach_date: NaiveDate::from_ymd_opt(2029, 4, 13),
                miss_distance: Some(MissDistance {
                    kilometers: "31000".to_string(),
                }),
            }],
        }
    }

    #[test]
    fn test_hazard_filter_follows_flag() {
        assert!(is_hazardous(&record("A", true)));
        assert!(!is_hazardous(&record("B", false)));
    }

    #[test]
    fn test_map_event_apophis() {
        let event = map_event(&record("Apophis", true)).unwrap();
        assert_eq!(event.asteroid_name, "Apophis");
        assert_eq!(event.close_approach_date, "2029-04-13");
        assert_eq!(event.miss_distance_kilometers, "31000");
        assert!((event.estimated_diameter_avg_meters - 335.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_map_event_empty_approach_list() {
        let mut r = record("Sparse", true);
        r.close_approach_data.clear();

        let event = map_event(&r).unwrap();
        assert_eq!(event.close_approach_date, UNKNOWN_APPROACH_DATE);
        assert_eq!(event.miss_distance_kilometers, "0");
    }

    #[test]
    fn test_map_event_null_date() {
        let mut r = record("NullDate", true);
        r.close_approach_data[0].close_approach_date = None;

        let event = map_event(&r).unwrap();
        assert_eq!(event.close_approach_date, UNKNOWN_APPROACH_DATE);
        assert_eq!(event.miss_distance_kilometers, "31000");
    }

    #[test]
    fn test_map_event_degenerate_diameter_range() {
        let mut r = record("Flat", true);
        r.estimated_diameter = Some(EstimatedDiameter {
            meters: Some(DiameterRange {
                min: 120.0,
                max: 120.0,
            }),
        });

        let event = map_event(&r).unwrap();
        assert!((event.estimated_diameter_avg_meters - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_map_event_missing_diameter_fails() {
        let mut r = record("NoDiameter", true);
        r.estimated_diameter = None;

        let err = map_event(&r).unwrap_err();
        assert!(matches!(err, crate::Error::Mapping(_)));
    }

    struct StubFeed {
        records: Vec<NeoRecord>,
    }

    #[async_trait]
    impl NeoFeedClient for StubFeed {
        async fn fetch_neo_records(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> crate::Result<Vec<NeoRecord>> {
            Ok(self.records.clone())
        }
    }

    struct FailingFeed;

    #[async_trait]
    impl NeoFeedClient for FailingFeed {
        async fn fetch_neo_records(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> crate::Result<Vec<NeoRecord>> {
            Err(crate::Error::FeedRequest("503".to_string()))
        }
    }

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::database::run_migrations(&pool).await.unwrap();
        pool
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        let d = NaiveDate::from_ymd_opt(2029, 4, 13).unwrap();
        (d, d)
    }

    #[tokio::test]
    async fn test_alert_publishes_only_hazardous() {
        let pool = setup_pool().await;
        let feed = StubFeed {
            records: vec![
                record("Hazardous", true),
                record("Harmless", false),
            ],
        };
        let producer = AlertProducer::new(Arc::new(feed), pool.clone());

        let (from, to) = dates();
        let published = producer.alert(from, to).await.unwrap();
        assert_eq!(published, 1);

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].payload.contains("Hazardous"));
    }

    #[tokio::test]
    async fn test_alert_skips_unmappable_record() {
        let pool = setup_pool().await;
        let mut broken = record("Broken", true);
        broken.estimated_diameter = None;

        let feed = StubFeed {
            records: vec![broken, record("Good", true)],
        };
        let producer = AlertProducer::new(Arc::new(feed), pool.clone());

        let (from, to) = dates();
        let published = producer.alert(from, to).await.unwrap();
        assert_eq!(published, 1);
    }

    #[tokio::test]
    async fn test_alert_feed_failure_is_fatal() {
        let pool = setup_pool().await;
        let producer = AlertProducer::new(Arc::new(FailingFeed), pool.clone());

        let (from, to) = dates();
        let err = producer.alert(from, to).await.unwrap_err();
        assert!(matches!(err, crate::Error::FeedRequest(_)));

        let entries = AlertTopicOps::fetch_undelivered(&pool, 10).await.unwrap();
        assert!(entries.is_empty());
    }
}
