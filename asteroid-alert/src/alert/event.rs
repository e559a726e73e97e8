//! Collision event wire payload.

use serde::{Deserialize, Serialize};

/// Sentinel used when a hazardous record has no usable close-approach date.
pub const UNKNOWN_APPROACH_DATE: &str = "UNKNOWN";

/// Normalized, immutable event derived from one hazardous near-Earth object,
/// published on the "asteroid-alert" topic.
///
/// Field names are the wire format; downstream consumers depend on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionEvent {
    pub asteroid_name: String,
    /// ISO-8601 date, or [`UNKNOWN_APPROACH_DATE`].
    pub close_approach_date: String,
    /// Exact decimal, passed through verbatim from the feed.
    pub miss_distance_kilometers: String,
    /// Arithmetic mean of the estimated diameter range, in meters.
    pub estimated_diameter_avg_meters: f64,
}
