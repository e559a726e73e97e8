//! NeoWs feed data transfer objects.
//!
//! Shapes mirror the NASA NeoWs `/neo/rest/v1/feed` JSON. The hazard flag is
//! authoritative; diameter data and close-approach entries may be missing and
//! must be tolerated.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Feed response: near-Earth objects grouped by approach date.
#[derive(Debug, Clone, Deserialize)]
pub struct NeoFeedResponse {
    #[serde(default)]
    pub near_earth_objects: BTreeMap<String, Vec<NeoRecord>>,
}

impl NeoFeedResponse {
    /// Flatten the per-date grouping into one record list, date order.
    pub fn into_records(self) -> Vec<NeoRecord> {
        self.near_earth_objects
            .into_values()
            .flatten()
            .collect()
    }
}

/// One near-Earth-object observation.
#[derive(Debug, Clone, Deserialize)]
pub struct NeoRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "is_potentially_hazardous_asteroid")]
    pub is_potentially_hazardous: bool,
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproachData>,
}

/// Estimated diameter ranges, keyed by unit.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatedDiameter {
    pub meters: Option<DiameterRange>,
}

/// Min/max estimated diameter.
#[derive(Debug, Clone, Deserialize)]
pub struct DiameterRange {
    #[serde(rename = "estimated_diameter_min")]
    pub min: f64,
    #[serde(rename = "estimated_diameter_max")]
    pub max: f64,
}

/// One close-approach entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseApproachData {
    pub close_approach_date: Option<NaiveDate>,
    pub miss_distance: Option<MissDistance>,
}

/// Miss distance in various units; kilometers is the one we carry.
#[derive(Debug, Clone, Deserialize)]
pub struct MissDistance {
    pub kilometers: String,
}
