//! Digest rendering.

use crate::alert::event::UNKNOWN_APPROACH_DATE;
use crate::database::models::NotificationDbModel;

const HEADER: &str = "Asteroid Alert:\n";
const SEPARATOR: &str = "=========================\n";

/// Render one digest body listing every pending notification, each entry
/// terminated by a separator line.
pub fn render_digest(notifications: &[NotificationDbModel]) -> String {
    let mut body = String::new();
    body.push_str(HEADER);
    body.push_str(SEPARATOR);

    for notification in notifications {
        let approach_date = notification
            .close_approach_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| UNKNOWN_APPROACH_DATE.to_string());

        body.push_str(&format!("Asteroid Name: {}\n", notification.asteroid_name));
        body.push_str(&format!("Close Approach Date: {}\n", approach_date));
        body.push_str(&format!(
            "Estimated Diameter Avg Meters: {}\n",
            notification.estimated_diameter_avg_m
        ));
        body.push_str(&format!(
            "Miss Distance Kilometers: {}\n",
            notification.miss_distance_km
        ));
        body.push_str(SEPARATOR);
    }

    body
}
