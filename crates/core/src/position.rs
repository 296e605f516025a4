// crates/core/src/position.rs
//! Raw position records as stored in the tracking table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One GPS fix for a vehicle.
///
/// Field names on the wire follow the tracking table's columns, so the
/// vehicle identifier serializes as `car`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(rename = "car")]
    pub vehicle_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix epoch seconds.
    pub timestamp: i64,
    /// Calendar date the fix belongs to (serialized as `YYYY-MM-DD`).
    pub date: NaiveDate,
}

impl PositionRecord {
    pub fn new(
        vehicle_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            latitude,
            longitude,
            timestamp,
            date,
        }
    }
}
