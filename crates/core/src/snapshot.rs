// crates/core/src/snapshot.rs
//! GeoJSON snapshot types built from the latest fix of each vehicle.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::position::PositionRecord;
use crate::status::{classify, MotionState};

/// Format used for the human-readable `last_update` property.
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an epoch-seconds timestamp in server local time.
///
/// Timestamps outside chrono's representable range are rendered as the raw
/// epoch-seconds number.
pub fn format_last_update(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&Local).format(LAST_UPDATE_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Point {
    /// `[longitude, latitude]`, GeoJSON axis order.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    pub id: String,
    pub status: MotionState,
    pub timestamp: i64,
    pub date: NaiveDate,
    pub last_update: String,
}

/// One vehicle's latest position, ready to be drawn on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Point,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn from_record(record: &PositionRecord, now: i64) -> Self {
        Self {
            geometry: Point {
                coordinates: [record.longitude, record.latitude],
            },
            properties: FeatureProperties {
                id: record.vehicle_id.clone(),
                status: classify(record.timestamp, now),
                timestamp: record.timestamp,
                date: record.date,
                last_update: format_last_update(record.timestamp),
            },
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.properties.id
    }

    pub fn state(&self) -> MotionState {
        self.properties.status
    }
}

/// Per-state tallies. Every state is always present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub moving: usize,
    pub idle: usize,
    pub stopped: usize,
}

impl StatusCounts {
    pub fn record(&mut self, state: MotionState) {
        match state {
            MotionState::Moving => self.moving += 1,
            MotionState::Idle => self.idle += 1,
            MotionState::Stopped => self.stopped += 1,
        }
    }

    pub fn get(&self, state: MotionState) -> usize {
        match state {
            MotionState::Moving => self.moving,
            MotionState::Idle => self.idle,
            MotionState::Stopped => self.stopped,
        }
    }

    pub fn total(&self) -> usize {
        self.moving + self.idle + self.stopped
    }
}

/// The filter-scoped view of every vehicle's latest position at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub features: Vec<Feature>,
    pub counts: StatusCounts,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from latest-per-vehicle rows.
    ///
    /// Order follows the input. Should a vehicle appear more than once, only
    /// its newest record is kept, in the slot of its first appearance.
    pub fn from_records(records: &[PositionRecord], now: i64) -> Self {
        let mut slots: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        let mut kept: Vec<&PositionRecord> = Vec::with_capacity(records.len());

        for record in records {
            match slots.get(record.vehicle_id.as_str()) {
                Some(&idx) => {
                    if record.timestamp > kept[idx].timestamp {
                        kept[idx] = record;
                    }
                }
                None => {
                    slots.insert(record.vehicle_id.as_str(), kept.len());
                    kept.push(record);
                }
            }
        }

        let mut counts = StatusCounts::default();
        let features = kept
            .into_iter()
            .map(|record| {
                let feature = Feature::from_record(record, now);
                counts.record(feature.state());
                feature
            })
            .collect();

        Self { features, counts }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Plain GeoJSON collection, as served by the REST endpoint.
    pub fn into_feature_collection(self) -> FeatureCollection {
        FeatureCollection {
            features: self.features,
            counts: None,
        }
    }

    /// Collection with the `counts` member, as pushed on the live channel.
    pub fn into_live_message(self) -> FeatureCollection {
        FeatureCollection {
            features: self.features,
            counts: Some(self.counts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<StatusCounts>,
}
