//! Shared tracker and report types

use serde::{Deserialize, Serialize};

/// Distance below which a tracker counts as "at home", in meters.
///
/// Fixed threshold; not tunable per call.
pub const HOME_RADIUS_METERS: f64 = 30.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One position report from a tracker device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerPosition {
    /// Where the tracker was observed
    pub coordinate: Coordinate,

    /// Observation time as unix seconds
    pub observed_at: i64,

    /// Reverse-geocoded place info, merged in from the address lookup.
    /// History entries carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<serde_json::Value>,
}

/// Identifier and device type for one tracker on the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Result of one home/away evaluation.
///
/// Serialized camelCase; this is the HTTP boundary's response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub distance_meters: f64,
    pub is_home: bool,
    pub coordinate: Coordinate,
}
