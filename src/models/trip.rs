// SPDX-License-Identifier: MIT

//! Trip and GPS sample models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::time_utils;

/// One timestamped GPS fix. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Fix timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Instantaneous speed in meters per second, when the fix provides one.
    #[serde(default)]
    pub speed_mps: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// Coordinate snapshot captured at a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A recorded ride.
///
/// While `is_active` is true this is the single in-progress trip, mirrored
/// into the durable `activeTrip` slot after every mutation. Once completed
/// the record is frozen and lives in the `trips` history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Opaque unique identifier, stable for the trip's lifetime.
    pub id: String,
    /// Start instant (RFC3339).
    pub start_time: String,
    /// End instant (RFC3339); absent while the trip is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Accumulated distance in kilometers. Derived solely from consecutive
    /// sample pairs; never set directly by callers.
    pub distance_km: f64,
    /// Elapsed seconds; derived while active, frozen at completion.
    pub duration_sec: u64,
    pub is_active: bool,
    /// Mean of positive sample speeds, in km/h.
    #[serde(default)]
    pub avg_speed_kmh: f64,
    /// Ordered sample history (insertion order = chronological).
    /// Append-only while the trip is active.
    #[serde(default)]
    pub locations: Vec<GeoSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
}

impl Trip {
    /// Create a new active trip with zeroed aggregates.
    pub fn new_active(now: DateTime<Utc>) -> Self {
        Self {
            id: next_trip_id(now),
            start_time: time_utils::format_utc_rfc3339(now),
            end_time: None,
            distance_km: 0.0,
            duration_sec: 0,
            is_active: true,
            avg_speed_kmh: 0.0,
            locations: Vec::new(),
            start_location: None,
            end_location: None,
            start_address: None,
            end_address: None,
        }
    }

    /// Create an already-completed manual entry (no GPS data, no duration).
    pub fn new_manual(now: DateTime<Utc>, distance_km: f64) -> Self {
        let instant = time_utils::format_utc_rfc3339(now);
        Self {
            id: next_trip_id(now),
            start_time: instant.clone(),
            end_time: Some(instant),
            distance_km,
            duration_sec: 0,
            is_active: false,
            avg_speed_kmh: 0.0,
            locations: Vec::new(),
            start_location: None,
            end_location: None,
            start_address: None,
            end_address: None,
        }
    }

    /// Whether the trip started on the given calendar date.
    pub fn started_on(&self, date: NaiveDate) -> bool {
        time_utils::date_of(&self.start_time) == Some(date)
    }
}

static TRIP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a trip id from the wall clock plus a process-local sequence.
///
/// The timestamp alone collides when two trips are created within the same
/// millisecond (manual entries in quick succession).
fn next_trip_id(now: DateTime<Utc>) -> String {
    let seq = TRIP_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", now.timestamp_millis(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(lat: f64, lon: f64, t_ms: i64, speed: Option<f64>) -> GeoSample {
        GeoSample {
            latitude: lat,
            longitude: lon,
            timestamp_ms: t_ms,
            speed_mps: speed,
            altitude: None,
        }
    }

    #[test]
    fn test_new_active_is_zeroed() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let trip = Trip::new_active(now);

        assert!(trip.is_active);
        assert_eq!(trip.distance_km, 0.0);
        assert_eq!(trip.duration_sec, 0);
        assert!(trip.end_time.is_none());
        assert!(trip.locations.is_empty());
    }

    #[test]
    fn test_manual_entry_has_equal_start_and_end() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let trip = Trip::new_manual(now, 12.5);

        assert!(!trip.is_active);
        assert_eq!(trip.end_time.as_deref(), Some(trip.start_time.as_str()));
        assert_eq!(trip.distance_km, 12.5);
        assert_eq!(trip.duration_sec, 0);
    }

    #[test]
    fn test_trip_ids_are_unique_within_a_millisecond() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let a = Trip::new_manual(now, 1.0);
        let b = Trip::new_manual(now, 1.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_started_on() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap();
        let trip = Trip::new_active(now);

        assert!(trip.started_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(!trip.started_on(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()));
    }

    #[test]
    fn test_trip_serde_round_trip() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut trip = Trip::new_active(now);
        trip.distance_km = 3.25;
        trip.avg_speed_kmh = 21.6;
        trip.start_location = Some(GeoPoint {
            latitude: 12.97,
            longitude: 77.59,
        });
        trip.start_address = Some("MG Road, Bengaluru".to_string());
        trip.locations = vec![
            sample(12.97, 77.59, 1_705_312_800_000, Some(6.0)),
            sample(12.971, 77.59, 1_705_312_805_000, None),
        ];

        let json = serde_json::to_string(&trip).unwrap();
        let back: Trip = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trip);
    }

    #[test]
    fn test_trip_decodes_with_missing_optional_fields() {
        // Older snapshots may lack locations/avg_speed entirely.
        let json = r#"{
            "id": "1705312800000-0",
            "start_time": "2024-01-15T10:00:00Z",
            "distance_km": 1.5,
            "duration_sec": 300,
            "is_active": true
        }"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert!(trip.locations.is_empty());
        assert_eq!(trip.avg_speed_kmh, 0.0);
        assert!(trip.start_location.is_none());
    }
}
