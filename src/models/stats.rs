// SPDX-License-Identifier: MIT

//! User statistics aggregates derived from trip and fuel history.
//!
//! Aggregates are updated incrementally when trips complete and fully
//! recomputed after deletions, so drift never survives a destructive edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{FuelEntry, Trip};

/// Derived user statistics. Never independently authoritative: every field
/// can be rebuilt from the completed-trip and fuel-entry histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Total distance across all completed trips (km).
    #[serde(default)]
    pub total_distance_km: f64,
    /// Distance of trips started on the current calendar date (km).
    #[serde(default)]
    pub today_distance_km: f64,
    /// Mileage of the most recently dated fuel entry (km/l).
    #[serde(default)]
    pub last_mileage_km_per_l: f64,
    /// Ids of trips already folded into the totals (duplicate detection).
    #[serde(default)]
    pub completed_trip_ids: HashSet<String>,
    /// Last update timestamp (RFC3339).
    #[serde(default)]
    pub updated_at: String,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_distance_km: 0.0,
            today_distance_km: 0.0,
            last_mileage_km_per_l: 0.0,
            completed_trip_ids: HashSet::new(),
            updated_at: String::new(),
        }
    }
}

impl UserStats {
    /// Fold a completed trip into the totals.
    ///
    /// Returns `true` if the trip was new, `false` if it had already been
    /// applied (idempotent duplicate). The id set is what makes an
    /// interrupted stop recoverable without double counting.
    pub fn apply_completed_trip(&mut self, trip: &Trip, today: NaiveDate, now: &str) -> bool {
        if self.completed_trip_ids.contains(&trip.id) {
            return false;
        }
        self.completed_trip_ids.insert(trip.id.clone());
        self.total_distance_km += trip.distance_km;
        if trip.started_on(today) {
            self.today_distance_km += trip.distance_km;
        }
        self.updated_at = now.to_string();
        true
    }

    /// Reverse a deleted trip's contribution, clamping both totals at zero.
    pub fn remove_trip(&mut self, trip: &Trip, today: NaiveDate, now: &str) {
        self.completed_trip_ids.remove(&trip.id);
        self.total_distance_km = (self.total_distance_km - trip.distance_km).max(0.0);
        if trip.started_on(today) {
            self.today_distance_km = (self.today_distance_km - trip.distance_km).max(0.0);
        }
        self.updated_at = now.to_string();
    }

    /// Rebuild `today_distance_km` by filtering the trip history.
    /// Run at hydration so yesterday's total does not leak into a new day.
    pub fn recompute_today(&mut self, trips: &[Trip], today: NaiveDate) {
        self.today_distance_km = trips
            .iter()
            .filter(|t| !t.is_active && t.started_on(today))
            .map(|t| t.distance_km)
            .sum();
    }

    /// Record the mileage of a freshly added fuel entry.
    pub fn record_mileage(&mut self, mileage_km_per_l: f64, now: &str) {
        self.last_mileage_km_per_l = mileage_km_per_l;
        self.updated_at = now.to_string();
    }

    /// Full recompute of `last_mileage_km_per_l` from the remaining entries.
    /// Latest date wins; on a date tie the later element in the list wins.
    pub fn recompute_last_mileage(&mut self, entries: &[FuelEntry], now: &str) {
        self.last_mileage_km_per_l = entries
            .iter()
            .max_by(|a, b| a.date.cmp(&b.date))
            .map(|e| e.mileage_km_per_l)
            .unwrap_or(0.0);
        self.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn completed_trip(distance_km: f64) -> Trip {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut trip = Trip::new_manual(now, distance_km);
        // new_manual already sets is_active = false
        trip.duration_sec = 0;
        trip
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_apply_completed_trip_updates_both_totals() {
        let mut stats = UserStats::default();
        let trip = completed_trip(12.3);

        assert!(stats.apply_completed_trip(&trip, today(), "now"));
        assert_eq!(stats.total_distance_km, 12.3);
        assert_eq!(stats.today_distance_km, 12.3);
    }

    #[test]
    fn test_apply_is_idempotent_per_trip_id() {
        let mut stats = UserStats::default();
        let trip = completed_trip(10.0);

        assert!(stats.apply_completed_trip(&trip, today(), "now"));
        assert!(!stats.apply_completed_trip(&trip, today(), "later"));
        assert_eq!(stats.total_distance_km, 10.0);
    }

    #[test]
    fn test_trip_from_another_day_skips_today_total() {
        let mut stats = UserStats::default();
        let trip = completed_trip(5.0);
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();

        stats.apply_completed_trip(&trip, other_day, "now");
        assert_eq!(stats.total_distance_km, 5.0);
        assert_eq!(stats.today_distance_km, 0.0);
    }

    #[test]
    fn test_remove_trip_clamps_at_zero() {
        let mut stats = UserStats {
            total_distance_km: 3.0,
            today_distance_km: 1.0,
            ..Default::default()
        };
        let trip = completed_trip(5.0);
        stats.completed_trip_ids.insert(trip.id.clone());

        stats.remove_trip(&trip, today(), "now");
        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.today_distance_km, 0.0);
        assert!(!stats.completed_trip_ids.contains(&trip.id));
    }

    #[test]
    fn test_recompute_today_filters_by_start_date() {
        let mut stats = UserStats::default();
        let mut yesterday_trip = completed_trip(7.0);
        yesterday_trip.start_time = "2024-01-14T22:00:00Z".to_string();
        let today_trip = completed_trip(2.5);

        stats.recompute_today(&[yesterday_trip, today_trip], today());
        assert_eq!(stats.today_distance_km, 2.5);
    }

    #[test]
    fn test_recompute_last_mileage_latest_date_wins() {
        let mut stats = UserStats::default();
        let older = FuelEntry {
            id: "fuel-1".to_string(),
            date: "2024-01-10T10:00:00Z".to_string(),
            fuel_quantity_l: 5.0,
            distance_km: 100.0,
            mileage_km_per_l: 20.0,
        };
        let newer = FuelEntry {
            id: "fuel-2".to_string(),
            date: "2024-01-14T10:00:00Z".to_string(),
            fuel_quantity_l: 5.0,
            distance_km: 150.0,
            mileage_km_per_l: 30.0,
        };

        stats.recompute_last_mileage(&[newer.clone(), older.clone()], "now");
        assert_eq!(stats.last_mileage_km_per_l, 30.0);

        // Date tie: the later element in the list wins
        let tie = FuelEntry {
            mileage_km_per_l: 25.0,
            id: "fuel-3".to_string(),
            ..newer.clone()
        };
        stats.recompute_last_mileage(&[newer, tie], "now");
        assert_eq!(stats.last_mileage_km_per_l, 25.0);

        stats.recompute_last_mileage(&[], "now");
        assert_eq!(stats.last_mileage_km_per_l, 0.0);
    }
}
