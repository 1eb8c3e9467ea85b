// SPDX-License-Identifier: MIT

//! Fuel fill-up records for mileage tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::time_utils;

/// One fuel fill-up with the distance covered since the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEntry {
    pub id: String,
    /// Entry instant (RFC3339).
    pub date: String,
    pub fuel_quantity_l: f64,
    pub distance_km: f64,
    /// Computed km per liter.
    pub mileage_km_per_l: f64,
}

impl FuelEntry {
    /// Build an entry, computing mileage from the raw values.
    /// Inputs are validated at the tracker boundary before this is called.
    pub fn new(now: DateTime<Utc>, fuel_quantity_l: f64, distance_km: f64) -> Self {
        Self {
            id: next_fuel_id(now),
            date: time_utils::format_utc_rfc3339(now),
            fuel_quantity_l,
            distance_km,
            mileage_km_per_l: distance_km / fuel_quantity_l,
        }
    }
}

static FUEL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a fuel-entry id from the wall clock plus a process-local
/// sequence. The timestamp alone collides when two entries are created
/// within the same millisecond.
fn next_fuel_id(now: DateTime<Utc>) -> String {
    let seq = FUEL_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("fuel-{}-{}", now.timestamp_millis(), seq)
}
