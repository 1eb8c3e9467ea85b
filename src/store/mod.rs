// SPDX-License-Identifier: MIT

//! Durable storage layer.

pub mod kv;
pub mod trip_store;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use trip_store::TripStore;

/// Storage key names as constants.
pub mod keys {
    pub const TRIPS: &str = "trips";
    pub const FUEL_ENTRIES: &str = "fuelEntries";
    pub const REMINDERS: &str = "reminders";
    pub const USER_STATS: &str = "userStats";
    /// The durable slot mirroring the single active trip.
    pub const ACTIVE_TRIP: &str = "activeTrip";
}
