// SPDX-License-Identifier: MIT

//! Durable trip store: typed operations over the key-value capability plus
//! the reconciliation protocol for the single active-trip slot.
//!
//! Two independent writers touch the `activeTrip` slot: the foreground
//! tracker and a background sample appender running in a separate task with
//! no shared memory. Every writer follows read-modify-write against the
//! durable snapshot instead of trusting a cached copy, because the other
//! side may have written since its last read. There is no merge step; the
//! alternation discipline is what keeps last-write-wins safe.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{FuelEntry, GeoSample, Reminder, Trip, UserStats};
use crate::store::keys;
use crate::store::kv::KeyValueStore;
use crate::tracking::distance;

/// Typed view over the key-value store. Cheap to clone; clones share the
/// underlying store.
#[derive(Clone)]
pub struct TripStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> TripStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Decode the blob under `key`. A malformed blob is discarded (logged)
    /// rather than surfaced as an error: the store fails open to "absent".
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv.get(key).await? {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    tracing::warn!(key, error = %err, "Discarding malformed snapshot");
                    Ok(None)
                }
            },
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode {key}: {e}")))?;
        self.kv.set(key, raw).await
    }

    // ─── Active-Trip Slot ────────────────────────────────────────

    pub async fn load_active_trip(&self) -> Result<Option<Trip>> {
        self.get_json(keys::ACTIVE_TRIP).await
    }

    /// Mirror the full active-trip snapshot (including locations) into the
    /// durable slot.
    pub async fn save_active_trip(&self, trip: &Trip) -> Result<()> {
        self.set_json(keys::ACTIVE_TRIP, trip).await
    }

    pub async fn clear_active_trip(&self) -> Result<()> {
        self.kv.remove(keys::ACTIVE_TRIP).await
    }

    /// Read-modify-write one sample into the slot.
    ///
    /// An empty slot drops the sample: a background producer may outlive the
    /// foreground tracker's awareness of a stop. When `expected_trip_id` is
    /// given, a slot holding a different trip also drops the sample, so a
    /// late delivery from a previous trip never lands in a new one.
    pub async fn append_sample_to_slot(
        &self,
        expected_trip_id: Option<&str>,
        sample: GeoSample,
    ) -> Result<Option<Trip>> {
        let Some(mut trip) = self.load_active_trip().await? else {
            tracing::debug!("No active trip in slot; sample dropped");
            return Ok(None);
        };
        if let Some(expected) = expected_trip_id {
            if trip.id != expected {
                tracing::debug!(
                    expected,
                    slot_trip = %trip.id,
                    "Stale sample delivery dropped"
                );
                return Ok(None);
            }
        }

        let result = distance::accumulate(std::mem::take(&mut trip.locations), sample);
        trip.distance_km += result.distance_delta_km;
        trip.avg_speed_kmh = result.avg_speed_kmh;
        trip.locations = result.history;

        self.save_active_trip(&trip).await?;
        Ok(Some(trip))
    }

    // ─── Trip History ────────────────────────────────────────────

    pub async fn load_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.get_json(keys::TRIPS).await?.unwrap_or_default())
    }

    pub async fn save_trips(&self, trips: &[Trip]) -> Result<()> {
        self.set_json(keys::TRIPS, &trips).await
    }

    // ─── Stats / Fuel / Reminders ────────────────────────────────

    pub async fn load_stats(&self) -> Result<UserStats> {
        Ok(self.get_json(keys::USER_STATS).await?.unwrap_or_default())
    }

    pub async fn save_stats(&self, stats: &UserStats) -> Result<()> {
        self.set_json(keys::USER_STATS, stats).await
    }

    pub async fn load_fuel_entries(&self) -> Result<Vec<FuelEntry>> {
        Ok(self.get_json(keys::FUEL_ENTRIES).await?.unwrap_or_default())
    }

    pub async fn save_fuel_entries(&self, entries: &[FuelEntry]) -> Result<()> {
        self.set_json(keys::FUEL_ENTRIES, &entries).await
    }

    pub async fn load_reminders(&self) -> Result<Vec<Reminder>> {
        Ok(self.get_json(keys::REMINDERS).await?.unwrap_or_default())
    }

    pub async fn save_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        self.set_json(keys::REMINDERS, &reminders).await
    }

    // ─── Completion Protocol ─────────────────────────────────────

    /// Durably append a completed trip to history and fold it into the
    /// stats, both idempotently by trip id.
    ///
    /// Does not touch the active slot; manual entries use this directly.
    /// Returns the updated history and stats.
    pub async fn record_completed_trip(
        &self,
        trip: &Trip,
        today: NaiveDate,
        now: &str,
    ) -> Result<(Vec<Trip>, UserStats)> {
        let mut trips = self.load_trips().await?;
        if !trips.iter().any(|t| t.id == trip.id) {
            trips.push(trip.clone());
            self.save_trips(&trips).await?;
        }

        let mut stats = self.load_stats().await?;
        if stats.apply_completed_trip(trip, today, now) {
            self.save_stats(&stats).await?;
        }

        Ok((trips, stats))
    }

    /// Complete the active trip: history append and stats become durable
    /// BEFORE the slot clears. A crash between the two steps leaves the
    /// completed trip recoverable by `reconcile_on_start`, never lost.
    pub async fn finish_trip(
        &self,
        frozen: &Trip,
        today: NaiveDate,
        now: &str,
    ) -> Result<(Vec<Trip>, UserStats)> {
        let (trips, stats) = self.record_completed_trip(frozen, today, now).await?;
        self.clear_active_trip().await?;
        tracing::info!(
            trip_id = %frozen.id,
            distance_km = frozen.distance_km,
            "Trip completed and slot cleared"
        );
        Ok((trips, stats))
    }

    /// Crash recovery for the completion gap.
    ///
    /// If the process died between the history append and the slot clear,
    /// the slot still holds a trip whose id is already in history. That trip
    /// is finished again through the idempotent path (no double count) and
    /// the slot is cleared, instead of being resumed as active.
    pub async fn reconcile_on_start(&self, today: NaiveDate, now: &str) -> Result<()> {
        let Some(slot) = self.load_active_trip().await? else {
            return Ok(());
        };

        let trips = self.load_trips().await?;
        let already_completed = !slot.is_active || trips.iter().any(|t| t.id == slot.id);
        if already_completed {
            tracing::warn!(trip_id = %slot.id, "Recovering interrupted trip completion");
            let mut frozen = slot;
            frozen.is_active = false;
            if frozen.end_time.is_none() {
                // Best effort: the real stop instant was lost with the crash.
                frozen.end_time = Some(now.to_string());
            }
            self.finish_trip(&frozen, today, now).await?;
        }
        Ok(())
    }
}
