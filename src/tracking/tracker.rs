// SPDX-License-Identifier: MIT

//! Trip lifecycle state machine.
//!
//! `TripTracker` is the foreground consumer: it owns the canonical in-memory
//! view of the active trip and is the sole writer of lifecycle transitions.
//! Every transition mirrors the full trip snapshot into the durable slot,
//! and every periodic read goes back to the slot first, because a background
//! appender may have written samples since the tracker last looked.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{FuelEntry, GeoPoint, GeoSample, Reminder, Trip, UserStats};
use crate::services::{Geocoder, NotificationPresenter};
use crate::store::kv::KeyValueStore;
use crate::store::TripStore;
use crate::time_utils;

/// Foreground trip state container.
///
/// Constructed once at app start, hydrated from durable storage, and kept
/// for the process lifetime. Collaborators are injected; nothing here is a
/// process-wide singleton.
pub struct TripTracker<S, N, G>
where
    S: KeyValueStore,
    N: NotificationPresenter,
    G: Geocoder,
{
    store: TripStore<S>,
    notifier: N,
    geocoder: G,
    /// Minimum distance gain (km) between two notification updates.
    notify_increment_km: f64,

    active: Option<Trip>,
    trips: Vec<Trip>,
    fuel_entries: Vec<FuelEntry>,
    reminders: Vec<Reminder>,
    stats: UserStats,
    /// Distance at which the notice was last refreshed.
    last_notified_km: f64,
}

impl<S, N, G> TripTracker<S, N, G>
where
    S: KeyValueStore,
    N: NotificationPresenter,
    G: Geocoder,
{
    pub fn new(store: TripStore<S>, notifier: N, geocoder: G, notify_increment_km: f64) -> Self {
        Self {
            store,
            notifier,
            geocoder,
            notify_increment_km,
            active: None,
            trips: Vec::new(),
            fuel_entries: Vec::new(),
            reminders: Vec::new(),
            stats: UserStats::default(),
            last_notified_km: 0.0,
        }
    }

    /// Rehydrate all state from durable storage.
    ///
    /// The durable slot is the sole source of truth for the active trip; the
    /// in-memory view is rebuilt from it, never the other way around. Runs
    /// crash recovery for an interrupted completion first.
    pub async fn hydrate(&mut self) -> Result<()> {
        let now = Utc::now();
        let today = now.date_naive();
        let now_str = time_utils::format_utc_rfc3339(now);

        self.store.reconcile_on_start(today, &now_str).await?;

        let (trips, fuel_entries, reminders, mut stats, active) = tokio::try_join!(
            self.store.load_trips(),
            self.store.load_fuel_entries(),
            self.store.load_reminders(),
            self.store.load_stats(),
            self.store.load_active_trip(),
        )?;

        stats.recompute_today(&trips, today);
        self.store.save_stats(&stats).await?;

        tracing::info!(
            trips = trips.len(),
            fuel_entries = fuel_entries.len(),
            active = active.is_some(),
            "State hydrated from storage"
        );

        self.last_notified_km = active.as_ref().map(|t| t.distance_km).unwrap_or(0.0);
        self.trips = trips;
        self.fuel_entries = fuel_entries;
        self.reminders = reminders;
        self.stats = stats;
        self.active = active;
        Ok(())
    }

    // ─── Lifecycle Transitions ───────────────────────────────────

    /// Start a new trip. Idempotent: if a trip is already active (in memory
    /// or in the durable slot), nothing changes and its id is returned.
    ///
    /// The slot is written before this returns, so a background task started
    /// concurrently never finds it empty for an already-started trip.
    pub async fn start_trip(&mut self, hint: Option<GeoPoint>) -> Result<String> {
        if let Some(active) = &self.active {
            tracing::debug!(trip_id = %active.id, "Trip already active; start ignored");
            return Ok(active.id.clone());
        }
        // Re-read the slot rather than trusting memory: another context may
        // already hold an active trip.
        if let Some(existing) = self.store.load_active_trip().await? {
            tracing::debug!(trip_id = %existing.id, "Adopting active trip from storage");
            let id = existing.id.clone();
            self.last_notified_km = existing.distance_km;
            self.active = Some(existing);
            return Ok(id);
        }

        let mut trip = Trip::new_active(Utc::now());
        trip.start_location = hint;
        if let Some(point) = &hint {
            trip.start_address = self.lookup_address(point).await;
        }

        self.store.save_active_trip(&trip).await?;
        tracing::info!(trip_id = %trip.id, "Trip started");

        if let Err(err) = self.notifier.show(&trip).await {
            tracing::warn!(error = %err, "Progress notice failed to show");
        }

        let id = trip.id.clone();
        self.last_notified_km = 0.0;
        self.active = Some(trip);
        Ok(id)
    }

    /// Fold one GPS sample into the active trip.
    ///
    /// Silently dropped while idle: the producer may outlive this tracker's
    /// awareness of a stop, and correctness rests on the durable slot, not
    /// on strict rejection. The write is a read-modify-write against the
    /// slot, so samples appended by the background context are never lost.
    pub async fn record_sample(&mut self, sample: GeoSample) -> Result<()> {
        let Some(expected_id) = self.active.as_ref().map(|t| t.id.clone()) else {
            tracing::debug!("No active trip; sample dropped");
            return Ok(());
        };

        // Sample writes are best-effort: a storage failure loses one delta,
        // not the trip. User-initiated operations still propagate errors.
        match self
            .store
            .append_sample_to_slot(Some(&expected_id), sample)
            .await
        {
            Ok(Some(updated)) => {
                self.maybe_update_notice(&updated).await;
                self.active = Some(updated);
            }
            Ok(None) => self.resync_from_slot().await?,
            Err(err) => {
                tracing::warn!(trip_id = %expected_id, error = %err, "Sample write failed");
            }
        }
        Ok(())
    }

    /// Periodic foreground tick.
    ///
    /// Re-reads the slot instead of recomputing from the in-memory copy,
    /// which would silently diverge from background-appended distance. Then
    /// refreshes the derived duration and the progress notice.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(expected_id) = self.active.as_ref().map(|t| t.id.clone()) else {
            return Ok(());
        };

        match self.store.load_active_trip().await? {
            None => {
                tracing::debug!(trip_id = %expected_id, "Slot empty; trip stopped elsewhere");
                self.active = None;
            }
            Some(mut trip) => {
                if trip.id != expected_id {
                    tracing::warn!(
                        expected = %expected_id,
                        slot_trip = %trip.id,
                        "Slot holds a different trip; adopting it"
                    );
                    self.last_notified_km = trip.distance_km;
                    self.active = Some(trip);
                    return Ok(());
                }
                trip.duration_sec = time_utils::elapsed_secs(&trip.start_time, Utc::now());
                self.store.save_active_trip(&trip).await?;
                self.maybe_update_notice(&trip).await;
                self.active = Some(trip);
            }
        }
        Ok(())
    }

    /// Stop the active trip. No-op while idle.
    ///
    /// Freezes the trip, then completes it through the durable protocol:
    /// history append and stats become durable before the slot clears.
    /// Returns the frozen trip, or `None` if there was nothing to stop.
    pub async fn stop_trip(&mut self, hint: Option<GeoPoint>) -> Result<Option<Trip>> {
        let Some(in_memory) = self.active.take() else {
            tracing::debug!("No active trip; stop ignored");
            return Ok(None);
        };

        // Final re-read: the background context may have appended samples
        // after this tracker last looked at the slot.
        let mut frozen = self
            .store
            .load_active_trip()
            .await?
            .filter(|slot| slot.id == in_memory.id)
            .unwrap_or(in_memory);

        let now = Utc::now();
        frozen.end_time = Some(time_utils::format_utc_rfc3339(now));
        frozen.duration_sec = time_utils::elapsed_secs(&frozen.start_time, now);
        frozen.is_active = false;
        frozen.avg_speed_kmh = super::distance::average_speed_kmh(&frozen.locations);
        frozen.end_location = hint;
        if let Some(point) = &hint {
            frozen.end_address = self.lookup_address(point).await;
        }

        let (trips, stats) = self
            .store
            .finish_trip(
                &frozen,
                now.date_naive(),
                &time_utils::format_utc_rfc3339(now),
            )
            .await?;
        self.trips = trips;
        self.stats = stats;
        self.last_notified_km = 0.0;

        if let Err(err) = self.notifier.dismiss().await {
            tracing::warn!(error = %err, "Progress notice failed to dismiss");
        }

        Ok(Some(frozen))
    }

    /// Record a manually entered distance as an already-completed trip.
    /// Legal in any state; the active trip (if one exists) is untouched.
    pub async fn add_manual_trip(&mut self, distance_km: f64) -> Result<Trip> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Manual distance must be positive, got {distance_km}"
            )));
        }

        let now = Utc::now();
        let trip = Trip::new_manual(now, distance_km);
        let (trips, stats) = self
            .store
            .record_completed_trip(
                &trip,
                now.date_naive(),
                &time_utils::format_utc_rfc3339(now),
            )
            .await?;
        self.trips = trips;
        self.stats = stats;

        tracing::info!(trip_id = %trip.id, distance_km, "Manual trip recorded");
        Ok(trip)
    }

    /// Delete a completed trip and reverse its contribution to the totals,
    /// clamped at zero. Returns `false` if no such trip exists.
    pub async fn delete_trip(&mut self, id: &str) -> Result<bool> {
        // User-initiated: work from fresh durable state and let storage
        // failures surface.
        let mut trips = self.store.load_trips().await?;
        let Some(index) = trips.iter().position(|t| t.id == id) else {
            tracing::debug!(trip_id = %id, "Delete ignored; trip not found");
            return Ok(false);
        };
        let removed = trips.remove(index);
        self.store.save_trips(&trips).await?;

        let now = Utc::now();
        let mut stats = self.store.load_stats().await?;
        stats.remove_trip(
            &removed,
            now.date_naive(),
            &time_utils::format_utc_rfc3339(now),
        );
        self.store.save_stats(&stats).await?;

        tracing::info!(trip_id = %id, distance_km = removed.distance_km, "Trip deleted");
        self.trips = trips;
        self.stats = stats;
        Ok(true)
    }

    // ─── Fuel Entries ────────────────────────────────────────────

    /// Add a fuel fill-up and update the last-mileage stat.
    pub async fn add_fuel_entry(
        &mut self,
        fuel_quantity_l: f64,
        distance_km: f64,
    ) -> Result<FuelEntry> {
        if !fuel_quantity_l.is_finite() || fuel_quantity_l <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Fuel quantity must be positive, got {fuel_quantity_l}"
            )));
        }
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Distance must be positive, got {distance_km}"
            )));
        }

        let now = Utc::now();
        let entry = FuelEntry::new(now, fuel_quantity_l, distance_km);

        let mut entries = self.store.load_fuel_entries().await?;
        entries.push(entry.clone());
        self.store.save_fuel_entries(&entries).await?;

        let mut stats = self.store.load_stats().await?;
        stats.record_mileage(
            entry.mileage_km_per_l,
            &time_utils::format_utc_rfc3339(now),
        );
        self.store.save_stats(&stats).await?;

        tracing::info!(
            entry_id = %entry.id,
            mileage = entry.mileage_km_per_l,
            "Fuel entry added"
        );
        self.fuel_entries = entries;
        self.stats = stats;
        Ok(entry)
    }

    /// Delete a fuel entry. The last-mileage stat is fully recomputed from
    /// the remaining entries rather than adjusted incrementally.
    pub async fn delete_fuel_entry(&mut self, id: &str) -> Result<bool> {
        let mut entries = self.store.load_fuel_entries().await?;
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            tracing::debug!(entry_id = %id, "Delete ignored; fuel entry not found");
            return Ok(false);
        };
        entries.remove(index);
        self.store.save_fuel_entries(&entries).await?;

        let mut stats = self.store.load_stats().await?;
        stats.recompute_last_mileage(&entries, &time_utils::format_utc_rfc3339(Utc::now()));
        self.store.save_stats(&stats).await?;

        self.fuel_entries = entries;
        self.stats = stats;
        Ok(true)
    }

    // ─── Read Accessors ──────────────────────────────────────────

    pub fn active_trip(&self) -> Option<&Trip> {
        self.active.as_ref()
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn fuel_entries(&self) -> &[FuelEntry] {
        &self.fuel_entries
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Handle to the durable store, for wiring up a background appender.
    pub fn store(&self) -> TripStore<S> {
        self.store.clone()
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// Best-effort address lookup: failure degrades to no address.
    async fn lookup_address(&self, point: &GeoPoint) -> Option<String> {
        match self
            .geocoder
            .resolve_address(point.latitude, point.longitude)
            .await
        {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!(error = %err, "Address lookup failed");
                None
            }
        }
    }

    /// Update the progress notice at most once per distance increment.
    async fn maybe_update_notice(&mut self, trip: &Trip) {
        if trip.distance_km - self.last_notified_km < self.notify_increment_km {
            return;
        }
        if let Err(err) = self.notifier.update(trip).await {
            tracing::warn!(error = %err, "Progress notice failed to update");
        }
        self.last_notified_km = trip.distance_km;
    }

    /// The in-memory view lost track of the slot (emptied or replaced by
    /// another context); rebuild it from storage.
    async fn resync_from_slot(&mut self) -> Result<()> {
        let slot = self.store.load_active_trip().await?;
        if let Some(trip) = &slot {
            self.last_notified_km = trip.distance_km;
        }
        self.active = slot;
        Ok(())
    }
}
