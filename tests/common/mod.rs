// SPDX-License-Identifier: MIT

use bikemate::models::GeoSample;
use bikemate::services::{FixedGeocoder, NotificationPresenter};
use bikemate::store::{MemoryStore, TripStore};
use bikemate::{Result, TripTracker};
use std::sync::{Arc, Mutex};

/// Notification double that records the effects it was asked for.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    #[allow(dead_code)]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }
}

impl NotificationPresenter for RecordingNotifier {
    async fn show(&self, _trip: &bikemate::models::Trip) -> Result<()> {
        self.push("show");
        Ok(())
    }

    async fn update(&self, _trip: &bikemate::models::Trip) -> Result<()> {
        self.push("update");
        Ok(())
    }

    async fn dismiss(&self) -> Result<()> {
        self.push("dismiss");
        Ok(())
    }
}

pub type TestTracker = TripTracker<MemoryStore, RecordingNotifier, FixedGeocoder>;

/// A hydrated tracker over a fresh in-memory store, plus handles to the
/// store and notifier for inspection.
#[allow(dead_code)]
pub async fn test_tracker() -> (TestTracker, TripStore<MemoryStore>, RecordingNotifier) {
    let store = TripStore::new(MemoryStore::new());
    let notifier = RecordingNotifier::default();
    let mut tracker = TripTracker::new(
        store.clone(),
        notifier.clone(),
        FixedGeocoder::new("MG Road, Bengaluru"),
        0.1,
    );
    tracker.hydrate().await.expect("hydrate should succeed");
    (tracker, store, notifier)
}

/// Build a GPS fix. `speed` is in m/s.
#[allow(dead_code)]
pub fn sample(lat: f64, lon: f64, t_ms: i64, speed: Option<f64>) -> GeoSample {
    GeoSample {
        latitude: lat,
        longitude: lon,
        timestamp_ms: t_ms,
        speed_mps: speed,
        altitude: None,
    }
}
