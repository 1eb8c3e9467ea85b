// SPDX-License-Identifier: MIT

//! BikeMate demo runner.
//!
//! Replays a simulated ride through the full stack: file-backed storage,
//! a background sample appender, periodic foreground refresh ticks, and a
//! restart rehydration at the end.

use bikemate::config::Config;
use bikemate::models::{GeoPoint, GeoSample};
use bikemate::services::{LogNotifier, NullGeocoder, SimulatedLocationSource};
use bikemate::store::{JsonFileStore, TripStore};
use bikemate::{BackgroundAppender, TripTracker};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(storage_dir = %config.storage_dir.display(), "Starting BikeMate demo");

    let kv = JsonFileStore::open(&config.storage_dir).await?;
    let store = TripStore::new(kv);

    let mut tracker = TripTracker::new(
        store.clone(),
        LogNotifier,
        NullGeocoder,
        config.notify_increment_km,
    );
    tracker.hydrate().await?;

    // Start a ride from a fixed position hint.
    let start = GeoPoint {
        latitude: 12.9716,
        longitude: 77.5946,
    };
    let trip_id = tracker.start_trip(Some(start)).await?;

    // Background context: simulated GPS track delivered through a channel.
    let rx = SimulatedLocationSource::new(demo_track(start, 24), config.subscription_options())
        .subscribe(std::time::Duration::from_millis(50));
    let background = BackgroundAppender::new(store.clone(), trip_id).spawn(rx);

    // Foreground context: periodic duration/notice ticks while the
    // background appender writes samples.
    let mut ticks =
        tokio::time::interval(std::time::Duration::from_millis(config.refresh_interval_ms));
    while !background.is_finished() {
        ticks.tick().await;
        tracker.refresh().await?;
    }
    background.await.expect("Background task panicked");
    tracker.refresh().await?;

    let frozen = tracker
        .stop_trip(None)
        .await?
        .expect("Trip should have been active");
    tracing::info!(
        distance_km = frozen.distance_km,
        duration_sec = frozen.duration_sec,
        avg_speed_kmh = frozen.avg_speed_kmh,
        "Ride finished"
    );

    // Simulated process restart: a fresh tracker over the same storage.
    let mut restarted = TripTracker::new(
        store,
        LogNotifier,
        NullGeocoder,
        config.notify_increment_km,
    );
    restarted.hydrate().await?;
    tracing::info!(
        trips = restarted.trips().len(),
        total_distance_km = restarted.stats().total_distance_km,
        today_distance_km = restarted.stats().today_distance_km,
        "State after restart"
    );

    Ok(())
}

/// Synthetic track heading north from `start`: one fix every 5 seconds at
/// roughly 11 m/s, ~55 m apart.
fn demo_track(start: GeoPoint, count: usize) -> Vec<GeoSample> {
    let t0 = chrono::Utc::now().timestamp_millis();
    (0..count)
        .map(|i| GeoSample {
            latitude: start.latitude + 0.0005 * i as f64,
            longitude: start.longitude,
            timestamp_ms: t0 + (i as i64) * 5_000,
            speed_mps: Some(11.0),
            altitude: Some(920.0),
        })
        .collect()
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bikemate=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
