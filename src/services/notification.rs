// SPDX-License-Identifier: MIT

//! Progress-notice capability.
//!
//! The platform notification mechanism lives outside this crate; the core
//! only requests show/update/dismiss effects with a trip snapshot. All three
//! are idempotent. The tracker bounds `update` calls to one per meaningful
//! distance increment.

use std::future::Future;

use crate::error::Result;
use crate::models::Trip;
use crate::time_utils::format_duration;

pub trait NotificationPresenter: Send + Sync {
    fn show(&self, trip: &Trip) -> impl Future<Output = Result<()>> + Send;
    fn update(&self, trip: &Trip) -> impl Future<Output = Result<()>> + Send;
    fn dismiss(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Render the notice body for a trip snapshot.
pub fn progress_body(trip: &Trip) -> String {
    let speed = if trip.avg_speed_kmh > 0.0 {
        format!("{:.1} km/h", trip.avg_speed_kmh)
    } else {
        "Calculating...".to_string()
    };
    format!(
        "Distance: {:.2} km | Time: {} | Speed: {}",
        trip.distance_km,
        format_duration(trip.duration_sec),
        speed
    )
}

/// Presenter that writes the notice to the log. Used by the demo binary.
#[derive(Clone, Default)]
pub struct LogNotifier;

impl NotificationPresenter for LogNotifier {
    async fn show(&self, trip: &Trip) -> Result<()> {
        tracing::info!(trip_id = %trip.id, body = %progress_body(trip), "Ride in progress");
        Ok(())
    }

    async fn update(&self, trip: &Trip) -> Result<()> {
        tracing::info!(trip_id = %trip.id, body = %progress_body(trip), "Ride progress");
        Ok(())
    }

    async fn dismiss(&self) -> Result<()> {
        tracing::info!("Ride notice dismissed");
        Ok(())
    }
}

/// Presenter that does nothing.
#[derive(Clone, Default)]
pub struct NullNotifier;

impl NotificationPresenter for NullNotifier {
    async fn show(&self, _trip: &Trip) -> Result<()> {
        Ok(())
    }

    async fn update(&self, _trip: &Trip) -> Result<()> {
        Ok(())
    }

    async fn dismiss(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trip;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_progress_body_formats_snapshot() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut trip = Trip::new_active(now);
        trip.distance_km = 3.456;
        trip.duration_sec = 3661;
        trip.avg_speed_kmh = 21.25;

        assert_eq!(
            progress_body(&trip),
            "Distance: 3.46 km | Time: 01:01:01 | Speed: 21.2 km/h"
        );
    }

    #[test]
    fn test_progress_body_without_speed() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let trip = Trip::new_active(now);
        assert!(progress_body(&trip).ends_with("Speed: Calculating..."));
    }
}
