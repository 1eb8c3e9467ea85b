// SPDX-License-Identifier: MIT

//! Location-stream capability.
//!
//! The platform GPS source is an external collaborator: a lazy, infinite,
//! non-restartable sequence of samples, deliverable even while the consumer
//! is suspended. Unsubscribing is dropping the receiver's sender side.
//!
//! `SimulatedLocationSource` replays a fixed track for the demo binary and
//! integration scenarios, honoring the same gating options a platform
//! subscription would take.

use tokio::sync::mpsc;

use crate::models::GeoSample;
use crate::tracking::distance;

/// Requested accuracy class, mirroring common platform tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Balanced,
    High,
    BestForNavigation,
}

/// Gates for a location subscription: deliver a new sample at most every
/// `min_interval_ms`, or whenever the position moved `min_distance_m`.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionOptions {
    pub accuracy: Accuracy,
    pub min_interval_ms: u64,
    pub min_distance_m: f64,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::BestForNavigation,
            min_interval_ms: 5_000,
            min_distance_m: 10.0,
        }
    }
}

/// Replays a pre-recorded track as a push-based sample stream.
pub struct SimulatedLocationSource {
    track: Vec<GeoSample>,
    options: SubscriptionOptions,
}

impl SimulatedLocationSource {
    pub fn new(track: Vec<GeoSample>, options: SubscriptionOptions) -> Self {
        Self { track, options }
    }

    /// Start delivering samples. `replay_interval` is the wall-clock delay
    /// between deliveries (the recorded timestamps are kept as-is), so a
    /// long ride can replay in milliseconds.
    pub fn subscribe(self, replay_interval: std::time::Duration) -> mpsc::Receiver<GeoSample> {
        let (tx, rx) = mpsc::channel(32);
        let min_distance_km = self.options.min_distance_m / 1000.0;

        tokio::spawn(async move {
            let mut last_sent: Option<GeoSample> = None;
            for sample in self.track {
                let moved_enough = last_sent
                    .as_ref()
                    .map(|prev| distance::haversine_km(prev, &sample) >= min_distance_km)
                    .unwrap_or(true);
                if !moved_enough {
                    continue;
                }
                last_sent = Some(sample.clone());
                if tx.send(sample).await.is_err() {
                    // Receiver dropped: the subscription was cancelled.
                    break;
                }
                tokio::time::sleep(replay_interval).await;
            }
            tracing::debug!("Simulated track exhausted");
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lat: f64, lon: f64, t_ms: i64) -> GeoSample {
        GeoSample {
            latitude: lat,
            longitude: lon,
            timestamp_ms: t_ms,
            speed_mps: Some(5.0),
            altitude: None,
        }
    }

    #[tokio::test]
    async fn test_distance_gate_drops_near_duplicates() {
        let track = vec![
            sample(12.9700, 77.59, 0),
            // ~1 m north of the first fix: below the 10 m gate
            sample(12.97001, 77.59, 5_000),
            // ~110 m north: passes
            sample(12.9710, 77.59, 10_000),
        ];
        let source = SimulatedLocationSource::new(track, SubscriptionOptions::default());
        let mut rx = source.subscribe(std::time::Duration::ZERO);

        let mut received = Vec::new();
        while let Some(s) = rx.recv().await {
            received.push(s);
        }

        assert_eq!(received.len(), 2);
        assert_eq!(received[0].timestamp_ms, 0);
        assert_eq!(received[1].timestamp_ms, 10_000);
    }
}
