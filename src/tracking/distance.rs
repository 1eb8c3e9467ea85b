// SPDX-License-Identifier: MIT

//! Distance accumulation over a GPS sample stream.
//!
//! Pure functions only; safe to call from any execution context.

use geo::{Distance, Haversine, Point};

use crate::models::GeoSample;

/// Result of folding one sample into an existing history.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulation {
    /// Great-circle distance from the previous sample, in kilometers.
    /// Zero when the history was empty.
    pub distance_delta_km: f64,
    /// Mean of positive sample speeds over the updated history, in km/h.
    pub avg_speed_kmh: f64,
    /// The history with the incoming sample appended.
    pub history: Vec<GeoSample>,
}

/// Fold `incoming` into `history`.
///
/// Implausible jumps between consecutive fixes are accumulated as-is; there
/// is no plausibility filter on the delta.
pub fn accumulate(mut history: Vec<GeoSample>, incoming: GeoSample) -> Accumulation {
    let distance_delta_km = history
        .last()
        .map(|last| haversine_km(last, &incoming))
        .unwrap_or(0.0);
    history.push(incoming);

    Accumulation {
        distance_delta_km,
        avg_speed_kmh: average_speed_kmh(&history),
        history,
    }
}

/// Haversine great-circle distance between two fixes, in kilometers.
pub fn haversine_km(a: &GeoSample, b: &GeoSample) -> f64 {
    let meters = Haversine.distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    );
    meters / 1000.0
}

/// Mean speed in km/h over samples carrying a positive speed.
///
/// Samples with a missing or zero speed are excluded from both numerator
/// and denominator, not treated as zero.
pub fn average_speed_kmh(samples: &[GeoSample]) -> f64 {
    let speeds: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.speed_mps)
        .filter(|mps| *mps > 0.0)
        .map(|mps| mps * 3.6)
        .collect();
    if speeds.is_empty() {
        return 0.0;
    }
    speeds.iter().sum::<f64>() / speeds.len() as f64
}

/// Total distance of a sample sequence: the sum of consecutive-pair
/// haversine distances, in kilometers.
pub fn replay_distance_km(samples: &[GeoSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| haversine_km(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_first_sample_contributes_zero_delta() {
        let result = accumulate(Vec::new(), sample(12.97, 77.59, 0, Some(5.0)));
        assert_eq!(result.distance_delta_km, 0.0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_delta_matches_haversine_of_last_pair() {
        let a = sample(12.97, 77.59, 0, None);
        let b = sample(12.971, 77.59, 5_000, None);
        let expected = haversine_km(&a, &b);

        let result = accumulate(vec![a], b);
        assert_eq!(result.distance_delta_km, expected);
        // 0.001 deg of latitude is roughly 111 m
        assert!((result.distance_delta_km - 0.111).abs() < 0.005);
    }

    #[test]
    fn test_identical_coordinates_contribute_exactly_zero() {
        let a = sample(12.97, 77.59, 0, Some(3.0));
        let b = sample(12.97, 77.59, 5_000, Some(3.0));

        let result = accumulate(vec![a], b);
        assert_eq!(result.distance_delta_km, 0.0);
    }

    #[test]
    fn test_accumulated_deltas_equal_replay() {
        let samples = vec![
            sample(12.9700, 77.5900, 0, Some(4.0)),
            sample(12.9705, 77.5903, 5_000, Some(6.0)),
            sample(12.9712, 77.5911, 10_000, Some(8.0)),
            sample(12.9712, 77.5911, 15_000, Some(0.0)),
            sample(12.9720, 77.5921, 20_000, Some(7.0)),
        ];

        let mut history = Vec::new();
        let mut total = 0.0;
        for s in &samples {
            let result = accumulate(history, s.clone());
            total += result.distance_delta_km;
            history = result.history;
        }

        assert!((total - replay_distance_km(&samples)).abs() < 1e-12);
        assert_eq!(history, samples);
    }

    #[test]
    fn test_average_speed_excludes_missing_and_zero() {
        let samples = vec![
            sample(0.0, 0.0, 0, Some(10.0)),
            sample(0.0, 0.0, 1, None),
            sample(0.0, 0.0, 2, Some(0.0)),
            sample(0.0, 0.0, 3, Some(20.0)),
        ];
        // Mean of 10 and 20 m/s, converted to km/h
        assert_eq!(average_speed_kmh(&samples), 15.0 * 3.6);
    }

    #[test]
    fn test_average_speed_of_speedless_history_is_zero() {
        let samples = vec![sample(0.0, 0.0, 0, None), sample(0.0, 0.0, 1, Some(0.0))];
        assert_eq!(average_speed_kmh(&samples), 0.0);
    }
}
