// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::services::{Accuracy, SubscriptionOptions};

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory backing the JSON file store.
    pub storage_dir: PathBuf,
    /// Deliver a location sample at most every this many milliseconds.
    pub min_interval_ms: u64,
    /// ...or whenever the position moved this many meters.
    pub min_distance_m: f64,
    /// Minimum distance gain (km) between progress-notice updates.
    pub notify_increment_km: f64,
    /// Foreground duration/notice tick period.
    pub refresh_interval_ms: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("bikemate-data"),
            min_interval_ms: 5_000,
            min_distance_m: 10.0,
            notify_increment_km: 0.1,
            refresh_interval_ms: 1_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        let config = Self {
            storage_dir: env::var("BIKEMATE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            min_interval_ms: parse_env("BIKEMATE_MIN_INTERVAL_MS", defaults.min_interval_ms),
            min_distance_m: parse_env("BIKEMATE_MIN_DISTANCE_M", defaults.min_distance_m),
            notify_increment_km: parse_env(
                "BIKEMATE_NOTIFY_INCREMENT_KM",
                defaults.notify_increment_km,
            ),
            refresh_interval_ms: parse_env(
                "BIKEMATE_REFRESH_INTERVAL_MS",
                defaults.refresh_interval_ms,
            ),
        };

        if config.notify_increment_km <= 0.0 {
            return Err(ConfigError::Invalid(
                "BIKEMATE_NOTIFY_INCREMENT_KM must be positive",
            ));
        }
        Ok(config)
    }

    /// Location subscription options derived from the gates above.
    pub fn subscription_options(&self) -> SubscriptionOptions {
        SubscriptionOptions {
            accuracy: Accuracy::BestForNavigation,
            min_interval_ms: self.min_interval_ms,
            min_distance_m: self.min_distance_m,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_subscription_gates() {
        let config = Config::default();
        let options = config.subscription_options();

        assert_eq!(options.min_interval_ms, 5_000);
        assert_eq!(options.min_distance_m, 10.0);
        assert_eq!(config.notify_increment_km, 0.1);
    }

    #[test]
    fn test_config_from_env_overrides() {
        env::set_var("BIKEMATE_MIN_DISTANCE_M", "25.5");
        env::set_var("BIKEMATE_MIN_INTERVAL_MS", "not-a-number");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.min_distance_m, 25.5);
        // Unparseable values fall back to the default
        assert_eq!(config.min_interval_ms, 5_000);

        env::remove_var("BIKEMATE_MIN_DISTANCE_M");
        env::remove_var("BIKEMATE_MIN_INTERVAL_MS");
    }
}
