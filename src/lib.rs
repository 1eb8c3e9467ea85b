// SPDX-License-Identifier: MIT

//! BikeMate core: GPS ride tracking, fuel mileage, and ride statistics.
//!
//! The crate records trips from a stream of GPS fixes, accumulating a
//! monotonically growing distance and average speed, and mirrors the active
//! trip into a durable storage slot after every mutation so it survives
//! process death. A foreground tracker and a background sample appender
//! write to that slot independently; each performs read-modify-write against
//! the stored snapshot rather than trusting its own cached copy.
//!
//! Screens, notification display, reverse geocoding, and the platform
//! key-value store are external collaborators consumed through the
//! capability traits in [`services`] and [`store::kv`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;
pub mod tracking;

pub use error::{AppError, Result};
pub use tracking::{BackgroundAppender, TripTracker};
