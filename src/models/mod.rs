// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod fuel;
pub mod reminder;
pub mod stats;
pub mod trip;

pub use fuel::FuelEntry;
pub use reminder::{Reminder, ReminderTrigger};
pub use stats::UserStats;
pub use trip::{GeoPoint, GeoSample, Trip};
