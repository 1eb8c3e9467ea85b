// SPDX-License-Identifier: MIT

//! Capabilities consumed by the tracking core: progress notices, reverse
//! geocoding, and the location stream.

pub mod geocode;
pub mod location;
pub mod notification;

pub use geocode::{FixedGeocoder, Geocoder, NullGeocoder};
pub use location::{Accuracy, SimulatedLocationSource, SubscriptionOptions};
pub use notification::{LogNotifier, NotificationPresenter, NullNotifier};
