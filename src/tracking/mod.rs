// SPDX-License-Identifier: MIT

//! Trip tracking core: distance accumulation, the lifecycle state machine,
//! and the background sample appender.

pub mod background;
pub mod distance;
pub mod tracker;

pub use background::BackgroundAppender;
pub use distance::{accumulate, replay_distance_km, Accumulation};
pub use tracker::TripTracker;
