// SPDX-License-Identifier: MIT

//! Background sample appender.
//!
//! Runs in its own task with no reference to the foreground tracker's
//! memory; the durable slot is the only thing the two contexts share. Every
//! delivery is a read-modify-write against the slot, and each append is
//! guarded by the trip id the subscription was opened for, so a delivery
//! that outlives its trip is dropped instead of corrupting the next one.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::models::GeoSample;
use crate::store::kv::KeyValueStore;
use crate::store::TripStore;

pub struct BackgroundAppender<S: KeyValueStore> {
    store: TripStore<S>,
    trip_id: String,
}

impl<S: KeyValueStore> BackgroundAppender<S> {
    /// Bind an appender to the trip it is allowed to extend.
    pub fn new(store: TripStore<S>, trip_id: impl Into<String>) -> Self {
        Self {
            store,
            trip_id: trip_id.into(),
        }
    }

    /// Append one delivered sample to the durable slot.
    pub async fn handle_sample(&self, sample: GeoSample) -> Result<()> {
        self.store
            .append_sample_to_slot(Some(&self.trip_id), sample)
            .await?;
        Ok(())
    }

    /// Consume the subscription until the channel closes (unsubscribe is
    /// dropping the sender). Sample writes are best-effort: a storage
    /// failure is logged and the stream continues.
    pub async fn run(self, mut rx: mpsc::Receiver<GeoSample>) {
        while let Some(sample) = rx.recv().await {
            if let Err(err) = self.handle_sample(sample).await {
                tracing::warn!(trip_id = %self.trip_id, error = %err, "Background sample write failed");
            }
        }
        tracing::debug!(trip_id = %self.trip_id, "Location subscription closed");
    }

    /// Spawn `run` on the runtime's background context.
    pub fn spawn(self, rx: mpsc::Receiver<GeoSample>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }
}
