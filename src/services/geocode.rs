// SPDX-License-Identifier: MIT

//! Reverse-geocoding capability.
//!
//! Coordinates resolve to a display address, or to `None` when the resolver
//! has nothing for them. Failures never block a trip transition; the tracker
//! logs and carries on without an address.

use std::future::Future;

use crate::error::Result;

pub trait Geocoder: Send + Sync {
    fn resolve_address(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Resolver that never finds an address.
#[derive(Clone, Default)]
pub struct NullGeocoder;

impl Geocoder for NullGeocoder {
    async fn resolve_address(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Resolver that answers every lookup with the same address. Test double.
#[derive(Clone)]
pub struct FixedGeocoder {
    pub address: String,
}

impl FixedGeocoder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl Geocoder for FixedGeocoder {
    async fn resolve_address(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Ok(Some(self.address.clone()))
    }
}
