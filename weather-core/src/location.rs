use async_trait::async_trait;
use std::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{error::LocationError, model::Coordinate};

pub mod ip_api;

pub use ip_api::IpLocationProvider;

/// Source of the device position.
///
/// `request_location` yields the fixes gathered for one request, most recent
/// last. Callers stop the provider once they have used a fix.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_authorization(&self) -> Result<(), LocationError>;

    async fn request_location(&self) -> Result<Vec<Coordinate>, LocationError>;

    fn stop_updating(&self);
}

/// Always reports the same coordinate.
#[derive(Debug)]
pub struct FixedLocationProvider {
    coordinate: Coordinate,
    updating: AtomicBool,
}

impl FixedLocationProvider {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate, updating: AtomicBool::new(false) }
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_authorization(&self) -> Result<(), LocationError> {
        Ok(())
    }

    async fn request_location(&self) -> Result<Vec<Coordinate>, LocationError> {
        self.updating.store(true, Ordering::SeqCst);
        Ok(vec![self.coordinate])
    }

    fn stop_updating(&self) {
        self.updating.store(false, Ordering::SeqCst);
    }
}

/// Provider for sessions without location access.
#[derive(Debug, Default)]
pub struct DisabledLocationProvider;

#[async_trait]
impl LocationProvider for DisabledLocationProvider {
    async fn request_authorization(&self) -> Result<(), LocationError> {
        Err(LocationError::Denied)
    }

    async fn request_location(&self) -> Result<Vec<Coordinate>, LocationError> {
        Err(LocationError::Denied)
    }

    fn stop_updating(&self) {}
}
