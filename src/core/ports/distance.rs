//! Distance provider port
//!
//! Distance between a donor and a requester is measured by an external
//! collaborator (geocoder, routing service, lookup table).

use std::time::Duration;

use thiserror::Error;

use crate::core::models::Location;

/// Why a distance could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// The provider cannot measure this pair
    #[error("distance unavailable: {0}")]
    Unavailable(String),

    /// The provider did not answer in time
    #[error("distance lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Measures the distance between two locations, in kilometers
#[cfg_attr(test, mockall::automock)]
pub trait DistanceProvider: Send + Sync {
    /// Distance from `from` to `to` in km; never negative
    fn distance(&self, from: &Location, to: &Location) -> Result<f64, DistanceError>;
}
