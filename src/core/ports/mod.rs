//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the matching core and the
//! systems around it (storage, distance measurement, authentication).
//!
//! Implementations live in the `adapters` module.

mod distance;
mod entity_store;
mod identity;

pub use distance::{DistanceError, DistanceProvider};
pub use entity_store::{EntityStore, StoreTransaction};
pub use identity::IdentityProvider;

#[cfg(test)]
pub use distance::MockDistanceProvider;
#[cfg(test)]
pub use identity::MockIdentityProvider;
