//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `memory` - mutex-guarded entity store, optionally mirrored to JSON
//! - `distance` - haversine and lookup-table distance providers
//! - `identity` - bearer token directory

mod distance;
mod identity;
mod memory;
mod snapshot;

pub use distance::{DistanceTable, HaversineDistance};
pub use identity::TokenDirectory;
pub use memory::MemoryStore;
