//! Core domain logic for donormatch
//!
//! This module contains pure business logic with no I/O dependencies.
//! All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (requests, donations, matches, resources)
//! - `services/` - Compatibility scoring, matching, match commits, lifecycle
//! - `ports/` - Trait definitions for storage, distance and identity
//! - `error` - The error taxonomy shared by all services

pub mod error;
pub mod models;
pub mod ports;
pub mod services;

pub use error::{MatchingError, Result};
