//! donormatch - donation request lifecycle, donor matching and match commits
//!
//! Requesters publish needs for blood, organs or tissue; donors publish
//! offers. The library ranks compatible offers for a request and commits a
//! chosen pairing atomically, so a donation is never reserved twice and a
//! request is never fulfilled twice.
//!
//! - [`core`] - domain models, ports and services
//! - [`adapters`] - store, distance and identity implementations
//! - [`api`] - HTTP-agnostic handlers shared by the server and the CLI
//! - [`server`] - `tiny_http` routing (feature `server`)

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod output;
pub mod server;
