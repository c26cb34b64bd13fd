//! Common test utilities shared across test types
//!
//! - `fixtures.rs` - Test data builders and a wired store/services world
