//! Error taxonomy for the matching core
//!
//! Every variant is a per-call outcome; none is fatal to the process.
//! Distance lookups fail with [`DistanceError`](crate::core::ports::DistanceError)
//! instead, which the matching service absorbs.

use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T, E = MatchingError> = std::result::Result<T, E>;

/// Errors surfaced by core operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// Malformed or missing input field
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown id
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind ("request", "donation", "match")
        entity: &'static str,
        /// The id that did not resolve
        id: u64,
    },

    /// Operation not legal for the entity's current status
    #[error("{entity} {id} is {status}: {reason}")]
    InvalidState {
        /// Entity kind
        entity: &'static str,
        /// Entity id
        id: u64,
        /// Current status
        status: String,
        /// What was attempted and why it is refused
        reason: String,
    },

    /// A concurrent commit already claimed the entity
    #[error("conflict: {0}")]
    Conflict(String),

    /// Argument outside its allowed range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller does not own the entity
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl MatchingError {
    /// Shorthand for [`MatchingError::NotFound`]
    #[must_use]
    pub const fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for [`MatchingError::InvalidState`]
    #[must_use]
    pub fn invalid_state(
        entity: &'static str,
        id: u64,
        status: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            entity,
            id,
            status: status.to_string(),
            reason: reason.into(),
        }
    }
}
