//! Identity provider port
//!
//! Authentication happens elsewhere; the core only needs to turn a bearer
//! token (HTTP) or a user id (CLI) into a [`Caller`].

use crate::core::models::Caller;

/// Resolves callers
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token
    fn resolve_token(&self, token: &str) -> Option<Caller>;

    /// Look up a user by id
    fn lookup(&self, user_id: &str) -> Option<Caller>;
}
