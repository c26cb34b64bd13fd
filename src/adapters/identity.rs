//! Token directory identity provider
//!
//! Maps opaque bearer tokens to configured users.

use std::collections::HashMap;

use crate::core::models::Caller;
use crate::core::ports::IdentityProvider;

/// In-memory directory of users and their tokens
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
    by_token: HashMap<String, String>,
    users: HashMap<String, Caller>,
}

impl TokenDirectory {
    /// An empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, optionally reachable by `token`
    pub fn register(&mut self, caller: Caller, token: Option<&str>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.by_token.insert(token.to_string(), caller.id.clone());
        }
        self.users.insert(caller.id.clone(), caller);
    }

    /// Number of registered users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for TokenDirectory {
    fn resolve_token(&self, token: &str) -> Option<Caller> {
        self.by_token.get(token).and_then(|id| self.users.get(id)).cloned()
    }

    fn lookup(&self, user_id: &str) -> Option<Caller> {
        self.users.get(user_id).cloned()
    }
}
