//! Wiring of services over one store
//!
//! Both the HTTP server and the CLI build a single [`AppContext`] and pass it
//! to the handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::debug;

use super::error::ApiError;
use crate::adapters::MemoryStore;
use crate::config::Settings;
use crate::core::models::Caller;
use crate::core::ports::{DistanceProvider, EntityStore, IdentityProvider};
use crate::core::services::{
    CompatibilityEngine, DonationService, MatchTransactionManager, MatchingService,
    RequestLifecycle, RequestService, ScoringPolicy,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppContext {
    identity: Arc<dyn IdentityProvider>,
    requests: RequestService,
    donations: DonationService,
    lifecycle: RequestLifecycle,
    matching: MatchingService,
    transactions: MatchTransactionManager,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").field("matching", &self.matching).finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire services over explicit collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        identity: Arc<dyn IdentityProvider>,
        distance: Arc<dyn DistanceProvider>,
        policy: ScoringPolicy,
        lookup_timeout: Duration,
    ) -> Self {
        let engine = CompatibilityEngine::new(policy);
        Self {
            identity,
            requests: RequestService::new(Arc::clone(&store)),
            donations: DonationService::new(Arc::clone(&store)),
            lifecycle: RequestLifecycle::new(Arc::clone(&store)),
            matching: MatchingService::new(Arc::clone(&store), engine, distance, lookup_timeout),
            transactions: MatchTransactionManager::new(store, engine),
        }
    }

    /// Wire services from settings, opening the configured store
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store = match settings.store_path() {
            Some(path) => {
                debug!("Opening store at {}", path.display());
                MemoryStore::open(&path)
                    .with_context(|| format!("Failed to open store {}", path.display()))?
            },
            None => MemoryStore::new(),
        };
        Ok(Self::new(
            Arc::new(store),
            Arc::new(settings.directory()),
            settings.distance_provider(),
            settings.scoring,
            settings.lookup_timeout(),
        ))
    }

    /// Resolve an `Authorization` header value to a caller
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Caller, ApiError> {
        let token = authorization
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        self.identity
            .resolve_token(token)
            .ok_or_else(|| ApiError::unauthorized("Unknown or expired token"))
    }

    /// Look up a caller by user id
    pub fn caller(&self, user_id: &str) -> Result<Caller, ApiError> {
        self.identity
            .lookup(user_id)
            .ok_or_else(|| ApiError::unauthorized(format!("Unknown user: {user_id}")))
    }

    /// Request intake
    #[must_use]
    pub const fn requests(&self) -> &RequestService {
        &self.requests
    }

    /// Donation intake
    #[must_use]
    pub const fn donations(&self) -> &DonationService {
        &self.donations
    }

    /// Request lifecycle
    #[must_use]
    pub const fn lifecycle(&self) -> &RequestLifecycle {
        &self.lifecycle
    }

    /// Candidate ranking
    #[must_use]
    pub const fn matching(&self) -> &MatchingService {
        &self.matching
    }

    /// Match commits
    #[must_use]
    pub const fn transactions(&self) -> &MatchTransactionManager {
        &self.transactions
    }
}
