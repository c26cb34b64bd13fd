//! Request lifecycle manager
//!
//! ```text
//! active --matched--> fulfilled
//! active --cancel---> cancelled
//! ```
//!
//! `fulfilled` and `cancelled` are terminal. Every status change of a
//! request goes through [`apply`].

use std::sync::Arc;

use log::info;

use crate::core::error::{MatchingError, Result};
use crate::core::models::{Caller, DonationRequest, RequestId, RequestStatus};
use crate::core::ports::{EntityStore, StoreTransaction};

/// Something that happens to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    /// A match was committed for it
    Matched,
    /// The requester withdrew it
    Cancelled,
}

impl RequestEvent {
    const fn target(self) -> RequestStatus {
        match self {
            Self::Matched => RequestStatus::Fulfilled,
            Self::Cancelled => RequestStatus::Cancelled,
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Status a request moves to on `event`, or `InvalidState`
pub fn next_status(request: &DonationRequest, event: RequestEvent) -> Result<RequestStatus> {
    match request.status {
        RequestStatus::Active => Ok(event.target()),
        status => Err(MatchingError::invalid_state(
            "request",
            request.id.0,
            status,
            format!("only active requests can be {}", event.verb()),
        )),
    }
}

/// Apply `event` to `request` in place
pub fn apply(request: &mut DonationRequest, event: RequestEvent) -> Result<()> {
    request.status = next_status(request, event)?;
    Ok(())
}

/// Fail with `InvalidState` unless the request can be matched
pub fn ensure_matchable(request: &DonationRequest) -> Result<()> {
    next_status(request, RequestEvent::Matched).map(|_| ())
}

/// Owner-facing lifecycle operations
#[derive(Clone)]
pub struct RequestLifecycle {
    store: Arc<dyn EntityStore>,
}

impl std::fmt::Debug for RequestLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLifecycle").finish_non_exhaustive()
    }
}

impl RequestLifecycle {
    /// Create a lifecycle manager over a store
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Cancel an active request owned by `caller`
    pub fn cancel(&self, caller: &Caller, id: RequestId) -> Result<DonationRequest> {
        let mut cancelled = None;
        self.store.transaction(&mut |tx: &mut dyn StoreTransaction| {
            let mut request = tx.request(id).ok_or_else(|| MatchingError::not_found("request", id.0))?;
            if request.owner != caller.id {
                return Err(MatchingError::Forbidden(format!(
                    "request {id} belongs to another requester"
                )));
            }
            apply(&mut request, RequestEvent::Cancelled)?;
            tx.update_request(request.clone())?;
            cancelled = Some(request);
            Ok(())
        })?;

        let request = cancelled.ok_or_else(|| MatchingError::Storage("cancel did not commit".into()))?;
        info!("Request {} cancelled by {}", request.id, caller.id);
        Ok(request)
    }
}
