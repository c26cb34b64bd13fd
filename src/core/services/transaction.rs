//! Match transaction manager
//!
//! Commits a chosen (donation, request) pair. Eligibility is re-checked
//! inside the store transaction because the candidate list the caller saw
//! may be stale; the match record, the donation reservation and the request
//! fulfilment commit together or not at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::compatibility::CompatibilityEngine;
use super::lifecycle::{self, RequestEvent};
use crate::core::error::{MatchingError, Result};
use crate::core::models::{
    Caller, DonationId, DonationStatus, Match, MatchId, MatchStatus, NewMatch, RequestId,
};
use crate::core::ports::{EntityStore, StoreTransaction};

/// Creates and completes matches
#[derive(Clone)]
pub struct MatchTransactionManager {
    store: Arc<dyn EntityStore>,
    engine: CompatibilityEngine,
}

impl std::fmt::Debug for MatchTransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTransactionManager").finish_non_exhaustive()
    }
}

impl MatchTransactionManager {
    /// Create a manager over a store
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, engine: CompatibilityEngine) -> Self {
        Self { store, engine }
    }

    /// Commit a match on behalf of one of its parties
    ///
    /// `caller` must own the request or have offered the donation;
    /// anyone else gets `Forbidden`.
    pub fn create_match(
        &self,
        caller: &Caller,
        donation_id: DonationId,
        request_id: RequestId,
        compatibility_score: i64,
        distance: f64,
    ) -> Result<Match> {
        self.commit(Some(caller), donation_id, request_id, compatibility_score, distance, Utc::now())
    }

    /// Commit a match, stamping it with `now`
    ///
    /// `compatibility_score` and `distance` are advisory values from a prior
    /// candidate query; they are range-checked, not recomputed.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the score is outside `0..=100`, the distance is
    ///   negative or not finite, or the pair is medically incompatible
    /// - `NotFound` if either id does not resolve
    /// - `Forbidden` if a calling party owns neither side
    /// - `InvalidState` if the request is not active or the donation is not
    ///   available
    /// - `Conflict` if the donation is already held by an active match
    pub fn create_match_at(
        &self,
        donation_id: DonationId,
        request_id: RequestId,
        compatibility_score: i64,
        distance: f64,
        now: DateTime<Utc>,
    ) -> Result<Match> {
        self.commit(None, donation_id, request_id, compatibility_score, distance, now)
    }

    fn commit(
        &self,
        party: Option<&Caller>,
        donation_id: DonationId,
        request_id: RequestId,
        compatibility_score: i64,
        distance: f64,
        now: DateTime<Utc>,
    ) -> Result<Match> {
        let score = u8::try_from(compatibility_score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| {
                MatchingError::InvalidArgument(format!(
                    "compatibilityScore must be between 0 and 100, got {compatibility_score}"
                ))
            })?;
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(MatchingError::InvalidArgument(format!(
                "distance must be a non-negative number, got {distance}"
            )));
        }

        let mut committed = None;
        self.store.transaction(&mut |tx: &mut dyn StoreTransaction| {
            let mut request = tx
                .request(request_id)
                .ok_or_else(|| MatchingError::not_found("request", request_id.0))?;
            let mut donation = tx
                .donation(donation_id)
                .ok_or_else(|| MatchingError::not_found("donation", donation_id.0))?;

            if let Some(caller) = party.filter(|c| donation.donor.id != c.id && request.owner != c.id) {
                return Err(MatchingError::Forbidden(format!(
                    "{} neither owns request {request_id} nor offered donation {donation_id}",
                    caller.id
                )));
            }
            lifecycle::ensure_matchable(&request)?;
            if let Some(held) = tx.active_match_for_donation(donation_id) {
                return Err(MatchingError::Conflict(format!(
                    "donation {donation_id} is already held by match {}",
                    held.id
                )));
            }
            if !donation.status.can_become(DonationStatus::Reserved) {
                return Err(MatchingError::invalid_state(
                    "donation",
                    donation_id.0,
                    donation.status,
                    "only available donations can be matched",
                ));
            }
            if self.engine.type_fit(donation.resource, request.resource).is_none() {
                return Err(MatchingError::InvalidArgument(format!(
                    "{} cannot be given for {}",
                    donation.resource, request.resource
                )));
            }

            let record = tx.insert_match(NewMatch {
                donation_id,
                request_id,
                compatibility_score: score,
                distance,
                created_at: now,
            })?;
            donation.status = DonationStatus::Reserved;
            lifecycle::apply(&mut request, RequestEvent::Matched)?;
            tx.update_donation(donation.clone())?;
            tx.update_request(request.clone())?;
            committed = Some(record);
            Ok(())
        })?;

        let record =
            committed.ok_or_else(|| MatchingError::Storage("match did not commit".to_string()))?;
        info!(
            "Match {} committed: donation {} -> request {} (score {}, {:.1} km)",
            record.id, record.donation_id, record.request_id, record.compatibility_score, record.distance
        );
        Ok(record)
    }

    /// Mark an active match as completed and its donation as consumed
    ///
    /// Only the donor or the requester of the match may complete it.
    pub fn complete_match(&self, caller: &Caller, match_id: MatchId) -> Result<Match> {
        let mut completed = None;
        self.store.transaction(&mut |tx: &mut dyn StoreTransaction| {
            let mut record =
                tx.find_match(match_id).ok_or_else(|| MatchingError::not_found("match", match_id.0))?;
            let mut donation = tx
                .donation(record.donation_id)
                .ok_or_else(|| MatchingError::not_found("donation", record.donation_id.0))?;
            let request = tx
                .request(record.request_id)
                .ok_or_else(|| MatchingError::not_found("request", record.request_id.0))?;

            if donation.donor.id != caller.id && request.owner != caller.id {
                return Err(MatchingError::Forbidden(format!(
                    "match {match_id} involves neither a donation nor a request of {}",
                    caller.id
                )));
            }
            if !record.is_active() {
                return Err(MatchingError::invalid_state(
                    "match",
                    match_id.0,
                    record.status,
                    "only active matches can be completed",
                ));
            }
            if !donation.status.can_become(DonationStatus::Consumed) {
                return Err(MatchingError::invalid_state(
                    "donation",
                    donation.id.0,
                    donation.status,
                    "only reserved donations can be consumed",
                ));
            }

            record.status = MatchStatus::Completed;
            donation.status = DonationStatus::Consumed;
            tx.update_match(record)?;
            tx.update_donation(donation)?;
            completed = Some(record);
            Ok(())
        })?;

        let record =
            completed.ok_or_else(|| MatchingError::Storage("completion did not commit".to_string()))?;
        info!("Match {} completed by {}", record.id, caller.id);
        Ok(record)
    }

    /// Matches touching a donation or request owned by `caller`
    pub fn matches_for(&self, caller: &Caller) -> Result<Vec<Match>> {
        let mut mine = Vec::new();
        for record in self.store.matches()? {
            let donor = self.store.donation(record.donation_id)?.map(|d| d.donor.id);
            let requester = self.store.request(record.request_id)?.map(|r| r.owner);
            if donor.as_deref() == Some(caller.id.as_str())
                || requester.as_deref() == Some(caller.id.as_str())
            {
                mine.push(record);
            }
        }
        debug!("{} match(es) visible to {}", mine.len(), caller.id);
        Ok(mine)
    }
}
