//! Entity store port
//!
//! Durable records for requests, donations and matches. Reads are
//! point-in-time snapshots; all multi-record writes go through
//! [`EntityStore::transaction`], which commits everything or nothing.

use crate::core::error::Result;
use crate::core::models::{
    Donation, DonationId, DonationKind, DonationRequest, Match, MatchId, NewDonation, NewMatch,
    NewRequest, RequestId,
};

/// Working view of the store inside a transaction
///
/// Reads observe the transaction's own earlier writes. Nothing is visible
/// to other callers until the enclosing transaction commits.
pub trait StoreTransaction {
    /// Look up a request
    fn request(&self, id: RequestId) -> Option<DonationRequest>;

    /// Look up a donation
    fn donation(&self, id: DonationId) -> Option<Donation>;

    /// Look up a match
    fn find_match(&self, id: MatchId) -> Option<Match>;

    /// The active match holding a donation, if any
    fn active_match_for_donation(&self, id: DonationId) -> Option<Match>;

    /// The active match holding a request, if any
    fn active_match_for_request(&self, id: RequestId) -> Option<Match>;

    /// Replace a stored request (must already exist)
    fn update_request(&mut self, request: DonationRequest) -> Result<()>;

    /// Replace a stored donation (must already exist)
    fn update_donation(&mut self, donation: Donation) -> Result<()>;

    /// Replace a stored match (must already exist)
    fn update_match(&mut self, record: Match) -> Result<()>;

    /// Insert a new active match
    ///
    /// Enforces the uniqueness constraint: fails with
    /// [`MatchingError::Conflict`](crate::core::error::MatchingError::Conflict)
    /// when the donation or the request is already held by an active match.
    fn insert_match(&mut self, new: NewMatch) -> Result<Match>;
}

/// Storage for all entities
///
/// Implementations must make [`transaction`](Self::transaction) serializable
/// with respect to every other transaction on the same store.
pub trait EntityStore: Send + Sync {
    /// Store a new request, assigning its id
    fn insert_request(&self, new: NewRequest) -> Result<DonationRequest>;

    /// Store a new donation, assigning its id
    fn insert_donation(&self, new: NewDonation) -> Result<Donation>;

    /// Look up a request
    fn request(&self, id: RequestId) -> Result<Option<DonationRequest>>;

    /// Look up a donation
    fn donation(&self, id: DonationId) -> Result<Option<Donation>>;

    /// Look up a match
    fn find_match(&self, id: MatchId) -> Result<Option<Match>>;

    /// Requests owned by a requester, oldest first
    fn requests_owned_by(&self, owner: &str) -> Result<Vec<DonationRequest>>;

    /// Donations offered by a donor, oldest first
    fn donations_owned_by(&self, donor: &str) -> Result<Vec<Donation>>;

    /// Donations of `kind` whose status is available
    fn available_donations(&self, kind: DonationKind) -> Result<Vec<Donation>>;

    /// Every match, oldest first
    fn matches(&self) -> Result<Vec<Match>>;

    /// Matches that still hold their donation and request
    fn active_matches(&self) -> Result<Vec<Match>> {
        Ok(self.matches()?.into_iter().filter(Match::is_active).collect())
    }

    /// Run `work` atomically
    ///
    /// If `work` returns an error, none of its writes are kept and the
    /// error is returned unchanged.
    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTransaction) -> Result<()>,
    ) -> Result<()>;
}
