//! In-memory entity store with optional JSON snapshot
//!
//! One mutex guards the whole state. Every write works on a copy of the
//! state and swaps it in only after the closure succeeded and the snapshot
//! (if any) was written, which makes each write all-or-nothing and
//! serializes transactions.
//!
//! A snapshot may be shared by several processes. Reads reload it under a
//! shared file lock; writes reload it, apply the change and save it under
//! an exclusive one, so no process commits against a stale copy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::{MatchingError, Result};
use crate::core::models::{
    Donation, DonationId, DonationKind, DonationRequest, DonationStatus, Match, MatchId,
    NewDonation, NewMatch, NewRequest, RequestId,
};
use crate::core::ports::{EntityStore, StoreTransaction};

use super::snapshot;

/// Serializable contents of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    last_request_id: u64,
    #[serde(default)]
    last_donation_id: u64,
    #[serde(default)]
    last_match_id: u64,
    #[serde(default)]
    requests: BTreeMap<u64, DonationRequest>,
    #[serde(default)]
    donations: BTreeMap<u64, Donation>,
    #[serde(default)]
    matches: BTreeMap<u64, Match>,
}

impl StoreTransaction for StoreState {
    fn request(&self, id: RequestId) -> Option<DonationRequest> {
        self.requests.get(&id.0).cloned()
    }

    fn donation(&self, id: DonationId) -> Option<Donation> {
        self.donations.get(&id.0).cloned()
    }

    fn find_match(&self, id: MatchId) -> Option<Match> {
        self.matches.get(&id.0).copied()
    }

    fn active_match_for_donation(&self, id: DonationId) -> Option<Match> {
        self.matches.values().find(|m| m.is_active() && m.donation_id == id).copied()
    }

    fn active_match_for_request(&self, id: RequestId) -> Option<Match> {
        self.matches.values().find(|m| m.is_active() && m.request_id == id).copied()
    }

    fn update_request(&mut self, request: DonationRequest) -> Result<()> {
        let slot = self
            .requests
            .get_mut(&request.id.0)
            .ok_or_else(|| MatchingError::not_found("request", request.id.0))?;
        *slot = request;
        Ok(())
    }

    fn update_donation(&mut self, donation: Donation) -> Result<()> {
        let slot = self
            .donations
            .get_mut(&donation.id.0)
            .ok_or_else(|| MatchingError::not_found("donation", donation.id.0))?;
        *slot = donation;
        Ok(())
    }

    fn update_match(&mut self, record: Match) -> Result<()> {
        let slot = self
            .matches
            .get_mut(&record.id.0)
            .ok_or_else(|| MatchingError::not_found("match", record.id.0))?;
        *slot = record;
        Ok(())
    }

    fn insert_match(&mut self, new: NewMatch) -> Result<Match> {
        if let Some(held) = self.active_match_for_donation(new.donation_id) {
            return Err(MatchingError::Conflict(format!(
                "donation {} is already held by match {}",
                new.donation_id, held.id
            )));
        }
        if let Some(held) = self.active_match_for_request(new.request_id) {
            return Err(MatchingError::Conflict(format!(
                "request {} is already held by match {}",
                new.request_id, held.id
            )));
        }
        self.last_match_id += 1;
        let record = new.into_match(MatchId(self.last_match_id));
        self.matches.insert(record.id.0, record);
        Ok(record)
    }
}

/// Entity store kept in memory, optionally mirrored to a JSON file
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// An empty, non-persistent store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store backed by the snapshot at `path`, loading it if it exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = {
            let _lock = snapshot::lock(&path, false)?;
            snapshot::load(&path)?
        };
        debug!(
            "Opened store {} ({} requests, {} donations, {} matches)",
            path.display(),
            state.requests.len(),
            state.donations.len(),
            state.matches.len()
        );
        Ok(Self {
            state: Mutex::new(state),
            snapshot: Some(path),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| MatchingError::Storage("store lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T> {
        let mut guard = self.lock()?;
        if let Some(path) = &self.snapshot {
            let _lock = snapshot::lock(path, false)?;
            *guard = snapshot::load(path)?;
        }
        Ok(f(&guard))
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let Some(path) = &self.snapshot else {
            let mut draft = guard.clone();
            let out = f(&mut draft)?;
            *guard = draft;
            return Ok(out);
        };

        let _lock = snapshot::lock(path, true)?;
        let mut draft = snapshot::load(path)?;
        let out = f(&mut draft)?;
        snapshot::save(path, &draft)?;
        *guard = draft;
        Ok(out)
    }
}

impl EntityStore for MemoryStore {
    fn insert_request(&self, new: NewRequest) -> Result<DonationRequest> {
        self.write(|state| {
            state.last_request_id += 1;
            let request = new.into_request(RequestId(state.last_request_id));
            state.requests.insert(request.id.0, request.clone());
            Ok(request)
        })
    }

    fn insert_donation(&self, new: NewDonation) -> Result<Donation> {
        self.write(|state| {
            state.last_donation_id += 1;
            let donation = new.into_donation(DonationId(state.last_donation_id));
            state.donations.insert(donation.id.0, donation.clone());
            Ok(donation)
        })
    }

    fn request(&self, id: RequestId) -> Result<Option<DonationRequest>> {
        self.read(|state| state.requests.get(&id.0).cloned())
    }

    fn donation(&self, id: DonationId) -> Result<Option<Donation>> {
        self.read(|state| state.donations.get(&id.0).cloned())
    }

    fn find_match(&self, id: MatchId) -> Result<Option<Match>> {
        self.read(|state| state.matches.get(&id.0).copied())
    }

    fn requests_owned_by(&self, owner: &str) -> Result<Vec<DonationRequest>> {
        self.read(|state| state.requests.values().filter(|r| r.owner == owner).cloned().collect())
    }

    fn donations_owned_by(&self, donor: &str) -> Result<Vec<Donation>> {
        self.read(|state| state.donations.values().filter(|d| d.donor.id == donor).cloned().collect())
    }

    fn available_donations(&self, kind: DonationKind) -> Result<Vec<Donation>> {
        self.read(|state| {
            state
                .donations
                .values()
                .filter(|d| d.status == DonationStatus::Available && d.resource.kind() == kind)
                .cloned()
                .collect()
        })
    }

    fn matches(&self) -> Result<Vec<Match>> {
        self.read(|state| state.matches.values().copied().collect())
    }

    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTransaction) -> Result<()>,
    ) -> Result<()> {
        self.write(|state| work(state))
    }
}
