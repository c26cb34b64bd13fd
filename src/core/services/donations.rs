//! Donation intake - validation, creation and listing of donation offers

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::info;

use super::requests::positive_quantity;
use crate::core::error::{MatchingError, Result};
use crate::core::models::{
    BloodType, Caller, Donation, DonationKind, DonorProfile, Location, NewDonation, OrganType,
    Resource, Unit, Urgency,
};
use crate::core::ports::EntityStore;

/// Unvalidated donation fields, already parsed into domain enums
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationDraft {
    /// Offered kind
    pub kind: Option<DonationKind>,
    /// Blood type (blood only)
    pub blood_type: Option<BloodType>,
    /// Organ/tissue type (organ and tissue only)
    pub organ_type: Option<OrganType>,
    /// Quantity; must be positive when given
    pub quantity: Option<i64>,
    /// Quantity unit
    pub unit: Unit,
    /// How urgently the donor can release it
    pub urgency: Urgency,
    /// Last date the offer stands; must not be in the past
    pub available_until: Option<NaiveDate>,
    /// Donor location; falls back to the caller's profile
    pub location: Option<Location>,
    /// Contact phone; falls back to the caller's profile
    pub phone: Option<String>,
}

/// Creates and lists donation offers
#[derive(Clone)]
pub struct DonationService {
    store: Arc<dyn EntityStore>,
}

impl std::fmt::Debug for DonationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DonationService").finish_non_exhaustive()
    }
}

impl DonationService {
    /// Create a donation service over a store
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Validate and store a new available donation offered by `caller`
    pub fn create(&self, caller: &Caller, draft: DonationDraft) -> Result<Donation> {
        let new = validate(caller, draft, Utc::now())?;
        let donation = self.store.insert_donation(new)?;
        info!("Donation {} offered by {}: {}", donation.id, caller.id, donation.resource);
        Ok(donation)
    }

    /// Donations offered by `caller`, newest first
    pub fn list(&self, caller: &Caller) -> Result<Vec<Donation>> {
        let mut donations = self.store.donations_owned_by(&caller.id)?;
        donations.reverse();
        Ok(donations)
    }
}

/// Turn a draft into a storable donation, stamped at `now`
pub fn validate(caller: &Caller, draft: DonationDraft, now: DateTime<Utc>) -> Result<NewDonation> {
    let kind = draft.kind.ok_or_else(|| MatchingError::Validation("type is required".to_string()))?;
    let resource =
        Resource::from_parts(kind, draft.blood_type, draft.organ_type).map_err(MatchingError::Validation)?;
    let quantity = positive_quantity(draft.quantity)?;

    if let Some(date) = draft.available_until.filter(|d| *d < now.date_naive()) {
        return Err(MatchingError::Validation(format!("availableUntil {date} is in the past")));
    }

    let location = draft.location.or_else(|| caller.location.clone()).ok_or_else(|| {
        MatchingError::Validation("location is required when the profile has none".to_string())
    })?;

    Ok(NewDonation {
        donor: DonorProfile {
            id: caller.id.clone(),
            name: caller.name.clone(),
            phone: draft
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .or_else(|| caller.phone.clone()),
        },
        resource,
        quantity,
        unit: draft.unit,
        urgency: draft.urgency,
        available_until: draft.available_until,
        location,
        created_at: now,
    })
}
