//! Request intake - validation, creation and listing of donation requests

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::info;

use crate::core::error::{MatchingError, Result};
use crate::core::models::{
    BloodType, Caller, DonationKind, DonationRequest, Location, NewRequest, OrganType, Resource,
    Unit, Urgency,
};
use crate::core::ports::EntityStore;

/// Unvalidated request fields, already parsed into domain enums
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    /// Requested kind
    pub kind: Option<DonationKind>,
    /// Blood type (blood only)
    pub blood_type: Option<BloodType>,
    /// Organ/tissue type (organ and tissue only)
    pub organ_type: Option<OrganType>,
    /// Quantity; must be positive when given
    pub quantity: Option<i64>,
    /// Quantity unit
    pub unit: Unit,
    /// Urgency
    pub urgency: Urgency,
    /// Medical justification; must not be blank
    pub medical_justification: String,
    /// Extra requirements; blank means none
    pub special_requirements: Option<String>,
    /// Needed-by date; must not be in the past
    pub required_by: Option<NaiveDate>,
    /// Requester location; falls back to the caller's profile
    pub location: Option<Location>,
}

/// Creates and lists requests
#[derive(Clone)]
pub struct RequestService {
    store: Arc<dyn EntityStore>,
}

impl std::fmt::Debug for RequestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestService").finish_non_exhaustive()
    }
}

impl RequestService {
    /// Create a request service over a store
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Validate and store a new active request owned by `caller`
    pub fn create(&self, caller: &Caller, draft: RequestDraft) -> Result<DonationRequest> {
        let new = validate(caller, draft, Utc::now())?;
        let request = self.store.insert_request(new)?;
        info!("Request {} created by {} for {}", request.id, caller.id, request.resource);
        Ok(request)
    }

    /// Requests owned by `caller`, newest first
    pub fn list(&self, caller: &Caller) -> Result<Vec<DonationRequest>> {
        let mut requests = self.store.requests_owned_by(&caller.id)?;
        requests.reverse();
        Ok(requests)
    }
}

/// Turn a draft into a storable request, stamped at `now`
pub fn validate(caller: &Caller, draft: RequestDraft, now: DateTime<Utc>) -> Result<NewRequest> {
    let kind = draft.kind.ok_or_else(|| MatchingError::Validation("type is required".to_string()))?;
    let resource =
        Resource::from_parts(kind, draft.blood_type, draft.organ_type).map_err(MatchingError::Validation)?;

    let medical_justification = draft.medical_justification.trim().to_string();
    if medical_justification.is_empty() {
        return Err(MatchingError::Validation("medicalJustification is required".to_string()));
    }

    let quantity = positive_quantity(draft.quantity)?;

    if let Some(date) = draft.required_by.filter(|d| *d < now.date_naive()) {
        return Err(MatchingError::Validation(format!(
            "requiredByDate {date} is before the creation date"
        )));
    }

    let location = draft.location.or_else(|| caller.location.clone()).ok_or_else(|| {
        MatchingError::Validation("location is required when the profile has none".to_string())
    })?;

    Ok(NewRequest {
        owner: caller.id.clone(),
        resource,
        quantity,
        unit: draft.unit,
        urgency: draft.urgency,
        medical_justification,
        special_requirements: draft
            .special_requirements
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        required_by: draft.required_by,
        location,
        created_at: now,
    })
}

/// Check an optional quantity is a positive integer that fits the model
pub(crate) fn positive_quantity(quantity: Option<i64>) -> Result<Option<u32>> {
    quantity
        .map(|q| {
            u32::try_from(q).ok().filter(|q| *q > 0).ok_or_else(|| {
                MatchingError::Validation(format!("quantity must be a positive integer, got {q}"))
            })
        })
        .transpose()
}
