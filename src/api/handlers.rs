//! Pure API handlers
//!
//! These handlers are HTTP-agnostic. They take an [`AppContext`], the
//! authenticated caller where ownership matters, and typed input, and return
//! `Result<T, ApiError>`.

use std::str::FromStr;

use chrono::NaiveDate;

use super::context::AppContext;
use super::error::ApiError;
use super::types::{
    CandidateItem, CreateDonationPayload, CreateMatchPayload, CreateRequestPayload, DonationItem,
    MatchItem, QuantityField, RequestItem, location_from_fields,
};
use crate::core::models::{Caller, DonationId, MatchId, RequestId};
use crate::core::services::{DonationDraft, RequestDraft};

// =============================================================================
// REQUESTS
// =============================================================================

/// Create an active request owned by `caller`
pub fn create_request(
    ctx: &AppContext,
    caller: &Caller,
    payload: CreateRequestPayload,
) -> Result<RequestItem, ApiError> {
    let draft = RequestDraft {
        kind: parse_field(payload.kind, "type")?,
        blood_type: parse_field(payload.blood_type, "bloodType")?,
        organ_type: parse_field(payload.organ_type, "organType")?,
        quantity: parse_quantity(payload.quantity.as_ref())?,
        unit: parse_field(payload.unit, "unit")?.unwrap_or_default(),
        urgency: parse_field(payload.urgency, "urgency")?.unwrap_or_default(),
        medical_justification: payload.medical_justification.unwrap_or_default(),
        special_requirements: payload.special_requirements,
        required_by: parse_date(payload.required_by_date, "requiredByDate")?,
        location: location_from_fields(payload.location, payload.latitude, payload.longitude),
    };
    let request = ctx.requests().create(caller, draft)?;
    Ok(RequestItem::from(&request))
}

/// Requests owned by `caller`, newest first
pub fn list_requests(ctx: &AppContext, caller: &Caller) -> Result<Vec<RequestItem>, ApiError> {
    let requests = ctx.requests().list(caller)?;
    Ok(requests.iter().map(RequestItem::from).collect())
}

/// Cancel an active request owned by `caller`
pub fn cancel_request(
    ctx: &AppContext,
    caller: &Caller,
    request_id: u64,
) -> Result<RequestItem, ApiError> {
    let request = ctx.lifecycle().cancel(caller, RequestId(request_id))?;
    Ok(RequestItem::from(&request))
}

// =============================================================================
// DONATIONS
// =============================================================================

/// Offer a donation as `caller`
pub fn create_donation(
    ctx: &AppContext,
    caller: &Caller,
    payload: CreateDonationPayload,
) -> Result<DonationItem, ApiError> {
    let draft = DonationDraft {
        kind: parse_field(payload.kind, "type")?,
        blood_type: parse_field(payload.blood_type, "bloodType")?,
        organ_type: parse_field(payload.organ_type, "organType")?,
        quantity: parse_quantity(payload.quantity.as_ref())?,
        unit: parse_field(payload.unit, "unit")?.unwrap_or_default(),
        urgency: parse_field(payload.urgency, "urgency")?.unwrap_or_default(),
        available_until: parse_date(payload.available_until, "availableUntil")?,
        location: location_from_fields(payload.location, payload.latitude, payload.longitude),
        phone: payload.phone,
    };
    let donation = ctx.donations().create(caller, draft)?;
    Ok(DonationItem::from(&donation))
}

/// Donations offered by `caller`, newest first
pub fn list_donations(ctx: &AppContext, caller: &Caller) -> Result<Vec<DonationItem>, ApiError> {
    let donations = ctx.donations().list(caller)?;
    Ok(donations.iter().map(DonationItem::from).collect())
}

// =============================================================================
// MATCHING
// =============================================================================

/// Ranked candidate donations for an active request of the caller
pub fn find_matches(
    ctx: &AppContext,
    caller: &Caller,
    request_id: u64,
) -> Result<Vec<CandidateItem>, ApiError> {
    let candidates = ctx.matching().find_candidates(caller, RequestId(request_id))?;
    Ok(candidates.iter().map(CandidateItem::from).collect())
}

/// Commit a chosen candidate on behalf of the requester or the donor
pub fn create_match(
    ctx: &AppContext,
    caller: &Caller,
    payload: CreateMatchPayload,
) -> Result<MatchItem, ApiError> {
    let record = ctx.transactions().create_match(
        caller,
        DonationId(payload.donation_id),
        RequestId(payload.request_id),
        payload.compatibility_score,
        payload.distance,
    )?;
    Ok(MatchItem::from(&record))
}

/// Complete a match the caller takes part in
pub fn complete_match(
    ctx: &AppContext,
    caller: &Caller,
    match_id: u64,
) -> Result<MatchItem, ApiError> {
    let record = ctx.transactions().complete_match(caller, MatchId(match_id))?;
    Ok(MatchItem::from(&record))
}

/// Matches touching the caller's donations or requests
pub fn list_matches(ctx: &AppContext, caller: &Caller) -> Result<Vec<MatchItem>, ApiError> {
    let matches = ctx.transactions().matches_for(caller)?;
    Ok(matches.iter().map(MatchItem::from).collect())
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_field<T>(value: Option<String>, field: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    value
        .map(|raw| raw.parse().map_err(|e: String| ApiError::validation(format!("{field}: {e}"))))
        .transpose()
}

fn parse_quantity(value: Option<&QuantityField>) -> Result<Option<i64>, ApiError> {
    value.map_or(Ok(None), |q| q.value().map_err(ApiError::validation))
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>, ApiError> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                ApiError::validation(format!("{field} must be a YYYY-MM-DD date, got {raw:?}"))
            })
        })
        .transpose()
}
