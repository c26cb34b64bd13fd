//! API request and response types
//!
//! All types are framework-agnostic and can be used by any client.
//! Request bodies follow the web form's camelCase field names; stored
//! records are returned with snake_case fields, candidates in camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ApiErrorData;
use crate::core::models::{Donation, DonationRequest, Location, Match, MatchCandidate, ScoreBand};

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Standard API response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorData>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response
    #[must_use]
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorData {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// A quantity sent either as a JSON number or as form text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QuantityField {
    /// `"quantity": 3`
    Number(i64),
    /// `"quantity": "3"`
    Text(String),
}

impl QuantityField {
    /// The integer value, `None` for blank text
    pub fn value(&self) -> Result<Option<i64>, String> {
        match self {
            Self::Number(n) => Ok(Some(*n)),
            Self::Text(text) if text.trim().is_empty() => Ok(None),
            Self::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| format!("quantity must be a whole number, got {text:?}")),
        }
    }
}

/// Body for creating a donation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    /// `blood`, `organ` or `tissue`
    #[serde(default, rename = "type", alias = "kind", deserialize_with = "blank_as_none")]
    pub kind: Option<String>,
    /// Blood type, for blood
    #[serde(default, deserialize_with = "blank_as_none")]
    pub blood_type: Option<String>,
    /// Organ or tissue type
    #[serde(default, deserialize_with = "blank_as_none")]
    pub organ_type: Option<String>,
    /// Positive quantity
    #[serde(default)]
    pub quantity: Option<QuantityField>,
    /// Quantity unit
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit: Option<String>,
    /// Urgency
    #[serde(default, deserialize_with = "blank_as_none")]
    pub urgency: Option<String>,
    /// Why the resource is needed
    #[serde(default, deserialize_with = "blank_as_none")]
    pub medical_justification: Option<String>,
    /// Free-text extra requirements
    #[serde(default, deserialize_with = "blank_as_none")]
    pub special_requirements: Option<String>,
    /// Needed-by date, `YYYY-MM-DD`
    #[serde(default, alias = "requiredBy", deserialize_with = "blank_as_none")]
    pub required_by_date: Option<String>,
    /// Location label; defaults to the caller's profile
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    /// Location latitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Location longitude
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Body for offering a donation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationPayload {
    /// `blood`, `organ` or `tissue`
    #[serde(default, rename = "type", alias = "kind", deserialize_with = "blank_as_none")]
    pub kind: Option<String>,
    /// Blood type, for blood
    #[serde(default, deserialize_with = "blank_as_none")]
    pub blood_type: Option<String>,
    /// Organ or tissue type
    #[serde(default, deserialize_with = "blank_as_none")]
    pub organ_type: Option<String>,
    /// Positive quantity
    #[serde(default)]
    pub quantity: Option<QuantityField>,
    /// Quantity unit
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit: Option<String>,
    /// How urgently the donor can release it
    #[serde(default, deserialize_with = "blank_as_none")]
    pub urgency: Option<String>,
    /// Last date the offer stands, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "blank_as_none")]
    pub available_until: Option<String>,
    /// Location label; defaults to the caller's profile
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    /// Location latitude
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Location longitude
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Contact phone; defaults to the caller's profile
    #[serde(default, alias = "contactPhone", deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
}

/// Body for committing a match
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchPayload {
    /// Donation to reserve
    pub donation_id: u64,
    /// Request to fulfil
    pub request_id: u64,
    /// Score shown with the candidate
    pub compatibility_score: i64,
    /// Distance shown with the candidate, in km
    pub distance: f64,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

// =============================================================================
// RECORD TYPES
// =============================================================================

/// A stored request
#[derive(Debug, Clone, Serialize)]
pub struct RequestItem {
    /// Request id
    pub id: u64,
    /// Kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Blood type, for blood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    /// Organ or tissue type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organ_type: Option<String>,
    /// Quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Quantity unit
    pub unit: String,
    /// Urgency
    pub urgency: String,
    /// `active`, `fulfilled` or `cancelled`
    pub status: String,
    /// Why the resource is needed
    pub medical_justification: String,
    /// Extra requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    /// Needed-by date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_by_date: Option<NaiveDate>,
    /// Requester location label
    pub location: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<&DonationRequest> for RequestItem {
    fn from(request: &DonationRequest) -> Self {
        Self {
            id: request.id.0,
            kind: request.resource.kind().to_string(),
            blood_type: request.resource.blood_type().map(|t| t.to_string()),
            organ_type: request.resource.organ_type().map(|t| t.to_string()),
            quantity: request.quantity,
            unit: request.unit.to_string(),
            urgency: request.urgency.to_string(),
            status: request.status.to_string(),
            medical_justification: request.medical_justification.clone(),
            special_requirements: request.special_requirements.clone(),
            required_by_date: request.required_by,
            location: request.location.label.clone(),
            created_at: request.created_at,
        }
    }
}

/// A stored donation offer
#[derive(Debug, Clone, Serialize)]
pub struct DonationItem {
    /// Donation id
    pub id: u64,
    /// Kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Blood type, for blood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    /// Organ or tissue type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organ_type: Option<String>,
    /// Quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Quantity unit
    pub unit: String,
    /// Urgency
    pub urgency: String,
    /// `available`, `reserved` or `consumed`
    pub status: String,
    /// Last date the offer stands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,
    /// Donor location label
    pub location: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<&Donation> for DonationItem {
    fn from(donation: &Donation) -> Self {
        Self {
            id: donation.id.0,
            kind: donation.resource.kind().to_string(),
            blood_type: donation.resource.blood_type().map(|t| t.to_string()),
            organ_type: donation.resource.organ_type().map(|t| t.to_string()),
            quantity: donation.quantity,
            unit: donation.unit.to_string(),
            urgency: donation.urgency.to_string(),
            status: donation.status.to_string(),
            available_until: donation.available_until,
            location: donation.location.label.clone(),
            created_at: donation.created_at,
        }
    }
}

/// A committed match
#[derive(Debug, Clone, Serialize)]
pub struct MatchItem {
    /// Match id
    pub id: u64,
    /// Reserved donation
    pub donation_id: u64,
    /// Fulfilled request
    pub request_id: u64,
    /// Score recorded at commit time
    pub compatibility_score: u8,
    /// Distance recorded at commit time, in km
    pub distance: f64,
    /// `active` or `completed`
    pub status: String,
    /// Commit time
    pub created_at: DateTime<Utc>,
}

impl From<&Match> for MatchItem {
    fn from(record: &Match) -> Self {
        Self {
            id: record.id.0,
            donation_id: record.donation_id.0,
            request_id: record.request_id.0,
            compatibility_score: record.compatibility_score,
            distance: record.distance,
            status: record.status.to_string(),
            created_at: record.created_at,
        }
    }
}

// =============================================================================
// CANDIDATE TYPES
// =============================================================================

/// Donor summary shown with a candidate
#[derive(Debug, Clone, Serialize)]
pub struct DonorSummary {
    /// Donor display name
    pub name: String,
    /// Donor location label
    pub location: String,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Donation details shown with a candidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDonation {
    /// Donation id
    pub id: u64,
    /// Kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Blood type, for blood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    /// Organ or tissue type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organ_type: Option<String>,
    /// Quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Quantity unit
    pub unit: String,
    /// Donation urgency
    pub urgency: String,
    /// Last date the offer stands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,
    /// Offer time
    pub created_at: DateTime<Utc>,
}

/// A ranked candidate donation for a request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    /// Candidate donation id
    pub donation_id: u64,
    /// Request the candidate was ranked for
    pub request_id: u64,
    /// Compatibility score (0-100)
    pub compatibility_score: u8,
    /// Descriptive score bucket
    pub band: ScoreBand,
    /// Distance in km
    pub distance: f64,
    /// Donor summary
    pub donor: DonorSummary,
    /// Donation details
    pub donation: CandidateDonation,
}

impl From<&MatchCandidate> for CandidateItem {
    fn from(candidate: &MatchCandidate) -> Self {
        let donation = &candidate.donation;
        Self {
            donation_id: donation.id.0,
            request_id: candidate.request_id.0,
            compatibility_score: candidate.compatibility_score,
            band: ScoreBand::of(candidate.compatibility_score),
            distance: candidate.distance,
            donor: DonorSummary {
                name: donation.donor.name.clone(),
                location: donation.location.label.clone(),
                phone: donation.donor.phone.clone(),
            },
            donation: CandidateDonation {
                id: donation.id.0,
                kind: donation.resource.kind().to_string(),
                blood_type: donation.resource.blood_type().map(|t| t.to_string()),
                organ_type: donation.resource.organ_type().map(|t| t.to_string()),
                quantity: donation.quantity,
                unit: donation.unit.to_string(),
                urgency: donation.urgency.to_string(),
                available_until: donation.available_until,
                created_at: donation.created_at,
            },
        }
    }
}

/// Build a location from form fields
#[must_use]
pub(crate) fn location_from_fields(
    label: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<Location> {
    label.map(|label| Location {
        label,
        latitude,
        longitude,
    })
}
