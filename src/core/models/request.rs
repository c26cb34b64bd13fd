//! Donation request model
//!
//! A request is a requester's solicitation for one resource. Its status
//! only ever moves out of `active`; see
//! [`lifecycle`](crate::core::services::lifecycle) for the transition rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, RequestId, Resource, Unit, Urgency};

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Open for matching
    #[default]
    Active,
    /// Matched with a donation (terminal)
    Fulfilled,
    /// Withdrawn by the requester (terminal)
    Cancelled,
}

impl RequestStatus {
    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A stored donation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRequest {
    /// Store-assigned id
    pub id: RequestId,

    /// Requester user id
    pub owner: String,

    /// What is needed
    pub resource: Resource,

    /// How much is needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Unit of `quantity`
    #[serde(default)]
    pub unit: Unit,

    /// How soon it is needed
    #[serde(default)]
    pub urgency: Urgency,

    /// Lifecycle status
    #[serde(default)]
    pub status: RequestStatus,

    /// Why the resource is needed (never empty)
    pub medical_justification: String,

    /// Free-form extra requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,

    /// Date by which the resource is needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_by: Option<NaiveDate>,

    /// Where the requester is
    pub location: Location,

    /// When the request was created
    pub created_at: DateTime<Utc>,
}

impl DonationRequest {
    /// Whether the request can still be matched
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }
}

/// A validated request that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    /// Requester user id
    pub owner: String,
    /// What is needed
    pub resource: Resource,
    /// How much is needed
    pub quantity: Option<u32>,
    /// Unit of `quantity`
    pub unit: Unit,
    /// How soon it is needed
    pub urgency: Urgency,
    /// Why the resource is needed
    pub medical_justification: String,
    /// Free-form extra requirements
    pub special_requirements: Option<String>,
    /// Date by which the resource is needed
    pub required_by: Option<NaiveDate>,
    /// Where the requester is
    pub location: Location,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NewRequest {
    /// Attach a store-assigned id, producing an active request
    #[must_use]
    pub fn into_request(self, id: RequestId) -> DonationRequest {
        DonationRequest {
            id,
            owner: self.owner,
            resource: self.resource,
            quantity: self.quantity,
            unit: self.unit,
            urgency: self.urgency,
            status: RequestStatus::Active,
            medical_justification: self.medical_justification,
            special_requirements: self.special_requirements,
            required_by: self.required_by,
            location: self.location,
            created_at: self.created_at,
        }
    }
}
