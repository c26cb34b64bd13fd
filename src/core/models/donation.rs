//! Donation offer model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DonationId, DonorProfile, Location, Resource, Unit, Urgency};

/// Donation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Offered and not bound to any match
    #[default]
    Available,
    /// Bound to an active match
    Reserved,
    /// Handed over (terminal)
    Consumed,
}

impl DonationStatus {
    /// Whether `self -> next` is a legal transition
    ///
    /// available -> reserved -> consumed, nothing else.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!((self, next), (Self::Available, Self::Reserved) | (Self::Reserved, Self::Consumed))
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Reserved => write!(f, "reserved"),
            Self::Consumed => write!(f, "consumed"),
        }
    }
}

/// A stored donation offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Store-assigned id
    pub id: DonationId,

    /// Donor details; `donor.id` is the owner
    pub donor: DonorProfile,

    /// What is offered
    pub resource: Resource,

    /// How much is offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Unit of `quantity`
    #[serde(default)]
    pub unit: Unit,

    /// How urgently the donor can release it
    #[serde(default)]
    pub urgency: Urgency,

    /// Last date the offer stands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,

    /// Where the donor is
    pub location: Location,

    /// Current status
    #[serde(default)]
    pub status: DonationStatus,

    /// When the offer was made
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Whether the offer has lapsed as of `today`
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.available_until.is_some_and(|until| until < today)
    }
}

/// A validated donation that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    /// Donor details
    pub donor: DonorProfile,
    /// What is offered
    pub resource: Resource,
    /// How much is offered
    pub quantity: Option<u32>,
    /// Unit of `quantity`
    pub unit: Unit,
    /// How urgently the donor can release it
    pub urgency: Urgency,
    /// Last date the offer stands
    pub available_until: Option<NaiveDate>,
    /// Where the donor is
    pub location: Location,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NewDonation {
    /// Attach a store-assigned id, producing an available donation
    #[must_use]
    pub fn into_donation(self, id: DonationId) -> Donation {
        Donation {
            id,
            donor: self.donor,
            resource: self.resource,
            quantity: self.quantity,
            unit: self.unit,
            urgency: self.urgency,
            available_until: self.available_until,
            location: self.location,
            status: DonationStatus::Available,
            created_at: self.created_at,
        }
    }
}
