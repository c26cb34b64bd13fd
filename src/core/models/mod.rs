//! Domain models for donormatch
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`DonationRequest`] - "I need this resource"
//! - [`Donation`] - "I can give this resource"
//! - [`Match`] - "this donation goes to that request"
//! - [`Resource`] - blood type or organ/tissue type, never both
//! - [`Urgency`] - how soon something is needed

mod donation;
mod ids;
mod matching;
mod party;
mod request;
mod resource;
mod urgency;

pub use donation::{Donation, DonationStatus, NewDonation};
pub use ids::{DonationId, MatchId, RequestId};
pub use matching::{Match, MatchCandidate, MatchStatus, NewMatch, ScoreBand};
pub use party::{Caller, DonorProfile, Location};
pub use request::{DonationRequest, NewRequest, RequestStatus};
pub use resource::{BloodType, DonationKind, OrganType, Resource};
pub use urgency::{Unit, Urgency};
