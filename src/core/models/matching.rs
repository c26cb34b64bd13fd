//! Match and candidate models
//!
//! - [`Match`] - a committed (donation, request) pairing
//! - [`MatchCandidate`] - a scored, not-yet-committed donation for a request
//! - [`ScoreBand`] - descriptive bucket of a compatibility score

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Donation, DonationId, MatchId, RequestId};

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Committed; holds its donation and request exclusively
    #[default]
    Active,
    /// Donation handed over
    Completed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A committed pairing of one donation with one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Store-assigned id
    pub id: MatchId,
    /// Matched donation
    pub donation_id: DonationId,
    /// Matched request
    pub request_id: RequestId,
    /// Score shown to the caller when they chose this pairing (0-100)
    pub compatibility_score: u8,
    /// Distance shown to the caller, in km
    pub distance: f64,
    /// Current status
    #[serde(default)]
    pub status: MatchStatus,
    /// When the match was committed
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Whether the match still holds its donation and request
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MatchStatus::Active
    }
}

/// A match that has not been stored yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMatch {
    /// Donation to bind
    pub donation_id: DonationId,
    /// Request to bind
    pub request_id: RequestId,
    /// Advisory score
    pub compatibility_score: u8,
    /// Advisory distance
    pub distance: f64,
    /// Commit time
    pub created_at: DateTime<Utc>,
}

impl NewMatch {
    /// Attach a store-assigned id, producing an active match
    #[must_use]
    pub const fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            donation_id: self.donation_id,
            request_id: self.request_id,
            compatibility_score: self.compatibility_score,
            distance: self.distance,
            status: MatchStatus::Active,
            created_at: self.created_at,
        }
    }
}

/// A donation ranked against a request, ready to be offered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// Request the candidate was computed for
    pub request_id: RequestId,
    /// Candidate donation, including donor summary and location
    pub donation: Donation,
    /// Compatibility score (0-100)
    pub compatibility_score: u8,
    /// Distance between donor and requester, in km
    pub distance: f64,
}

/// Descriptive bucket of a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// 80 and above
    Strong,
    /// 60 to 79
    Moderate,
    /// Below 60
    Weak,
}

impl ScoreBand {
    /// Bucket a score
    #[must_use]
    pub const fn of(score: u8) -> Self {
        if score >= 80 {
            Self::Strong
        } else if score >= 60 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
            Self::Weak => write!(f, "weak"),
        }
    }
}
