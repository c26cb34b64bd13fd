//! Compatibility engine - scores a donation against a request
//!
//! Pure functions, no I/O. A pair is either ineligible (different kind,
//! medically incompatible type, lapsed offer) or eligible with a score in
//! `0..=100`:
//!
//! ```text
//! score = round(type_weight * type_fit
//!             + urgency_weight * urgency_fit
//!             + recency_weight * freshness)
//! ```
//!
//! - `type_fit`: 1.0 for an exact type, `broad_type_fit` for a compatible
//!   but different blood type
//! - `urgency_fit`: 1.0 when the donation's urgency meets or exceeds the
//!   request's, otherwise reduced by a third per missing level
//! - `freshness`: 1.0 for an offer made today, falling linearly to 0 at
//!   `recency_horizon_days`
//!
//! Each term is monotone in its input, so a strictly better type, a better
//! urgency fit or a fresher offer never lowers the score.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::{Donation, DonationKind, DonationRequest, Resource, Urgency};

/// Weights and shape parameters of the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Points for type tightness
    pub type_weight: u8,
    /// Points for urgency alignment
    pub urgency_weight: u8,
    /// Points for offer recency
    pub recency_weight: u8,
    /// Type fit of a compatible but non-identical blood type, in (0, 1)
    pub broad_type_fit: f64,
    /// Age in days at which an offer stops earning recency points
    pub recency_horizon_days: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            type_weight: 50,
            urgency_weight: 30,
            recency_weight: 20,
            broad_type_fit: 0.6,
            recency_horizon_days: 30,
        }
    }
}

impl ScoringPolicy {
    /// Check the policy can only produce scores in `0..=100`
    pub fn validate(&self) -> Result<(), String> {
        let total =
            u16::from(self.type_weight) + u16::from(self.urgency_weight) + u16::from(self.recency_weight);
        if total != 100 {
            return Err(format!("scoring weights must sum to 100, got {total}"));
        }
        if !(self.broad_type_fit > 0.0 && self.broad_type_fit < 1.0) {
            return Err(format!(
                "broad_type_fit must be strictly between 0 and 1, got {}",
                self.broad_type_fit
            ));
        }
        if self.recency_horizon_days == 0 {
            return Err("recency_horizon_days must be positive".to_string());
        }
        Ok(())
    }
}

/// Why a pair can never be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ineligibility {
    /// Donation and request are for different kinds
    #[error("kind mismatch: donation is {donation}, request is {request}")]
    KindMismatch {
        /// Donation kind
        donation: DonationKind,
        /// Request kind
        request: DonationKind,
    },

    /// Same kind, medically incompatible type
    #[error("{donation} cannot be given for {request}")]
    IncompatibleType {
        /// Offered resource
        donation: Resource,
        /// Requested resource
        request: Resource,
    },

    /// The offer's availability window has closed
    #[error("offer lapsed on {0}")]
    Lapsed(NaiveDate),
}

/// Outcome of scoring one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Eligible, with a score in `0..=100`
    Eligible(u8),
    /// Excluded from results
    Ineligible(Ineligibility),
}

impl Verdict {
    /// The score, if eligible
    #[must_use]
    pub const fn score(self) -> Option<u8> {
        match self {
            Self::Eligible(score) => Some(score),
            Self::Ineligible(_) => None,
        }
    }
}

/// Scores donations against requests under a [`ScoringPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityEngine {
    policy: ScoringPolicy,
}

impl CompatibilityEngine {
    /// Create an engine with the given policy
    #[must_use]
    pub const fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use
    #[must_use]
    pub const fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score `donation` for `request` as of `now`
    #[must_use]
    pub fn score(&self, donation: &Donation, request: &DonationRequest, now: DateTime<Utc>) -> Verdict {
        let Some(type_fit) = self.type_fit(donation.resource, request.resource) else {
            return Verdict::Ineligible(ineligibility(donation.resource, request.resource));
        };

        let today = now.date_naive();
        if let Some(until) = donation.available_until.filter(|_| donation.is_expired(today)) {
            return Verdict::Ineligible(Ineligibility::Lapsed(until));
        }

        let age_days = (today - donation.created_at.date_naive()).num_days();
        Verdict::Eligible(self.combine(
            type_fit,
            urgency_fit(donation.urgency, request.urgency),
            self.freshness(age_days),
        ))
    }

    /// Type tightness of offering `donation` for `request`
    ///
    /// `None` when the pair is ineligible on type grounds.
    #[must_use]
    pub fn type_fit(&self, donation: Resource, request: Resource) -> Option<f64> {
        match (donation, request) {
            (Resource::Blood(given), Resource::Blood(needed)) => {
                if given == needed {
                    Some(1.0)
                } else if given.can_donate_to(needed) {
                    Some(self.policy.broad_type_fit)
                } else {
                    None
                }
            },
            (Resource::Organ(given), Resource::Organ(needed))
            | (Resource::Tissue(given), Resource::Tissue(needed)) => (given == needed).then_some(1.0),
            _ => None,
        }
    }

    /// Recency term for an offer made `age_days` ago
    #[must_use]
    pub fn freshness(&self, age_days: i64) -> f64 {
        let horizon = f64::from(self.policy.recency_horizon_days);
        #[allow(clippy::cast_precision_loss)]
        let age = age_days.max(0) as f64;
        (1.0 - age / horizon).max(0.0)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn combine(&self, type_fit: f64, urgency_fit: f64, freshness: f64) -> u8 {
        let raw = f64::from(self.policy.type_weight) * type_fit
            + f64::from(self.policy.urgency_weight) * urgency_fit
            + f64::from(self.policy.recency_weight) * freshness;
        raw.round().clamp(0.0, 100.0) as u8
    }
}

/// Urgency alignment: full marks when the offer is at least as urgent
#[must_use]
pub fn urgency_fit(offered: Urgency, needed: Urgency) -> f64 {
    let deficit = needed.rank().saturating_sub(offered.rank());
    1.0 - f64::from(deficit) / f64::from(Urgency::MAX_RANK)
}

fn ineligibility(donation: Resource, request: Resource) -> Ineligibility {
    if donation.kind() == request.kind() {
        Ineligibility::IncompatibleType { donation, request }
    } else {
        Ineligibility::KindMismatch {
            donation: donation.kind(),
            request: request.kind(),
        }
    }
}
