//! Business logic services
//!
//! Orchestration over the [`ports`](crate::core::ports); no service knows
//! which adapters it runs on.
//!
//! - [`compatibility`] - score a donation against a request
//! - [`matching`] - rank candidate donations for a request
//! - [`transaction`] - commit and complete matches
//! - [`lifecycle`] - request status transitions
//! - [`requests`] / [`donations`] - intake and listing

pub mod compatibility;
pub mod donations;
pub mod lifecycle;
pub mod matching;
pub mod requests;
pub mod transaction;

pub use compatibility::{CompatibilityEngine, Ineligibility, ScoringPolicy, Verdict};
pub use donations::{DonationDraft, DonationService};
pub use lifecycle::{RequestEvent, RequestLifecycle};
pub use matching::{DEFAULT_LOOKUP_TIMEOUT, LOOKUP_WORKERS, MatchingService, rank};
pub use requests::{RequestDraft, RequestService};
pub use transaction::MatchTransactionManager;
