//! HTTP-agnostic API layer
//!
//! Typed request/response structures and handlers shared by the HTTP server
//! and the CLI.
//!
//! ## Design
//!
//! - **Handlers are pure functions**: Take typed input, return `Result<T, ApiError>`
//! - **Types are framework-agnostic**: No HTTP types leak into this module
//! - **Errors carry HTTP semantics**: `ApiError` knows its status code for translation

mod context;
mod error;
mod handlers;
mod types;

pub use context::AppContext;
pub use error::{ApiError, ApiErrorData, ErrorCode};
pub use handlers::{
    cancel_request, complete_match, create_donation, create_match, create_request, find_matches,
    list_donations, list_matches, list_requests,
};
pub use types::{
    ApiResponse, CandidateDonation, CandidateItem, CreateDonationPayload, CreateMatchPayload,
    CreateRequestPayload, DonationItem, DonorSummary, MatchItem, QuantityField, RequestItem,
};
