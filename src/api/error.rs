//! API error types with HTTP status code mapping

use serde::Serialize;

use crate::core::MatchingError;

/// Error codes that map to HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Field validation failed (400)
    Validation,
    /// Argument out of range (400)
    InvalidArgument,
    /// Malformed request (400)
    BadRequest,
    /// Missing or unknown credentials (401)
    Unauthorized,
    /// Caller does not own the resource (403)
    Forbidden,
    /// Resource not found (404)
    NotFound,
    /// Operation not legal in the current status (409)
    InvalidState,
    /// Lost a race for the resource (409)
    Conflict,
    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::InvalidArgument | Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InvalidState | Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Get the error code string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidState => "INVALID_STATE",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// API error with code and message
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error code (determines HTTP status)
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create an error with an explicit code
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a bad request error
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Create an unauthorized error
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl From<MatchingError> for ApiError {
    fn from(err: MatchingError) -> Self {
        let code = match &err {
            MatchingError::Validation(_) => ErrorCode::Validation,
            MatchingError::NotFound { .. } => ErrorCode::NotFound,
            MatchingError::InvalidState { .. } => ErrorCode::InvalidState,
            MatchingError::Conflict(_) => ErrorCode::Conflict,
            MatchingError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            MatchingError::Forbidden(_) => ErrorCode::Forbidden,
            MatchingError::Storage(_) => ErrorCode::Internal,
        };
        let message = match err {
            MatchingError::Validation(msg)
            | MatchingError::Conflict(msg)
            | MatchingError::InvalidArgument(msg)
            | MatchingError::Forbidden(msg) => msg,
            other => other.to_string(),
        };
        Self { code, message }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Serializable error data for JSON responses
#[derive(Debug, Serialize)]
pub struct ApiErrorData {
    /// Error code string
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ApiError> for ApiErrorData {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
        }
    }
}
