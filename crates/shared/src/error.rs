//! Application-wide error types.

use thiserror::Error;

/// Why a request carries no usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No bearer token was sent.
    #[error("Authorization header with Bearer token is required")]
    MissingToken,

    /// The token signature is valid but it has expired.
    #[error("Token has expired")]
    TokenExpired,

    /// The token could not be decoded or verified.
    #[error("Invalid or malformed token")]
    InvalidToken,
}

impl AuthFailure {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken => "invalid_token",
        }
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session.
    #[error("Authentication required: {0}")]
    Unauthenticated(AuthFailure),

    /// Authenticated, but the role lacks the capability.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is not valid for the current lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Reset confirmation text did not match.
    #[error("Confirmation does not match; type \"{expected}\" to confirm")]
    ConfirmationMismatch {
        /// The phrase the caller must supply.
        expected: String,
    },

    /// Same-site verification failed.
    #[error("Origin rejected: {0}")]
    OriginRejected(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) | Self::OriginRejected(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidState(_) => 409,
            Self::ConfirmationMismatch { .. } => 422,
            Self::Validation(_) => 400,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(failure) => failure.code(),
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::ConfirmationMismatch { .. } => "confirmation_mismatch",
            Self::OriginRejected(_) => "origin_rejected",
            Self::Validation(_) => "validation_error",
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns true if the detail must not be shown to the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthenticated(AuthFailure::MissingToken), 401, "missing_token")]
    #[case(AppError::Unauthenticated(AuthFailure::TokenExpired), 401, "token_expired")]
    #[case(AppError::Unauthenticated(AuthFailure::InvalidToken), 401, "invalid_token")]
    #[case(AppError::Forbidden(String::new()), 403, "forbidden")]
    #[case(AppError::NotFound(String::new()), 404, "not_found")]
    #[case(AppError::InvalidState(String::new()), 409, "invalid_state")]
    #[case(
        AppError::ConfirmationMismatch { expected: String::new() },
        422,
        "confirmation_mismatch"
    )]
    #[case(AppError::OriginRejected(String::new()), 403, "origin_rejected")]
    #[case(AppError::Validation(String::new()), 400, "validation_error")]
    #[case(AppError::Database(String::new()), 500, "database_error")]
    #[case(AppError::Internal(String::new()), 500, "internal_error")]
    fn test_status_and_code(#[case] error: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_only_store_failures_are_internal() {
        assert!(AppError::Database("connection reset".into()).is_internal());
        assert!(AppError::Internal("boom".into()).is_internal());
        assert!(!AppError::NotFound("year".into()).is_internal());
        assert!(!AppError::ConfirmationMismatch { expected: "x".into() }.is_internal());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::InvalidState("msg".into()).to_string(),
            "Invalid state: msg"
        );
        assert_eq!(
            AppError::ConfirmationMismatch {
                expected: "RESET 2024-2025".into()
            }
            .to_string(),
            "Confirmation does not match; type \"RESET 2024-2025\" to confirm"
        );
        assert_eq!(
            AppError::Unauthenticated(AuthFailure::TokenExpired).to_string(),
            "Authentication required: Token has expired"
        );
    }
}
