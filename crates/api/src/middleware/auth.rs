//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use steward_core::auth::UserRole;
use steward_shared::{AppError, AuthFailure, Claims, JwtError};
use tracing::warn;

use crate::{AppState, response::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// Valid claims are stored in the request extensions for [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(AppError::Unauthenticated(AuthFailure::MissingToken)).into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let failure = match e {
                JwtError::Expired => AuthFailure::TokenExpired,
                _ => AuthFailure::InvalidToken,
            };
            ApiError(AppError::Unauthenticated(failure)).into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the user's role, or `None` if the token carries an unknown role.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.0.role.parse().ok()
    }

    /// Checks that the caller's role holds a capability.
    ///
    /// Unknown roles hold no capabilities.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` naming `action` if the check fails.
    pub fn require(&self, capability: fn(&UserRole) -> bool, action: &str) -> Result<UserRole, AppError> {
        match self.role() {
            Some(role) if capability(&role) => Ok(role),
            _ => {
                warn!(user_id = %self.user_id(), role = %self.0.role, action, "Role rejected");
                Err(AppError::Forbidden(format!(
                    "Your role is not allowed to {action}"
                )))
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError(AppError::Unauthenticated(AuthFailure::MissingToken)))
    }
}
