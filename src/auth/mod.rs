//! Authentication and authorization.
//!
//! Identity comes from the [`AuthUser`] extractor: it verifies the bearer
//! token, loads the user and exposes `{id, role, userType, email}` to the
//! handler. Role and ownership checks are plain methods on [`AuthUser`] so
//! each route composes the guards it needs.

pub mod password;
pub mod token;

use crate::api::AppState;
use crate::error::ApiError;
use crate::types::{Role, UserType};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Failures while issuing or checking credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Token(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => ApiError::unauthenticated("Token expired"),
            AuthError::Token(detail) => ApiError::unauthenticated("Invalid token").with_error(detail),
            other => ApiError::internal(other),
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub user_type: UserType,
    pub email: String,
}

impl AuthUser {
    /// Forbidden unless the caller's role is one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if !allowed.contains(&self.role) {
            return Err(ApiError::forbidden(format!(
                "This action requires the {} role",
                allowed
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ")
            )));
        }
        Ok(())
    }

    pub fn require_requester(&self) -> Result<(), ApiError> {
        self.require_role(&[Role::Requester])
    }

    pub fn require_provider(&self) -> Result<(), ApiError> {
        self.require_role(&[Role::Provider])
    }

    /// Forbidden unless the caller is `owner_id`.
    pub fn require_owner(&self, owner_id: &str) -> Result<(), ApiError> {
        if self.id != owner_id {
            return Err(ApiError::forbidden("You do not own this resource"));
        }
        Ok(())
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("Missing authorization token"))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("Malformed authorization header"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token)?;

        // The token alone is not enough; the user must still exist.
        let user = state
            .db
            .get_user(&claims.id)?
            .ok_or_else(|| ApiError::unauthenticated("User no longer exists"))?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
            user_type: user.user_type,
            email: user.email,
        })
    }
}
