//! Bearer-token authentication extractors.
//!
//! Tokens are minted by the auth service on a successful sign-in code
//! exchange. A presented token is trusted until it expires or is revoked;
//! nothing here re-checks the code that minted it.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;

use velvet_fig_core::UserRole;

use crate::db::auth_tokens::AuthTokenRepository;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer token belonging to an admin.
///
/// Returns 401 for missing/invalid tokens and 403 for valid tokens whose
/// user lacks the admin role.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state).await?;

        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "admin access required".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

/// Resolve the `Authorization: Bearer` header to a user.
async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<User, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    AuthTokenRepository::new(state.pool())
        .authenticate(token, Utc::now())
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
