//! Authentication route handlers.
//!
//! Sign-in is a two-step challenge: `request-otp` mails a short-lived code,
//! `verify-otp` exchanges it for an opaque bearer token the client keeps in
//! transient storage.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use velvet_fig_core::{Email, UserId, UserRole};

use crate::error::AppError;
use crate::middleware::auth::{RequireUser, bearer_token};
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the auth service for a request.
fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.email_service(), &state.config().base_url)
}

// =============================================================================
// Shared Types
// =============================================================================

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub email_verified: bool,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            email_verified: user.email_verified,
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Optional; accounts can exist with no password at all.
    pub password: Option<String>,
}

/// Create an account and send a verification link.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserBody>), AppError> {
    let user = auth_service(&state)
        .register(
            req.email.trim(),
            &req.first_name,
            &req.last_name,
            req.password.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

// =============================================================================
// Sign-in codes
// =============================================================================

/// Request to issue a sign-in code.
#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    pub email: String,
}

/// Response after requesting a sign-in code.
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    pub success: bool,
    pub message: String,
}

/// Issue a sign-in code.
///
/// Always reports success for well-formed emails so the endpoint reveals
/// nothing about which addresses have accounts.
///
/// POST /api/auth/request-otp
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, AppError> {
    auth_service(&state)
        .request_login_code(req.email.trim())
        .await?;

    Ok(Json(RequestOtpResponse {
        success: true,
        message: "If the address has an account, a sign-in code is on its way".to_owned(),
    }))
}

/// Request to verify a sign-in code.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

/// Response after a successful verification.
#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub user: UserBody,
}

/// Exchange a sign-in code for a bearer token.
///
/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let (user, token) = auth_service(&state)
        .verify_login_code(req.email.trim(), &req.code)
        .await?;

    Ok(Json(VerifyOtpResponse {
        token,
        user: user.into(),
    }))
}

// =============================================================================
// Email verification
// =============================================================================

/// Query parameters for the verification link.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Response after redeeming a verification link.
#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub success: bool,
    pub email: String,
}

/// Redeem a single-use verification link.
///
/// GET /api/auth/verify-email?token=...
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<VerifyEmailResponse>, AppError> {
    let email = auth_service(&state).verify_email_token(&query.token).await?;

    Ok(Json(VerifyEmailResponse {
        success: true,
        email,
    }))
}

// =============================================================================
// Logout
// =============================================================================

/// Response after logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Revoke the presented bearer token.
///
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, AppError> {
    // RequireUser already validated the header, so the token is present
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let revoked = auth_service(&state).logout(token).await?;
    tracing::info!(user_id = %user.id, "Signed out");

    Ok(Json(LogoutResponse { success: revoked }))
}
