//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] velvet_fig_core::EmailError),

    /// Registration attempted with an email that is already taken.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// No unredeemed, unexpired sign-in code exists for the email. Covers
    /// expired and already-used codes, since those are excluded from the
    /// lookup.
    #[error("no valid sign-in code found")]
    CodeNotFound,

    /// A live code exists but the submitted value differs.
    #[error("sign-in code does not match")]
    CodeMismatch,

    /// Verification link is unknown, redeemed, or expired.
    #[error("verification link is invalid or expired")]
    TokenNotFound,

    /// No account exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Outbound email failed.
    #[error("failed to send email: {0}")]
    Email(#[from] crate::services::email::EmailError),
}
