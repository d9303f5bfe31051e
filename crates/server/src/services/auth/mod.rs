//! Authentication service.
//!
//! Sign-in is a two-step email challenge: a short-lived numeric code is
//! issued and mailed, then exchanged for an opaque bearer token. Accounts
//! are created through registration, which also mails a single-use
//! verification link.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use velvet_fig_core::{Email, UserRole};

use crate::db::auth_tokens::AuthTokenRepository;
use crate::db::email_tokens::EmailTokenRepository;
use crate::db::login_codes::LoginCodeRepository;
use crate::db::users::UserRepository;
use crate::db::RepositoryError;
use crate::models::user::{NewUser, User};
use crate::services::email::{EmailService, generate_login_code};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a sign-in code stays valid.
const LOGIN_CODE_TTL_MINUTES: i64 = 10;

/// How long a bearer token stays valid.
const AUTH_TOKEN_TTL_DAYS: i64 = 30;

/// How long a verification link stays valid.
const VERIFY_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication service.
///
/// Handles registration, sign-in codes, verification links, and bearer
/// tokens.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    codes: LoginCodeRepository<'a>,
    verify_tokens: EmailTokenRepository<'a>,
    tokens: AuthTokenRepository<'a>,
    mailer: Option<&'a EmailService>,
    base_url: &'a str,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    ///
    /// `mailer` is `None` in development mode; codes and links are logged
    /// instead of sent.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        mailer: Option<&'a EmailService>,
        base_url: &'a str,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            codes: LoginCodeRepository::new(pool),
            verify_tokens: EmailTokenRepository::new(pool),
            tokens: AuthTokenRepository::new(pool),
            mailer,
            base_url,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new user and send a verification link.
    ///
    /// A failed verification email does not fail the registration; the link
    /// send is best effort and logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if a password was supplied but is
    /// too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let password_hash = match password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let user = self
            .users
            .create(&NewUser {
                email: email.clone(),
                first_name: first_name.trim().to_owned(),
                last_name: last_name.trim().to_owned(),
                password_hash,
                role: UserRole::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(VERIFY_TOKEN_TTL_HOURS);
        self.verify_tokens.create(&email, &token, expires_at).await?;

        let verify_url = format!(
            "{}/api/auth/verify-email?token={token}",
            self.base_url.trim_end_matches('/')
        );

        if let Some(mailer) = self.mailer {
            if let Err(e) = mailer.send_verification_link(email.as_str(), &verify_url).await {
                tracing::warn!(error = %e, email = %email, "Failed to send verification email");
            }
        } else {
            tracing::warn!(
                email = %email,
                verify_url = %verify_url,
                "SMTP not configured - verification link logged (dev mode)"
            );
        }

        Ok(user)
    }

    /// Redeem a verification link, marking the account's email verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenNotFound` if the token is unknown, redeemed,
    /// or expired.
    pub async fn verify_email_token(&self, token: &str) -> Result<String, AuthError> {
        let email = self
            .verify_tokens
            .consume(token, Utc::now())
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        self.users.mark_verified(&email).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        Ok(email)
    }

    // =========================================================================
    // Sign-in codes
    // =========================================================================

    /// Issue a sign-in code for an email.
    ///
    /// Succeeds without issuing anything when the email has no account, so
    /// the endpoint reveals nothing about which addresses are registered.
    /// Earlier codes for the same email stay live; nothing invalidates them
    /// here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Email` if the code email fails to send.
    pub async fn request_login_code(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        if self.users.get_by_email(&email).await?.is_none() {
            tracing::info!(email = %email, "Sign-in code requested for unknown email");
            return Ok(());
        }

        let code = generate_login_code();
        let expires_at = Utc::now() + Duration::minutes(LOGIN_CODE_TTL_MINUTES);
        self.codes.create(&email, &code, expires_at).await?;

        if let Some(mailer) = self.mailer {
            mailer.send_login_code(email.as_str(), &code).await?;
        } else {
            tracing::warn!(
                email = %email,
                code = %code,
                "SMTP not configured - sign-in code logged (dev mode)"
            );
        }

        Ok(())
    }

    /// Verify a sign-in code and mint a bearer token.
    ///
    /// Looks up the newest unredeemed, unexpired code for the email. A
    /// mismatched submission records one attempt against that code; the
    /// counter is never compared to a threshold.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::CodeNotFound` if no live code exists (missing,
    /// expired, or already redeemed).
    /// Returns `AuthError::CodeMismatch` if the code differs.
    pub async fn verify_login_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let now = Utc::now();

        let challenge = self
            .codes
            .latest_active(&email, now)
            .await?
            .ok_or(AuthError::CodeNotFound)?;

        if challenge.code != code.trim() {
            self.codes.record_attempt(challenge.id).await?;
            return Err(AuthError::CodeMismatch);
        }

        self.codes.mark_used(challenge.id).await?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = generate_token();
        let expires_at = now + Duration::days(AUTH_TOKEN_TTL_DAYS);
        self.tokens.create(user.id, &token, expires_at).await?;

        tracing::info!(user_id = %user.id, "Sign-in code verified, token issued");

        Ok((user, token))
    }

    // =========================================================================
    // Bearer tokens
    // =========================================================================

    /// Delete a bearer token (logout).
    ///
    /// # Returns
    ///
    /// Returns `true` if a token was revoked, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, raw_token: &str) -> Result<bool, AuthError> {
        let deleted = self.tokens.delete(raw_token).await?;
        Ok(deleted)
    }
}

/// Generate an opaque URL-safe token (32 random bytes, base64url).
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}
