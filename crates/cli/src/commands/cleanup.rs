//! Delete stale authentication rows.
//!
//! Nothing in the request path removes redeemed or expired sign-in codes,
//! verification tokens, or bearer tokens; they accumulate until this
//! command runs.

use chrono::Utc;
use tracing::info;

use velvet_fig_server::db::auth_tokens::AuthTokenRepository;
use velvet_fig_server::db::email_tokens::EmailTokenRepository;
use velvet_fig_server::db::login_codes::LoginCodeRepository;

/// Delete used/expired sign-in codes, verification tokens, and expired
/// bearer tokens.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a delete fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let now = Utc::now();

    let codes = LoginCodeRepository::new(&pool).delete_stale(now).await?;
    let verification_tokens = EmailTokenRepository::new(&pool).delete_stale(now).await?;
    let bearer_tokens = AuthTokenRepository::new(&pool).delete_expired(now).await?;

    info!(
        codes,
        verification_tokens, bearer_tokens, "Cleanup complete"
    );
    Ok(())
}
