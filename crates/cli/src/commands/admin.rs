//! Admin account management commands.

use tracing::info;

use velvet_fig_core::{Email, UserRole};
use velvet_fig_server::db::users::UserRepository;
use velvet_fig_server::models::user::NewUser;

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the email is invalid, already registered, or the
/// database operation fails.
pub async fn create(
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;

    let user = UserRepository::new(&pool)
        .create(&NewUser {
            email,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            password_hash: None,
            role: UserRole::Admin,
        })
        .await?;

    info!(id = %user.id, email = %user.email, "Admin account created");
    info!("They can now sign in with an emailed code.");
    Ok(())
}

/// Promote an existing account to admin.
///
/// # Errors
///
/// Returns an error if no account has that email or the database operation
/// fails.
pub async fn promote(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let pool = super::connect().await?;

    UserRepository::new(&pool)
        .set_role(&email, UserRole::Admin)
        .await?;

    info!(email = %email, "Account promoted to admin");
    Ok(())
}
