//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use velvet_fig_core::{Email, UserId, UserRole};

/// A shopper or staff account (domain type).
///
/// The password hash, when one exists, stays in the database and is never
/// loaded onto this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account role.
    pub role: UserRole,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address (unique).
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2id hash of the password, when the user chose one.
    pub password_hash: Option<String>,
    /// Account role.
    pub role: UserRole,
}
