//! One-time sign-in code domain type.

use chrono::{DateTime, Utc};

use velvet_fig_core::LoginCodeId;

/// A one-time sign-in code challenge.
///
/// Several of these may be live for the same email at once; nothing
/// invalidates older rows when a new code is issued. The attempt counter is
/// recorded on every mismatch but is not compared against any threshold.
#[derive(Debug, Clone)]
pub struct LoginCode {
    /// Database ID of this challenge.
    pub id: LoginCodeId,
    /// Email the code was issued to.
    pub email: String,
    /// The 6-digit numeric code.
    pub code: String,
    /// When the code stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Whether the code has already been redeemed.
    pub used: bool,
    /// How many mismatched submissions were recorded against this code.
    pub attempts: i64,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}
