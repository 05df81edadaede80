//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account row.
///
/// The credential is stored and compared in cleartext. This mirrors the
/// behavior the API contract was tested against; swap in a salted one-way
/// hash before any real deployment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-generated id (also used as the row key)
    pub id: String,
    /// Unique, immutable business key
    pub username: String,
    /// Name shown on the profile
    pub display_name: String,
    /// Credential (never serialized in responses)
    #[serde(skip_serializing)]
    pub password: String,
    /// Email address
    pub email: String,
    /// Media id of the profile background, if set
    pub profile_background: Option<String>,
    /// Media id of the profile picture, if set
    pub profile_picture: Option<String>,
    /// Reset epoch: tokens issued before this instant are revoked.
    /// Seconds since the token epoch, not Unix time.
    pub last_token_reset: i64,
}
