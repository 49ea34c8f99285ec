//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tindahan_core::{AdminRole, Email, UserId};

/// A signed-in storefront user.
///
/// This is what the rest of the storefront sees; password material stays in
/// [`Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Sign-in email address.
    pub email: Email,
    /// Whether this user registered through the admin flow.
    #[serde(default)]
    pub is_admin: bool,
    /// Admin permission level, present only for admins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<AdminRole>,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An outstanding password reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub token: String,
    pub email: Email,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Whether the token can still be redeemed at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
