//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tindahan_core::EmailError),

    /// Display name missing.
    #[error("name cannot be empty")]
    MissingName,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Reset token unknown, expired, or already used.
    #[error("invalid or expired password reset token")]
    InvalidResetToken,

    /// No admin registration code is configured.
    #[error("admin registration is disabled")]
    AdminRegistrationDisabled,

    /// The submitted admin registration code is wrong.
    #[error("invalid admin registration code")]
    InvalidRegistrationCode,

    /// The account exists but is not an admin.
    #[error("account does not have admin access")]
    NotAdmin,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
