//! Unified error handling.
//!
//! Provides a unified `StorefrontError` type for the UI layer. Container
//! operations return their own error types; callers that drive several
//! containers convert them with `?`.

use thiserror::Error;

use tindahan_core::PriceError;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Catalog could not be loaded or a product lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Price arithmetic failed.
    #[error("Price error: {0}")]
    Price(#[from] PriceError),
}

impl StorefrontError {
    /// Message suitable for showing to a shopper.
    ///
    /// Storage internals are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Auth(AuthError::Store(_) | AuthError::PasswordHash) => {
                "Something went wrong saving your data. Please try again.".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::InvalidResetToken => {
                    "This reset link is invalid or has expired".to_string()
                }
                AuthError::NotAdmin => "This account does not have admin access".to_string(),
                _ => err.to_string(),
            },
            Self::Catalog(CatalogError::NotFound(id)) => format!("No product with id {id}"),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_not_exposed() {
        let err = StorefrontError::from(StoreError::InvalidKey("../etc".to_string()));
        assert!(!err.user_message().contains("../etc"));
    }

    #[test]
    fn test_auth_messages() {
        let err = StorefrontError::from(AuthError::InvalidCredentials);
        assert_eq!(err.user_message(), "Invalid email or password");

        let err = StorefrontError::from(AuthError::WeakPassword("too short".to_string()));
        assert_eq!(err.user_message(), "too short");
    }
}
