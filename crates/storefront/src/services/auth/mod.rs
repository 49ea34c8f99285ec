//! Authentication state.
//!
//! [`AuthState`] owns the signed-in user. The user is persisted under the
//! `currentUser` key and published through a `tokio::sync::watch` channel so
//! the cart and wishlist can observe identity changes without sharing
//! mutable state. The channel is used synchronously; no runtime is needed.
//!
//! Accounts, password hashes and reset tokens live in the same store. This
//! is a local mock of a real identity provider: nothing leaves the machine
//! and reset tokens are handed straight back to the caller instead of being
//! emailed.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::instrument;
use uuid::Uuid;

use tindahan_core::{AdminRole, Email, UserId};

use crate::config::registration_code_matches;
use crate::models::{Account, PasswordReset, User};
use crate::notify::{SharedNotifier, Toast};
use crate::store::{SharedStore, StoreError, hydrate_json, keys, load_json, save_json};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a password reset token stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Auth state container.
pub struct AuthState {
    store: SharedStore,
    notifier: SharedNotifier,
    admin_registration_code: Option<SecretString>,
    current: watch::Sender<Option<User>>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("current_user", &*self.current.borrow())
            .field(
                "admin_registration_enabled",
                &self.admin_registration_code.is_some(),
            )
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Restore the signed-in user from the store.
    ///
    /// A malformed `currentUser` value is discarded and the session starts
    /// signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    #[instrument(skip_all)]
    pub fn mount(
        store: SharedStore,
        notifier: SharedNotifier,
        admin_registration_code: Option<SecretString>,
    ) -> Result<Self, StoreError> {
        let user: Option<User> = hydrate_json(&*store, keys::CURRENT_USER)?;
        if let Some(user) = &user {
            tracing::debug!(user_id = %user.id, "Restored signed-in user");
        }

        Ok(Self {
            store,
            notifier,
            admin_registration_code,
            current: watch::Sender::new(user),
        })
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe identity changes.
    ///
    /// The receiver starts with the current user already marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new customer account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName` if the name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, name, password))]
    pub fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.create_account(name, email, password, None)?;
        self.notifier
            .notify(Toast::success(format!("Welcome, {}!", user.name)));
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.verify_credentials(email, password)?;
        self.set_current(Some(user.clone()))?;
        self.notifier
            .notify(Toast::success(format!("Welcome back, {}!", user.name)));
        Ok(user)
    }

    /// Sign out. Signing out while signed out does nothing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the stored user cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        if !self.is_signed_in() {
            return Ok(());
        }
        self.set_current(None)?;
        self.notifier.notify(Toast::info("Signed out"));
        Ok(())
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue a password reset token.
    ///
    /// Returns `None` when no account uses `email`. The toast is the same
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    #[instrument(skip(self))]
    pub fn request_password_reset(&mut self, email: &str) -> Result<Option<String>, AuthError> {
        let email = Email::parse(email)?;
        let known = self
            .load_accounts()?
            .iter()
            .any(|a| a.user.email.matches(&email));

        self.notifier.notify(Toast::info(format!(
            "If an account exists for {email}, a reset link has been sent."
        )));

        if !known {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(None);
        }

        let now = Utc::now();
        let token = Uuid::new_v4().to_string();
        let mut resets = self.load_resets()?;
        resets.retain(|r| r.is_valid_at(now) && !r.email.matches(&email));
        resets.push(PasswordReset {
            token: token.clone(),
            email,
            expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        });
        save_json(&*self.store, keys::PASSWORD_RESETS, &resets)?;

        tracing::info!("Password reset token issued");
        Ok(Some(token))
    }

    /// Set a new password using a reset token. The token is consumed.
    ///
    /// Does not sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password doesn't meet requirements.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown, expired or used.
    #[instrument(skip_all)]
    pub fn reset_password(&mut self, token: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let now = Utc::now();
        let mut resets = self.load_resets()?;
        let position = resets
            .iter()
            .position(|r| r.token == token && r.is_valid_at(now))
            .ok_or(AuthError::InvalidResetToken)?;
        let reset = resets.remove(position);
        resets.retain(|r| r.is_valid_at(now));

        let mut accounts = self.load_accounts()?;
        let account = accounts
            .iter_mut()
            .find(|a| a.user.email.matches(&reset.email))
            .ok_or(AuthError::InvalidResetToken)?;
        account.password_hash = hash_password(new_password)?;
        let user_id = account.user.id.clone();

        save_json(&*self.store, keys::ACCOUNTS, &accounts)?;
        save_json(&*self.store, keys::PASSWORD_RESETS, &resets)?;

        tracing::info!(%user_id, "Password reset");
        self.notifier
            .notify(Toast::success("Password updated. Please sign in."));
        Ok(())
    }

    // =========================================================================
    // Admin Access
    // =========================================================================

    /// Register an admin account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminRegistrationDisabled` if no code is configured.
    /// Returns `AuthError::InvalidRegistrationCode` if `registration_code` is wrong.
    /// Otherwise fails as [`AuthState::sign_up`].
    #[instrument(skip(self, name, password, registration_code))]
    pub fn register_admin(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        registration_code: &str,
        role: AdminRole,
    ) -> Result<User, AuthError> {
        let expected = self
            .admin_registration_code
            .as_ref()
            .ok_or(AuthError::AdminRegistrationDisabled)?;
        if !registration_code_matches(expected, registration_code) {
            tracing::warn!("Admin registration rejected: wrong registration code");
            return Err(AuthError::InvalidRegistrationCode);
        }

        let user = self.create_account(name, email, password, Some(role))?;
        self.notifier.notify(Toast::success(format!(
            "Admin account created. Welcome, {}!",
            user.name
        )));
        Ok(user)
    }

    /// Sign in to the admin area.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::NotAdmin` if the account is not an admin; the
    /// current user is left unchanged.
    #[instrument(skip(self, password))]
    pub fn admin_sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.verify_credentials(email, password)?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Admin sign-in rejected: not an admin");
            return Err(AuthError::NotAdmin);
        }

        self.set_current(Some(user.clone()))?;
        self.notifier
            .notify(Toast::success(format!("Welcome back, {}!", user.name)));
        Ok(user)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn create_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        admin_role: Option<AdminRole>,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| a.user.email.matches(&email)) {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            name: name.to_owned(),
            email,
            is_admin: admin_role.is_some(),
            admin_role,
        };
        accounts.push(Account {
            user: user.clone(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        });
        save_json(&*self.store, keys::ACCOUNTS, &accounts)?;
        tracing::info!(user_id = %user.id, admin = user.is_admin, "Account created");

        self.set_current(Some(user.clone()))?;
        Ok(user)
    }

    fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let account = self
            .load_accounts()?
            .into_iter()
            .find(|a| a.user.email.matches(&email))
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;
        Ok(account.user)
    }

    /// Persist and publish a new identity.
    fn set_current(&mut self, user: Option<User>) -> Result<(), StoreError> {
        match &user {
            Some(user) => save_json(&*self.store, keys::CURRENT_USER, user)?,
            None => self.store.remove(keys::CURRENT_USER)?,
        }
        tracing::debug!(user_id = ?user.as_ref().map(|u| &u.id), "Identity changed");
        self.current.send_replace(user);
        Ok(())
    }

    fn load_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(load_json(&*self.store, keys::ACCOUNTS)?.unwrap_or_default())
    }

    fn load_resets(&self) -> Result<Vec<PasswordReset>, StoreError> {
        Ok(load_json(&*self.store, keys::PASSWORD_RESETS)?.unwrap_or_default())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
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

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
