//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `TINDAHAN_DATA_DIR` - Directory for the file store (default: `.tindahan`)
//! - `TINDAHAN_CURRENCY` - Store currency code (default: `PHP`)
//! - `TINDAHAN_CATALOG_PATH` - Product catalog JSON file (default: built-in catalog)
//! - `TINDAHAN_ADMIN_REGISTRATION_CODE` - Code required to register admins
//!   (min 12 chars, not a placeholder). Admin registration is disabled when unset.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use tindahan_core::CurrencyCode;

use crate::catalog::{Catalog, CatalogError};

const DEFAULT_DATA_DIR: &str = ".tindahan";
const MIN_REGISTRATION_CODE_LENGTH: usize = 12;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding one JSON file per store key
    pub data_dir: PathBuf,
    /// Currency assumed for legacy price strings and empty subtotals
    pub currency: CurrencyCode,
    /// Catalog file; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Admin registration code; `None` disables admin registration
    pub admin_registration_code: Option<SecretString>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            currency: CurrencyCode::default(),
            catalog_path: None,
            admin_registration_code: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the admin
    /// registration code fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("TINDAHAN_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let currency = get("TINDAHAN_CURRENCY")
            .map(|raw| {
                raw.parse::<CurrencyCode>().map_err(|e| {
                    ConfigError::InvalidEnvVar("TINDAHAN_CURRENCY".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or_default();

        let catalog_path = get("TINDAHAN_CATALOG_PATH").map(PathBuf::from);

        let admin_registration_code = get("TINDAHAN_ADMIN_REGISTRATION_CODE")
            .map(|code| {
                validate_registration_code(&code, "TINDAHAN_ADMIN_REGISTRATION_CODE")?;
                Ok::<_, ConfigError>(SecretString::from(code))
            })
            .transpose()?;

        Ok(Self {
            data_dir,
            currency,
            catalog_path,
            admin_registration_code,
        })
    }

    /// Load the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog file cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_path(path),
            None => Catalog::builtin(),
        }
    }

    /// Whether admin registration is enabled.
    #[must_use]
    pub const fn admin_registration_enabled(&self) -> bool {
        self.admin_registration_code.is_some()
    }
}

/// Validate that a registration code is long enough and not a placeholder.
fn validate_registration_code(code: &str, var_name: &str) -> Result<(), ConfigError> {
    if code.len() < MIN_REGISTRATION_CODE_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_REGISTRATION_CODE_LENGTH,
                code.len()
            ),
        ));
    }

    let lower = code.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Compare a submitted code against the configured one.
///
/// Runs in time independent of where the first mismatch is.
pub(crate) fn registration_code_matches(expected: &SecretString, submitted: &str) -> bool {
    let expected = expected.expose_secret().as_bytes();
    let submitted = submitted.as_bytes();
    if expected.len() != submitted.len() {
        return false;
    }
    expected
        .iter()
        .zip(submitted)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".tindahan"));
        assert_eq!(config.currency, CurrencyCode::PHP);
        assert!(config.catalog_path.is_none());
        assert!(!config.admin_registration_enabled());
    }

    #[test]
    fn test_currency_parsed() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("TINDAHAN_CURRENCY", "usd")])).unwrap();
        assert_eq!(config.currency, CurrencyCode::USD);

        let result = StorefrontConfig::from_lookup(lookup(&[("TINDAHAN_CURRENCY", "doubloons")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("TINDAHAN_DATA_DIR", "  "),
            ("TINDAHAN_ADMIN_REGISTRATION_CODE", ""),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".tindahan"));
        assert!(config.admin_registration_code.is_none());
    }

    #[test]
    fn test_registration_code_too_short() {
        let result = validate_registration_code("k7Qz", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_registration_code_placeholder() {
        let result = validate_registration_code("changeme-admin-code", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_registration_code_accepted() {
        let config = StorefrontConfig::from_lookup(lookup(&[(
            "TINDAHAN_ADMIN_REGISTRATION_CODE",
            "k7Qz-4mWp-9xRt",
        )]))
        .unwrap();
        let code = config.admin_registration_code.unwrap();
        assert!(registration_code_matches(&code, "k7Qz-4mWp-9xRt"));
        assert!(!registration_code_matches(&code, "k7Qz-4mWp-9xRT"));
        assert!(!registration_code_matches(&code, "k7Qz"));
    }

    #[test]
    fn test_debug_redacts_registration_code() {
        let config = StorefrontConfig {
            admin_registration_code: Some(SecretString::from("k7Qz-4mWp-9xRt")),
            ..StorefrontConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("k7Qz-4mWp-9xRt"));
    }
}
