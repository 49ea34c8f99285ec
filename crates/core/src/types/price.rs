//! Type-safe price representation.
//!
//! Prices are stored as an integer count of the currency's minor unit
//! (centavos, cents, ...) next to an ISO 4217 currency code. The display
//! string is always derived from that pair.
//!
//! Older persisted carts stored prices as formatted strings such as
//! `"₱1,499"`. [`Price::parse_display`] and the `Deserialize` impl still
//! accept that form so existing data keeps loading.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when building or combining a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The display string contains no digits at all.
    #[error("price contains no digits")]
    Empty,
    /// The numeric part of the display string is not a valid decimal.
    #[error("invalid price amount: {0}")]
    InvalidAmount(String),
    /// The amount does not fit in the minor-unit representation.
    #[error("price amount out of range")]
    Overflow,
    /// Two prices in different currencies were combined.
    #[error("cannot combine {left} and {right} amounts")]
    CurrencyMismatch {
        /// Currency of the left-hand operand.
        left: CurrencyCode,
        /// Currency of the right-hand operand.
        right: CurrencyCode,
    },
    /// The currency code is not supported.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    PHP,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// All supported currencies.
    pub const ALL: [Self; 6] = [
        Self::PHP,
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::CAD,
        Self::AUD,
    ];

    /// Symbol used when formatting amounts.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::PHP => '₱',
            Self::USD | Self::CAD | Self::AUD => '$',
            Self::EUR => '€',
            Self::GBP => '£',
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PHP => "PHP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Number of decimal places in the minor unit.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        2
    }

    /// Resolve a currency symbol, preferring `preferred` when several
    /// currencies share the symbol (e.g. `$`).
    #[must_use]
    pub fn from_symbol(symbol: char, preferred: Self) -> Option<Self> {
        if preferred.symbol() == symbol {
            return Some(preferred);
        }
        Self::ALL.into_iter().find(|c| c.symbol() == symbol)
    }

    const fn minor_unit_scale(self) -> i64 {
        10_i64.pow(self.minor_unit_exponent())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PriceError::UnknownCurrency(s.to_owned()))
    }
}

/// A monetary amount in a specific currency.
///
/// ```
/// use tindahan_core::{CurrencyCode, Price};
///
/// let price = Price::parse_display("₱1,499", CurrencyCode::PHP).unwrap();
/// assert_eq!(price.minor_units(), 149_900);
/// assert_eq!(price.to_string(), "₱1,499.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Price {
    /// Amount in the currency's minor unit.
    #[serde(rename = "amountMinor")]
    minor_units: i64,
    /// ISO 4217 currency code.
    currency: CurrencyCode,
}

impl Price {
    /// Create a price from an amount already expressed in minor units.
    #[must_use]
    pub const fn from_minor_units(minor_units: i64, currency: CurrencyCode) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Create a price from a decimal amount in major units, rounding half
    /// away from zero to the nearest minor unit.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the amount does not fit.
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, PriceError> {
        let minor = amount
            .checked_mul(Decimal::from(currency.minor_unit_scale()))
            .ok_or(PriceError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(PriceError::Overflow)?;

        Ok(Self::from_minor_units(minor, currency))
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self::from_minor_units(0, currency)
    }

    /// Parse a formatted display price such as `"₱1,499"` or `"$19.99"`.
    ///
    /// Every character that is not an ASCII digit or a decimal point is
    /// stripped before parsing. The currency comes from the first recognised
    /// symbol, or `fallback` when there is none.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Empty` when no digits remain,
    /// `PriceError::InvalidAmount` when the remainder is not a decimal, and
    /// `PriceError::Overflow` when it does not fit.
    pub fn parse_display(s: &str, fallback: CurrencyCode) -> Result<Self, PriceError> {
        let currency = s
            .chars()
            .find_map(|c| CurrencyCode::from_symbol(c, fallback))
            .unwrap_or(fallback);

        let numeric: String = s
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if !numeric.chars().any(|c| c.is_ascii_digit()) {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(&numeric).map_err(|_| PriceError::InvalidAmount(s.to_owned()))?;

        Self::new(amount, currency)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Currency of this price.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Amount in major units as an exact decimal.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.minor_units, self.currency.minor_unit_exponent())
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` or `PriceError::Overflow`.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        if self.currency != other.currency {
            return Err(PriceError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or(PriceError::Overflow)?;
        Ok(Self::from_minor_units(minor_units, self.currency))
    }

    /// Multiply by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the result does not fit.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, PriceError> {
        let minor_units = self
            .minor_units
            .checked_mul(i64::from(quantity))
            .ok_or(PriceError::Overflow)?;
        Ok(Self::from_minor_units(minor_units, self.currency))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = self.currency.minor_unit_scale().unsigned_abs();
        let magnitude = self.minor_units.unsigned_abs();
        let whole = (magnitude / scale).to_string();
        let fraction = magnitude % scale;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if self.minor_units < 0 { "-" } else { "" };
        let width = self.currency.minor_unit_exponent() as usize;
        write!(
            f,
            "{sign}{}{grouped}.{fraction:0width$}",
            self.currency.symbol()
        )
    }
}

/// Accepted wire forms: the structured object, or a legacy display string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    #[serde(rename_all = "camelCase")]
    Structured {
        amount_minor: i64,
        currency: CurrencyCode,
    },
    Display(String),
}

/// A legacy string without a currency symbol is read as the default
/// currency. Callers that know the store currency should resolve such
/// strings with [`Price::parse_display`] before decoding.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawPrice::deserialize(deserializer)? {
            RawPrice::Structured {
                amount_minor,
                currency,
            } => Ok(Self::from_minor_units(amount_minor, currency)),
            RawPrice::Display(s) => {
                Self::parse_display(&s, CurrencyCode::default()).map_err(serde::de::Error::custom)
            }
        }
    }
}
