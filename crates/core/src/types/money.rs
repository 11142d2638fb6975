//! Fixed-point money type used for menu prices and order totals.

use core::fmt;
use core::ops::{Add, AddAssign};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount carries more decimal places than allowed.
    #[error("amount must have at most {max} decimal places")]
    TooManyDecimals {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount has too many digits in total.
    #[error("amount must have at most {max_digits} digits")]
    TooLarge {
        /// Maximum allowed total digits.
        max_digits: u32,
    },
}

/// A non-negative monetary amount with exactly two decimal places.
///
/// Amounts are normalized to scale 2 on construction, so display and
/// serialization always produce the canonical `"12.50"` form. Arithmetic
/// between `Money` values preserves that scale, which keeps order totals
/// exact: no floating point is involved anywhere.
///
/// ## Constraints
///
/// - Not negative
/// - At most 2 decimal places as written (trailing zeros count)
/// - At most 6 digits in total (so strictly below 10000.00)
///
/// ## Examples
///
/// ```
/// use bistro_core::Money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let price = Money::parse(Decimal::from_str("5.5").unwrap()).unwrap();
/// assert_eq!(price.to_string(), "5.50");
///
/// assert!(Money::parse(Decimal::from_str("-1").unwrap()).is_err());
/// assert!(Money::parse(Decimal::from_str("1.234").unwrap()).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Maximum number of decimal places accepted.
    pub const MAX_DECIMAL_PLACES: u32 = 2;

    /// Maximum number of digits accepted, decimals included.
    pub const MAX_DIGITS: u32 = 6;

    /// Zero, the additive identity for totals.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a decimal amount as money.
    ///
    /// The value is rescaled to exactly two decimal places on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, carries more than two
    /// decimal places, or does not fit in six digits.
    pub fn parse(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        if amount.scale() > Self::MAX_DECIMAL_PLACES {
            return Err(MoneyError::TooManyDecimals {
                max: Self::MAX_DECIMAL_PLACES,
            });
        }
        if amount >= Decimal::from(10_000_i64) {
            return Err(MoneyError::TooLarge {
                max_digits: Self::MAX_DIGITS,
            });
        }

        let mut canonical = amount;
        canonical.rescale(Self::MAX_DECIMAL_PLACES);
        Ok(Self(canonical))
    }

    /// Reconstruct a `Money` from its stored text form.
    ///
    /// Stored values are trusted; only the decimal syntax is checked, not
    /// the input constraints enforced by [`Money::parse`].
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid decimal number.
    pub fn from_db(s: &str) -> Result<Self, rust_decimal::Error> {
        let mut amount = Decimal::from_str(s)?;
        amount.rescale(Self::MAX_DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply this unit amount by a line quantity.
    #[must_use]
    pub fn line_total(&self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
