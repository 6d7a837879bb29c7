//! Exact monetary amounts held as integer cents.
//!
//! Amounts cross the HTTP boundary as decimal strings such as `"10.00"` and are
//! rounded to the nearest cent on entry. Everything downstream (splitting,
//! reconciliation, persistence) works in whole cents so no floating-point
//! drift can creep into the ledger.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of minor units per major currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

/// Largest amount accepted for a single expense: `9_999_999_999.99`.
///
/// Mirrors a `NUMERIC(12, 2)` column so amounts stay portable to stores that
/// use fixed precision.
pub const MAX_EXPENSE_CENTS: i64 = 999_999_999_999;

/// Errors raised when parsing or combining monetary amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("amount must be a decimal number, got {value:?}")]
    NotNumeric { value: String },
    /// The amount does not fit the supported range.
    #[error("amount is out of range")]
    OutOfRange,
}

/// Monetary amount in cents.
///
/// The value may be zero or negative as an intermediate result; validated
/// entry points (expense amounts, balance rows) reject non-positive values.
/// Serialises as a decimal string with two fraction digits.
///
/// # Examples
/// ```
/// use splitledger::domain::Money;
///
/// let amount: Money = "10.005".parse().expect("numeric");
/// assert_eq!(amount.cents(), 1001);
/// assert_eq!(amount.to_string(), "10.01");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wrap an integer number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Round a decimal amount to the nearest cent.
    ///
    /// Midpoints round away from zero, so `0.005` becomes one cent.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let cents = rounded
            .checked_mul(Decimal::from(CENTS_PER_UNIT))
            .and_then(|value| value.to_i64())
            .ok_or(MoneyError::OutOfRange)?;
        Ok(Self(cents))
    }

    /// Integer number of cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Exact decimal representation with two fraction digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// True when the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::OutOfRange)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::OutOfRange)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let decimal = Decimal::from_str(trimmed).map_err(|_| MoneyError::NotNumeric {
            value: value.to_owned(),
        })?;
        Self::from_decimal(decimal)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("10", 1000)]
    #[case("10.00", 1000)]
    #[case(" 3.33 ", 333)]
    #[case("0.005", 1)]
    #[case("0.004", 0)]
    #[case("-2.5", -250)]
    #[case("9999999999.99", MAX_EXPENSE_CENTS)]
    fn parses_and_rounds_to_nearest_cent(#[case] input: &str, #[case] expected: i64) {
        let money: Money = input.parse().expect("numeric input");
        assert_eq!(money.cents(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("NaN")]
    #[case("1,50")]
    fn rejects_non_numeric_input(#[case] input: &str) {
        let err = input.parse::<Money>().expect_err("non-numeric");
        assert!(matches!(err, MoneyError::NotNumeric { .. }));
    }

    #[rstest]
    fn displays_two_fraction_digits() {
        assert_eq!(Money::from_cents(1000).to_string(), "10.00");
        assert_eq!(Money::from_cents(334).to_string(), "3.34");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[rstest]
    fn serialises_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(1250)).expect("serialise");
        assert_eq!(json, "\"12.50\"");
        let parsed: Money = serde_json::from_str("\"3.335\"").expect("deserialise");
        assert_eq!(parsed.cents(), 334);
    }

    #[rstest]
    fn checked_arithmetic_reports_overflow() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(
            max.checked_add(Money::from_cents(1)),
            Err(MoneyError::OutOfRange)
        );
        assert_eq!(
            Money::from_cents(30).checked_sub(Money::from_cents(10)),
            Ok(Money::from_cents(20))
        );
    }
}
