//! Expense and expense-share records.
//!
//! Both records are write-once: they are created in the same unit of work as
//! the balance adjustments they cause and are never mutated afterwards.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::group::define_uuid_id;
use super::{GroupId, MemberId, Money, money::MAX_EXPENSE_CENTS};

define_uuid_id! {
    /// Stable expense identifier.
    ExpenseId
}

/// Maximum description length accepted for an expense.
pub const DESCRIPTION_MAX: usize = 500;

/// Validation failures raised while building an [`Expense`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must not exceed {max}")]
    AmountTooLarge { max: Money },
    #[error("currency must be a three-letter code, got {value:?}")]
    InvalidCurrency { value: String },
}

/// ISO 4217 style currency code: three upper-case ASCII letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Currency used when a request does not name one.
    pub const DEFAULT: Self = Self(*b"USD");

    /// Validate a currency code, normalising it to upper case.
    pub fn new(value: &str) -> Result<Self, ExpenseValidationError> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        match bytes {
            [a, b, c] if bytes.iter().all(u8::is_ascii_alphabetic) => Ok(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(ExpenseValidationError::InvalidCurrency {
                value: value.to_owned(),
            }),
        }
    }

    /// Upper-case three-letter code.
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("USD")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ExpenseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_owned()
    }
}

/// Unvalidated expense fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    pub payer_id: MemberId,
}

/// A single logged payment.
///
/// ## Invariants
/// - `description` is non-empty once trimmed and at most [`DESCRIPTION_MAX`]
///   characters.
/// - `amount` is strictly positive and at most `9_999_999_999.99`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    id: ExpenseId,
    group_id: GroupId,
    description: String,
    amount: Money,
    date: NaiveDate,
    currency: CurrencyCode,
    payer_id: MemberId,
}

impl Expense {
    /// Validate a draft and build an expense.
    pub fn new(draft: ExpenseDraft) -> Result<Self, ExpenseValidationError> {
        let ExpenseDraft {
            id,
            group_id,
            description,
            amount,
            date,
            currency,
            payer_id,
        } = draft;

        let description = description.trim().to_owned();
        if description.is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ExpenseValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        if !amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount);
        }
        if amount.cents() > MAX_EXPENSE_CENTS {
            return Err(ExpenseValidationError::AmountTooLarge {
                max: Money::from_cents(MAX_EXPENSE_CENTS),
            });
        }

        Ok(Self {
            id,
            group_id,
            description,
            amount,
            date,
            currency,
            payer_id,
        })
    }

    /// Expense identifier.
    pub fn id(&self) -> ExpenseId {
        self.id
    }

    /// Group the expense was logged in.
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Trimmed description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Total amount paid.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Day the expense was incurred.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Currency the amount is in.
    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Member who paid.
    pub fn payer_id(&self) -> MemberId {
        self.payer_id
    }
}

/// One participant's portion of one expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseShare {
    pub expense_id: ExpenseId,
    pub member_id: MemberId,
    pub amount: Money,
}

/// An expense together with its shares, in split order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseEntry {
    pub expense: Expense,
    pub shares: Vec<ExpenseShare>,
}

impl ExpenseEntry {
    /// Shares owed to the payer by other participants.
    ///
    /// The payer's own share is excluded: a member cannot owe themselves.
    pub fn debts(&self) -> impl Iterator<Item = &ExpenseShare> + '_ {
        let payer_id = self.expense.payer_id();
        self.shares
            .iter()
            .filter(move |share| share.member_id != payer_id)
    }
}
