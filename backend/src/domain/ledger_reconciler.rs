//! Net-simplifying balance reconciliation.
//!
//! Balances are a continuously collapsed net-position cache, not a history:
//! every directed debt is first netted against the opposing edge for the same
//! pair, and only the remainder (if any) lands on the forward edge. After each
//! call at most one edge exists per pair and its amount is strictly positive.
//!
//! Both functions run against an explicit [`LedgerUnitOfWork`]. The caller owns
//! the transaction and rolls back every write if any step returns an error.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::ports::{ExpenseLedgerRepositoryError, LedgerUnitOfWork};
use super::{Balance, BalanceKey, BalanceValidationError, ExpenseEntry, Money, MoneyError};

/// Failures raised while posting an expense inside a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerPostingError {
    /// The store rejected a read or write.
    #[error(transparent)]
    Store(#[from] ExpenseLedgerRepositoryError),
    /// A debt delta was zero or negative.
    #[error("debt delta must be greater than zero, got {delta}")]
    NonPositiveDelta { delta: Money },
    /// Balance arithmetic left the representable range.
    #[error("balance arithmetic overflowed: {0}")]
    Overflow(#[from] MoneyError),
    /// A computed balance row failed validation.
    #[error("computed balance is invalid: {0}")]
    InvalidBalance(#[from] BalanceValidationError),
}

/// State of a pair after [`apply_debt`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtOutcome {
    /// Creditor and debtor were the same member; nothing was written.
    SelfDebtSkipped,
    /// The opposing edge absorbed the whole delta and still has `remaining`.
    ReverseReduced { remaining: Money },
    /// The opposing edge cancelled exactly; the pair is settled.
    Settled,
    /// The forward edge now holds `amount`.
    Forward { amount: Money },
}

/// Apply one directed debt: `key.debtor_id` now owes `key.creditor_id` a
/// further `delta`.
///
/// # Errors
/// Returns [`LedgerPostingError::NonPositiveDelta`] for a zero or negative
/// delta, and propagates store failures unchanged.
pub async fn apply_debt<U>(
    uow: &mut U,
    key: BalanceKey,
    delta: Money,
    now: DateTime<Utc>,
) -> Result<DebtOutcome, LedgerPostingError>
where
    U: LedgerUnitOfWork + ?Sized,
{
    if key.creditor_id == key.debtor_id {
        return Ok(DebtOutcome::SelfDebtSkipped);
    }
    if !delta.is_positive() {
        return Err(LedgerPostingError::NonPositiveDelta { delta });
    }

    let mut remaining = delta;
    let reverse_key = key.reversed();
    if let Some(reverse) = uow.find_balance(&reverse_key).await? {
        if reverse.amount() > remaining {
            let reduced = reverse.amount().checked_sub(remaining)?;
            uow.update_balance(&Balance::new(reverse_key, reduced, now)?)
                .await?;
            return Ok(DebtOutcome::ReverseReduced { remaining: reduced });
        }
        uow.delete_balance(&reverse_key).await?;
        remaining = remaining.checked_sub(reverse.amount())?;
        if !remaining.is_positive() {
            return Ok(DebtOutcome::Settled);
        }
    }

    let amount = match uow.find_balance(&key).await? {
        Some(forward) => {
            let amount = forward.amount().checked_add(remaining)?;
            uow.update_balance(&Balance::new(key, amount, now)?).await?;
            amount
        }
        None => {
            uow.insert_balance(&Balance::new(key, remaining, now)?)
                .await?;
            remaining
        }
    };
    Ok(DebtOutcome::Forward { amount })
}

/// Write an expense, its shares, and the balance adjustments it causes.
///
/// Each non-payer share becomes one [`apply_debt`] call with the payer as
/// creditor, in share order.
pub async fn post_expense<U>(
    uow: &mut U,
    entry: &ExpenseEntry,
    now: DateTime<Utc>,
) -> Result<Vec<DebtOutcome>, LedgerPostingError>
where
    U: LedgerUnitOfWork + ?Sized,
{
    let expense = &entry.expense;
    uow.insert_expense(expense).await?;
    uow.insert_shares(&entry.shares).await?;

    let mut outcomes = Vec::with_capacity(entry.shares.len());
    for share in entry.debts() {
        let key = BalanceKey::new(expense.group_id(), expense.payer_id(), share.member_id);
        let outcome = apply_debt(&mut *uow, key, share.amount, now).await?;
        debug!(
            expense_id = %expense.id(),
            creditor_id = %key.creditor_id,
            debtor_id = %key.debtor_id,
            delta = %share.amount,
            ?outcome,
            "applied debt"
        );
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
#[path = "ledger_reconciler_tests.rs"]
mod tests;
