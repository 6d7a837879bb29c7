//! Row-level operations available inside one ledger transaction.

use async_trait::async_trait;

use crate::domain::{Balance, BalanceKey, Expense, ExpenseShare};

use super::ExpenseLedgerRepositoryError;

/// Operations the reconciler performs inside an open unit of work.
///
/// Implementations are scoped to a single transaction. Reads through
/// [`LedgerUnitOfWork::find_balance`] must observe earlier writes made through
/// the same unit, and rows it returns stay locked until the unit ends.
#[async_trait]
pub trait LedgerUnitOfWork: Send {
    /// Insert the expense row.
    async fn insert_expense(&mut self, expense: &Expense)
    -> Result<(), ExpenseLedgerRepositoryError>;

    /// Insert the share rows of one expense.
    async fn insert_shares(
        &mut self,
        shares: &[ExpenseShare],
    ) -> Result<(), ExpenseLedgerRepositoryError>;

    /// Read the balance row for an ordered pair, locking it.
    async fn find_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<Option<Balance>, ExpenseLedgerRepositoryError>;

    /// Insert a new balance row.
    async fn insert_balance(&mut self, balance: &Balance)
    -> Result<(), ExpenseLedgerRepositoryError>;

    /// Overwrite the amount and timestamp of an existing balance row.
    async fn update_balance(&mut self, balance: &Balance)
    -> Result<(), ExpenseLedgerRepositoryError>;

    /// Remove the balance row for an ordered pair.
    async fn delete_balance(&mut self, key: &BalanceKey)
    -> Result<(), ExpenseLedgerRepositoryError>;
}
