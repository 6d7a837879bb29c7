//! Port for reading group rosters and posting expenses to the ledger store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Balance, ExpenseEntry, ExpenseId, GroupId, GroupRoster, GroupSpending, LedgerPostingError,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum ExpenseLedgerRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "expense ledger connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "expense ledger query failed: {message}",
    }
}

/// Driven port for the expense ledger store.
///
/// `record_expense` is the only mutation. Adapters run it as one unit of work:
/// the expense row, its share rows, and every balance adjustment commit
/// together or not at all. Concurrent postings to the same group are
/// serialised so no balance update is lost.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseLedgerRepository: Send + Sync {
    /// Load a group and its members in roster order.
    async fn find_roster(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<GroupRoster>, ExpenseLedgerRepositoryError>;

    /// Atomically persist `entry` and reconcile the balances it causes.
    async fn record_expense(
        &self,
        entry: &ExpenseEntry,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), LedgerPostingError>;

    /// Current balance rows for a group, in no particular order.
    async fn list_balances(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<Balance>, ExpenseLedgerRepositoryError>;

    /// Fetch a recorded expense with its shares.
    async fn find_expense(
        &self,
        expense_id: &ExpenseId,
    ) -> Result<Option<ExpenseEntry>, ExpenseLedgerRepositoryError>;

    /// Payment and share totals over every expense logged in a group.
    async fn spending_totals(
        &self,
        group_id: &GroupId,
    ) -> Result<GroupSpending, ExpenseLedgerRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the ledger store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExpenseLedgerRepository;

#[async_trait]
impl ExpenseLedgerRepository for FixtureExpenseLedgerRepository {
    async fn find_roster(
        &self,
        _group_id: &GroupId,
    ) -> Result<Option<GroupRoster>, ExpenseLedgerRepositoryError> {
        Ok(None)
    }

    async fn record_expense(
        &self,
        _entry: &ExpenseEntry,
        _recorded_at: DateTime<Utc>,
    ) -> Result<(), LedgerPostingError> {
        Ok(())
    }

    async fn list_balances(
        &self,
        _group_id: &GroupId,
    ) -> Result<Vec<Balance>, ExpenseLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_expense(
        &self,
        _expense_id: &ExpenseId,
    ) -> Result<Option<ExpenseEntry>, ExpenseLedgerRepositoryError> {
        Ok(None)
    }

    async fn spending_totals(
        &self,
        _group_id: &GroupId,
    ) -> Result<GroupSpending, ExpenseLedgerRepositoryError> {
        Ok(GroupSpending::default())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_unknown_groups() {
        let repo = FixtureExpenseLedgerRepository;
        let roster = repo
            .find_roster(&GroupId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(roster.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_lists_no_balances() {
        let repo = FixtureExpenseLedgerRepository;
        let balances = repo
            .list_balances(&GroupId::random())
            .await
            .expect("fixture list succeeds");
        assert!(balances.is_empty());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = ExpenseLedgerRepositoryError::connection("pool timed out");
        assert_eq!(
            err.to_string(),
            "expense ledger connection failed: pool timed out"
        );
    }
}
